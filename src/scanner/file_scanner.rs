//! File scanner for discovering wall media.
//!
//! This module provides the `FileScanner` struct which handles:
//! - Recursive directory scanning using walkdir
//! - Media type detection by file extension
//! - Skipping hidden files and directories
//!
//! Scanning is synchronous: the wall scans once at startup and then
//! feeds slots from the resulting list.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::models::MediaItem;

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0, // unlimited
            follow_symlinks: false,
        }
    }
}

/// Directory scanner for wall media.
pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    /// Creates a new file scanner with default configuration.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Creates a new file scanner with custom configuration.
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans a directory and returns all found media items, sorted by
    /// path. Hidden entries (dot-prefixed) are skipped.
    pub fn scan(&self, dir: &Path) -> Result<Vec<MediaItem>> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve scan directory: {:?}", dir))?;

        let mut walker = WalkDir::new(&dir).follow_links(self.config.follow_symlinks);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        } else if self.config.max_depth > 0 {
            walker = walker.max_depth(self.config.max_depth);
        }

        let mut items = Vec::new();
        let mut skipped = 0usize;
        for entry in walker.into_iter().filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !name.starts_with('.'))
                .unwrap_or(true)
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = ?err, "Skipping unreadable entry");
                    skipped += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(item) = MediaItem::from_path(entry.path().to_path_buf()) {
                items.push(item);
            }
        }

        items.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            found = items.len(),
            skipped,
            dir = ?dir,
            "media scan complete"
        );
        Ok(items)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

//! Wall configuration: tile geometry and rotation pacing.

use tracing::warn;

/// Configuration for the media wall. Fixed once the wall is built;
/// geometry is validated by `WallGrid::new`.
#[derive(Debug, Clone)]
pub struct WallConfig {
    /// Tile width in pixels.
    pub tile_width: i32,
    /// Tile height in pixels.
    pub tile_height: i32,
    /// Padding between tiles in pixels.
    pub padding: i32,
    /// Milliseconds between feeding two slots.
    pub rotation_interval_ms: u32,
    /// Whether the playlist reshuffles each lap.
    pub shuffle: bool,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            tile_width: 320,
            tile_height: 180,
            padding: 4,
            rotation_interval_ms: 1500,
            shuffle: true,
        }
    }
}

impl WallConfig {
    /// Defaults overridden by `MEDIAWALL_*` environment variables.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        read_env("MEDIAWALL_TILE_WIDTH", &mut config.tile_width);
        read_env("MEDIAWALL_TILE_HEIGHT", &mut config.tile_height);
        read_env("MEDIAWALL_PADDING", &mut config.padding);
        read_env("MEDIAWALL_INTERVAL_MS", &mut config.rotation_interval_ms);
        read_env("MEDIAWALL_SHUFFLE", &mut config.shuffle);
        config
    }
}

fn read_env<T: std::str::FromStr>(name: &str, out: &mut T) {
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.parse() {
        Ok(value) => *out = value,
        Err(_) => warn!(name, raw = %raw, "ignoring unparseable setting"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = WallConfig::default();
        assert!(config.tile_width > 0);
        assert!(config.tile_height > 0);
        assert!(config.padding >= 0);
        assert!(config.rotation_interval_ms > 0);
    }
}

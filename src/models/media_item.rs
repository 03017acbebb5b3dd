use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "avi" | "mov" => Some(Self::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub media_type: MediaType,
}

impl MediaItem {
    pub fn new(path: PathBuf, media_type: MediaType) -> Self {
        Self { path, media_type }
    }

    /// Detect the media type from the file extension, if it is one the
    /// wall can display.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaType::from_extension)?;
        Some(Self { path, media_type })
    }

    /// Check if this is a video file based on media type
    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(MediaType::from_extension("jpg"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("JPG"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("webm"), Some(MediaType::Video));
        assert_eq!(MediaType::from_extension("txt"), None);
    }

    #[test]
    fn test_from_path() {
        let item = MediaItem::from_path(PathBuf::from("/wall/clip.mp4")).unwrap();
        assert!(item.is_video());

        let item = MediaItem::from_path(PathBuf::from("/wall/photo.png")).unwrap();
        assert!(!item.is_video());

        assert!(MediaItem::from_path(PathBuf::from("/wall/notes.txt")).is_none());
        assert!(MediaItem::from_path(PathBuf::from("/wall/noext")).is_none());
    }
}

//! Where captured images go before an event leaves the bridge.
//!
//! With a file-system cache, images are written to disk and events carry
//! their paths in `imageInfo`. Without one, images stay inlined in the
//! captured id JSON.

use std::fs;
use std::path::PathBuf;

use crate::types::ImageBytes;

pub trait ImageStore: Send + Sync {
    fn is_file_system_cache_enabled(&self) -> bool;

    /// Persist one image and return a reference the host can load it from.
    fn save_image(&self, image: &ImageBytes) -> Option<String>;
}

/// Images stay inlined; nothing is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineImages;

impl ImageStore for InlineImages {
    fn is_file_system_cache_enabled(&self) -> bool {
        false
    }

    fn save_image(&self, _image: &ImageBytes) -> Option<String> {
        None
    }
}

/// Writes every image as a uniquely named PNG file in one directory.
#[derive(Debug, Clone)]
pub struct FileImageCache {
    dir: PathBuf,
}

impl FileImageCache {
    /// Open the cache, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl ImageStore for FileImageCache {
    fn is_file_system_cache_enabled(&self) -> bool {
        true
    }

    fn save_image(&self, image: &ImageBytes) -> Option<String> {
        let path = self.dir.join(format!("{}.png", uuid::Uuid::new_v4()));
        match fs::write(&path, image.as_ref()) {
            Ok(()) => Some(path.to_string_lossy().into_owned()),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to cache image: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_file_cache_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileImageCache::new(dir.path().join("ids")).unwrap();
        let image: ImageBytes = Arc::from(&b"png-bytes"[..]);

        let first = cache.save_image(&image).unwrap();
        let second = cache.save_image(&image).unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with(".png"));
        assert_eq!(fs::read(&first).unwrap(), b"png-bytes");
        assert!(cache.is_file_system_cache_enabled());
    }

    #[test]
    fn test_inline_images_write_nothing() {
        let image: ImageBytes = Arc::from(&b"png-bytes"[..]);
        assert!(!InlineImages.is_file_system_cache_enabled());
        assert_eq!(InlineImages.save_image(&image), None);
    }
}

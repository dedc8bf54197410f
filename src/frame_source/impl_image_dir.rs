use crate::error::FrameSourceError;
use crate::frame_source::interface::{Frame, FrameSource};
use crate::library::logger::interface::Logger;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Replays the images of a directory in file-name order, one per frame.
pub struct FrameSourceImageDir {
    logger: Arc<dyn Logger + Send + Sync>,
    paths: Vec<PathBuf>,
    cursor: AtomicUsize,
}

impl FrameSourceImageDir {
    pub fn new(
        dir: &Path,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, FrameSourceError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            FrameSourceError::Device(format!("cannot read {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        paths.sort();

        Ok(Self {
            logger: logger.with_namespace("frame_source").with_namespace("image_dir"),
            paths,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

impl FrameSource for FrameSourceImageDir {
    fn start(&self) -> Result<(), FrameSourceError> {
        let _ = self
            .logger
            .info(&format!("Replaying {} frames", self.paths.len()));
        Ok(())
    }

    fn stop(&self) -> Result<(), FrameSourceError> {
        let _ = self.logger.info("Replay stopped");
        Ok(())
    }

    fn next_frame(&self) -> Result<Frame, FrameSourceError> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let path = self.paths.get(index).ok_or(FrameSourceError::EndOfStream)?;

        image::open(path)
            .map_err(|e| FrameSourceError::Device(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_silent::LoggerSilent;
    use image::{Rgb, RgbImage};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "game_watch_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_replays_images_in_name_order() {
        let dir = scratch_dir("replay");
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))
            .save(dir.join("b.png"))
            .unwrap();
        RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]))
            .save(dir.join("a.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let source = FrameSourceImageDir::new(&dir, Arc::new(LoggerSilent::new())).unwrap();
        assert_eq!(source.len(), 2);

        assert_eq!(source.next_frame().unwrap().width(), 8);
        assert_eq!(source.next_frame().unwrap().width(), 4);
        assert!(matches!(
            source.next_frame(),
            Err(FrameSourceError::EndOfStream)
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_directory_is_a_device_error() {
        let dir = std::env::temp_dir().join("game_watch_does_not_exist_9f2c");
        let result = FrameSourceImageDir::new(&dir, Arc::new(LoggerSilent::new()));
        assert!(matches!(result, Err(FrameSourceError::Device(_))));
    }

    #[test]
    fn test_unreadable_image_is_a_device_error() {
        let dir = scratch_dir("corrupt");
        std::fs::write(dir.join("broken.png"), b"not a png").unwrap();

        let source = FrameSourceImageDir::new(&dir, Arc::new(LoggerSilent::new())).unwrap();
        assert!(matches!(
            source.next_frame(),
            Err(FrameSourceError::Device(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}

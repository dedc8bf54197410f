use crate::error::FrameSourceError;
use crate::frame_source::interface::{Frame, FrameSource};
use crate::library::logger::interface::Logger;
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const FRAME_WIDTH: u32 = 128;
const FRAME_HEIGHT: u32 = 128;

pub struct FrameSourceFake {
    logger: Arc<dyn Logger + Send + Sync>,
    frames_served: AtomicUsize,
    frame_limit: Option<usize>,
}

impl FrameSourceFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("frame_source").with_namespace("fake"),
            frames_served: AtomicUsize::new(0),
            frame_limit: None,
        }
    }

    /// Ends the stream after `frame_limit` frames.
    pub fn with_frame_limit(mut self, frame_limit: usize) -> Self {
        self.frame_limit = Some(frame_limit);
        self
    }

    pub fn frames_served(&self) -> usize {
        self.frames_served.load(Ordering::SeqCst)
    }
}

impl FrameSource for FrameSourceFake {
    fn start(&self) -> Result<(), FrameSourceError> {
        let _ = self.logger.info("Frame source started");
        Ok(())
    }

    fn stop(&self) -> Result<(), FrameSourceError> {
        let _ = self.logger.info(&format!(
            "Frame source stopped after {} frames",
            self.frames_served()
        ));
        Ok(())
    }

    fn next_frame(&self) -> Result<Frame, FrameSourceError> {
        let served = self.frames_served.fetch_add(1, Ordering::SeqCst);

        if let Some(limit) = self.frame_limit {
            if served >= limit {
                self.frames_served.store(limit, Ordering::SeqCst);
                return Err(FrameSourceError::EndOfStream);
            }
        }

        let shade = rand::random::<u8>();
        let image = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([shade, shade, shade]));
        Ok(DynamicImage::ImageRgb8(image))
    }
}

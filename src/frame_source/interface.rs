use crate::error::FrameSourceError;
use image::DynamicImage;

pub type Frame = DynamicImage;

pub trait FrameSource {
    fn start(&self) -> Result<(), FrameSourceError>;
    fn stop(&self) -> Result<(), FrameSourceError>;
    /// Blocks until the next frame is available. `EndOfStream` is final.
    fn next_frame(&self) -> Result<Frame, FrameSourceError>;
}

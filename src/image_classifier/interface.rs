use crate::error::ClassificationError;
use crate::frame_source::interface::Frame;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub category_id: u32,
    pub confidence: f32,
}

pub trait ImageClassifier {
    fn classify(&self, frame: &Frame) -> Result<Classification, ClassificationError>;
}

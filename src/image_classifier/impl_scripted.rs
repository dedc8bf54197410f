use crate::error::ClassificationError;
use crate::frame_source::interface::Frame;
use crate::image_classifier::interface::{Classification, ImageClassifier};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers from a fixed script, cycling back to the start when it runs out.
pub struct ImageClassifierScripted {
    script: Vec<Result<Classification, ClassificationError>>,
    cursor: AtomicUsize,
}

impl ImageClassifierScripted {
    pub fn new(script: Vec<Result<Classification, ClassificationError>>) -> Self {
        Self {
            script,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn constant(category_id: u32, confidence: f32) -> Self {
        Self::new(vec![Ok(Classification {
            category_id,
            confidence,
        })])
    }

    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for ImageClassifierScripted {
    fn classify(&self, _frame: &Frame) -> Result<Classification, ClassificationError> {
        if self.script.is_empty() {
            return Err(ClassificationError("empty script".to_string()));
        }
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.script[index % self.script.len()].clone()
    }
}

use crate::error::ClassificationError;
use crate::frame_source::interface::Frame;
use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::library::logger::interface::Logger;
use rand::distr::{Distribution, Uniform};
use std::sync::Arc;

/// Picks a random known category with a random confidence for every frame.
pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    category_ids: Vec<u32>,
}

impl ImageClassifierFake {
    pub fn new(category_ids: Vec<u32>, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
            category_ids,
        }
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(&self, _frame: &Frame) -> Result<Classification, ClassificationError> {
        if self.category_ids.is_empty() {
            return Err(ClassificationError("no categories to pick from".to_string()));
        }

        let mut rng = rand::rng();

        let index_dist = Uniform::new(0, self.category_ids.len())
            .map_err(|e| ClassificationError(e.to_string()))?;
        let confidence_dist =
            Uniform::new_inclusive(0.0_f32, 1.0).map_err(|e| ClassificationError(e.to_string()))?;

        let classification = Classification {
            category_id: self.category_ids[index_dist.sample(&mut rng)],
            confidence: confidence_dist.sample(&mut rng),
        };

        let _ = self.logger.info(&format!(
            "category={} confidence={:.3}",
            classification.category_id, classification.confidence
        ));

        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_silent::LoggerSilent;
    use image::DynamicImage;

    #[test]
    fn test_picks_known_category_with_valid_confidence() {
        let classifier = ImageClassifierFake::new(vec![0, 1, 2, 3], Arc::new(LoggerSilent::new()));
        let frame = DynamicImage::new_rgb8(4, 4);

        for _ in 0..50 {
            let c = classifier.classify(&frame).unwrap();
            assert!(c.category_id <= 3);
            assert!((0.0..=1.0).contains(&c.confidence));
        }
    }

    #[test]
    fn test_fails_without_categories() {
        let classifier = ImageClassifierFake::new(vec![], Arc::new(LoggerSilent::new()));
        let frame = DynamicImage::new_rgb8(4, 4);
        assert!(classifier.classify(&frame).is_err());
    }
}

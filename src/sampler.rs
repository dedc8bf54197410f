use crate::clock::Moment;
use crate::error::{ClassificationError, FrameSourceError};
use crate::frame_source::interface::FrameSource;
use crate::image_classifier::interface::ImageClassifier;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub category_id: u32,
    pub confidence: f32,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error(transparent)]
    SourceExhausted(#[from] FrameSourceError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

impl SampleError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SampleError::SourceExhausted(_))
    }
}

/// Pulls one frame through the classifier every `sample_interval`.
pub struct Sampler {
    frame_source: Arc<dyn FrameSource + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    sample_interval: Duration,
    last_sample_at: Instant,
}

impl Sampler {
    /// The first sample is taken one full interval after `started_at`.
    pub fn new(
        frame_source: Arc<dyn FrameSource + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        sample_interval: Duration,
        started_at: Instant,
    ) -> Self {
        Self {
            frame_source,
            image_classifier,
            sample_interval,
            last_sample_at: started_at,
        }
    }

    pub fn last_sample_at(&self) -> Instant {
        self.last_sample_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_sample_at) >= self.sample_interval
    }

    /// `Ok(None)` means it is not yet time to sample. The clock only moves
    /// when an observation is actually produced.
    pub fn tick(&mut self, now: Moment) -> Result<Option<Observation>, SampleError> {
        if !self.is_due(now.instant) {
            return Ok(None);
        }

        let frame = self.frame_source.next_frame()?;
        let classification = self.image_classifier.classify(&frame)?;
        if !classification.confidence.is_finite()
            || !(0.0..=1.0).contains(&classification.confidence)
        {
            return Err(ClassificationError(format!(
                "confidence {} for category {} is outside [0, 1]",
                classification.confidence, classification.category_id
            ))
            .into());
        }

        self.last_sample_at = now.instant;

        Ok(Some(Observation {
            category_id: classification.category_id,
            confidence: classification.confidence,
            observed_at: now.wall,
        }))
    }
}

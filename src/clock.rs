use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// A point on both clocks: monotonic for cadence, wall for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub instant: Instant,
    pub wall: DateTime<Utc>,
}

impl Moment {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: Utc::now(),
        }
    }

    pub fn after(&self, elapsed: Duration) -> Self {
        Self {
            instant: self.instant + elapsed,
            wall: self.wall
                + chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero()),
        }
    }
}

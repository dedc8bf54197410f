use crate::clock::Moment;
use crate::sampler::Observation;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct FilterPolicy {
    pub confidence_threshold: f32,
    pub ignored_categories: HashSet<u32>,
}

impl FilterPolicy {
    pub fn is_eligible(&self, observation: &Observation) -> bool {
        observation.confidence >= self.confidence_threshold
            && !self.ignored_categories.contains(&observation.category_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub category_id: u32,
    pub confidence: f32,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Window {
    pub start: Instant,
    pub buffer: Vec<Observation>,
}

/// Folds eligible observations into one verdict per horizon.
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    policy: FilterPolicy,
    horizon: Duration,
    window: Window,
}

impl WindowAggregator {
    pub fn new(policy: FilterPolicy, horizon: Duration, start: Instant) -> Self {
        Self {
            policy,
            horizon,
            window: Window {
                start,
                buffer: Vec::new(),
            },
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns whether the observation was buffered.
    pub fn absorb(&mut self, observation: Observation) -> bool {
        if !self.policy.is_eligible(&observation) {
            return false;
        }
        self.window.buffer.push(observation);
        true
    }

    pub fn boundary_reached(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window.start) >= self.horizon
    }

    /// Majority category of the current buffer, ties going to the smallest
    /// id, paired with the highest confidence seen for that category.
    pub fn reduce(&self, decided_at: DateTime<Utc>) -> Option<Verdict> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for observation in &self.window.buffer {
            *counts.entry(observation.category_id).or_insert(0) += 1;
        }

        // Ascending id order plus strict `>` keeps the smallest id on ties.
        let mut winner: Option<(u32, usize)> = None;
        for (&category_id, &count) in &counts {
            match winner {
                Some((_, best)) if count <= best => {}
                _ => winner = Some((category_id, count)),
            }
        }
        let (category_id, _) = winner?;

        let confidence = self
            .window
            .buffer
            .iter()
            .filter(|o| o.category_id == category_id)
            .map(|o| o.confidence)
            .fold(f32::MIN, f32::max);

        Some(Verdict {
            category_id,
            confidence,
            decided_at,
        })
    }

    /// Reduces the current window and starts a fresh one at `now`, whether
    /// or not a verdict came out of it.
    pub fn close_window(&mut self, now: Moment) -> Option<Verdict> {
        let verdict = self.reduce(now.wall);
        self.window = Window {
            start: now.instant,
            buffer: Vec::new(),
        };
        verdict
    }
}

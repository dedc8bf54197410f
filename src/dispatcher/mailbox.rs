use crate::window_aggregator::Verdict;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Slot {
    pending: Option<Verdict>,
    closed: bool,
}

/// Holds at most one verdict waiting for delivery. A newer verdict replaces
/// an unsent older one.
#[derive(Default)]
pub struct Mailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the verdict that was replaced, if any. Ignored once closed.
    pub fn put(&self, verdict: Verdict) -> Option<Verdict> {
        let mut slot = self.lock();
        if slot.closed {
            return None;
        }
        let replaced = slot.pending.replace(verdict);
        self.ready.notify_one();
        replaced
    }

    /// Blocks until a verdict is waiting. `None` once closed and drained.
    pub fn take(&self) -> Option<Verdict> {
        let mut slot = self.lock();
        loop {
            if let Some(verdict) = slot.pending.take() {
                return Some(verdict);
            }
            if slot.closed {
                return None;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

use crate::window_aggregator::Verdict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchState {
    pub last_dispatched_category: Option<u32>,
    pub in_flight_category: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchDecision {
    Skip,
    SkipSameState(Verdict),
    SkipPending(Verdict),
    Dispatch(Verdict),
}

/// Decides which verdicts are worth reporting. Only a confirmed delivery
/// moves `last_dispatched_category`.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    state: DispatchState,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn evaluate(&mut self, verdict: Option<Verdict>) -> DispatchDecision {
        let Some(verdict) = verdict else {
            return DispatchDecision::Skip;
        };

        if self.state.in_flight_category == Some(verdict.category_id) {
            return DispatchDecision::SkipPending(verdict);
        }

        match self.state.in_flight_category {
            // A newer transition replaces whatever is queued, so a return to
            // the last delivered state has to be sent again.
            Some(_) => {}
            None if self.state.last_dispatched_category == Some(verdict.category_id) => {
                return DispatchDecision::SkipSameState(verdict);
            }
            None => {}
        }

        self.state.in_flight_category = Some(verdict.category_id);
        DispatchDecision::Dispatch(verdict)
    }

    /// Records the result of a dispatch the sink actually attempted.
    pub fn record_outcome(&mut self, category_id: u32, delivered: bool) {
        if delivered {
            self.state.last_dispatched_category = Some(category_id);
        }
        if self.state.in_flight_category == Some(category_id) {
            self.state.in_flight_category = None;
        }
    }

    /// A queued verdict was replaced before the sink ever saw it.
    pub fn record_superseded(&mut self, category_id: u32) {
        if self.state.in_flight_category == Some(category_id) {
            self.state.in_flight_category = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn verdict(category_id: u32) -> Verdict {
        Verdict {
            category_id,
            confidence: 0.9,
            decided_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_verdict_is_skipped() {
        let mut detector = ChangeDetector::new();
        assert_eq!(detector.evaluate(None), DispatchDecision::Skip);
        assert_eq!(detector.state(), DispatchState::default());
    }

    #[test]
    fn test_same_state_is_suppressed_after_success() {
        let mut detector = ChangeDetector::new();
        let first = verdict(2);
        assert_eq!(detector.evaluate(Some(first)), DispatchDecision::Dispatch(first));
        detector.record_outcome(2, true);
        assert_eq!(detector.state().last_dispatched_category, Some(2));

        let second = verdict(2);
        assert_eq!(
            detector.evaluate(Some(second)),
            DispatchDecision::SkipSameState(second)
        );
    }

    #[test]
    fn test_failed_delivery_keeps_previous_state() {
        let mut detector = ChangeDetector::new();
        detector.evaluate(Some(verdict(1)));
        detector.record_outcome(1, true);

        let failed = verdict(3);
        assert_eq!(detector.evaluate(Some(failed)), DispatchDecision::Dispatch(failed));
        detector.record_outcome(3, false);
        assert_eq!(
            detector.state(),
            DispatchState {
                last_dispatched_category: Some(1),
                in_flight_category: None,
            }
        );

        let retry = verdict(3);
        assert_eq!(detector.evaluate(Some(retry)), DispatchDecision::Dispatch(retry));
    }

    #[test]
    fn test_reconfirmation_while_in_flight_is_not_resent() {
        let mut detector = ChangeDetector::new();
        let first = verdict(4);
        assert_eq!(detector.evaluate(Some(first)), DispatchDecision::Dispatch(first));

        let again = verdict(4);
        assert_eq!(detector.evaluate(Some(again)), DispatchDecision::SkipPending(again));
    }

    #[test]
    fn test_superseded_return_to_last_state_is_resent() {
        let mut detector = ChangeDetector::new();
        detector.evaluate(Some(verdict(1)));
        detector.record_outcome(1, true);

        // 2 is queued, then the screen goes back to 1 before 2 was sent.
        detector.evaluate(Some(verdict(2)));
        let back = verdict(1);
        assert_eq!(detector.evaluate(Some(back)), DispatchDecision::Dispatch(back));
        detector.record_superseded(2);
        assert_eq!(detector.state().in_flight_category, Some(1));
    }

    #[test]
    fn test_never_two_consecutive_dispatches_for_same_category() {
        let mut detector = ChangeDetector::new();
        let mut dispatched = Vec::new();

        for category in [1, 1, 2, 2, 2, 1] {
            if let DispatchDecision::Dispatch(v) = detector.evaluate(Some(verdict(category))) {
                detector.record_outcome(v.category_id, true);
                dispatched.push(v.category_id);
            }
        }

        assert_eq!(dispatched, vec![1, 2, 1]);
    }
}

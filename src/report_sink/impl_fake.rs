use crate::dispatcher::report::Report;
use crate::error::DeliveryError;
use crate::library::logger::interface::Logger;
use crate::report_sink::interface::{Ack, ReportSink};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Keeps reports in memory. Failures can be queued up front to simulate an
/// unreliable endpoint.
pub struct ReportSinkFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delivered: Mutex<Vec<Report>>,
    attempts: Mutex<Vec<Report>>,
    failures: Mutex<VecDeque<DeliveryError>>,
    latency: Duration,
}

impl ReportSinkFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("report_sink").with_namespace("fake"),
            delivered: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The next call to `send` fails with `error`.
    pub fn fail_next(&self, error: DeliveryError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    pub fn delivered(&self) -> Vec<Report> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attempts(&self) -> Vec<Report> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for ReportSinkFake {
    fn send(&self, report: &Report) -> Result<Ack, DeliveryError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let _ = self.logger.info(&format!(
            "{} ({}) confidence={} at {}",
            report.class_name, report.class_id, report.confidence, report.timestamp
        ));
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(Ack { status: 200 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_silent::LoggerSilent;

    fn report(class_id: u32) -> Report {
        Report {
            class_id,
            class_name: "x".to_string(),
            confidence: 0.5,
            timestamp: "2026-10-19T00:00:00.000+00:00".to_string(),
        }
    }

    #[test]
    fn test_queued_failure_applies_once() {
        let sink = ReportSinkFake::new(Arc::new(LoggerSilent::new()));
        sink.fail_next(DeliveryError::Status { status: 500 });

        assert_eq!(
            sink.send(&report(1)),
            Err(DeliveryError::Status { status: 500 })
        );
        assert_eq!(sink.send(&report(1)), Ok(Ack { status: 200 }));
        assert_eq!(sink.attempts().len(), 2);
        assert_eq!(sink.delivered(), vec![report(1)]);
    }
}

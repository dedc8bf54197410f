use crate::dispatcher::mailbox::Mailbox;
use crate::dispatcher::report::Report;
use crate::error::DeliveryError;
use crate::library::logger::interface::Logger;
use crate::report_sink::interface::{Ack, ReportSink};
use crate::window_aggregator::Verdict;
use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub type DispatchResult = Result<Ack, DeliveryError>;

/// Delivers verdicts on its own thread so a slow sink never holds up
/// sampling. At most one verdict waits while another is being sent.
pub struct Dispatcher {
    mailbox: Arc<Mailbox>,
    finished: Receiver<()>,
    worker: Option<JoinHandle<()>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl Dispatcher {
    pub fn spawn<F>(
        report_sink: Arc<dyn ReportSink + Send + Sync>,
        category_names: BTreeMap<u32, String>,
        timezone: chrono::FixedOffset,
        logger: Arc<dyn Logger + Send + Sync>,
        on_outcome: F,
    ) -> Self
    where
        F: Fn(Verdict, DispatchResult) + Send + 'static,
    {
        let logger = logger.with_namespace("dispatcher");
        let mailbox = Arc::new(Mailbox::new());
        let (finished_sender, finished) = channel();

        let worker = {
            let mailbox = mailbox.clone();
            let logger = logger.clone();
            std::thread::spawn(move || {
                while let Some(verdict) = mailbox.take() {
                    let report = Report::from_verdict(&verdict, &category_names, timezone);
                    let _ = logger.info(&format!(
                        "Sending {} ({}) confidence={}",
                        report.class_name, report.class_id, report.confidence
                    ));

                    let result = report_sink.send(&report);
                    match &result {
                        Ok(ack) => {
                            let _ = logger.info(&format!("Report accepted ({})", ack.status));
                        }
                        Err(e) => {
                            let _ = logger.warn(&format!(
                                "Report for {} dropped: {}",
                                report.class_name, e
                            ));
                        }
                    }
                    on_outcome(verdict, result);
                }
                let _ = finished_sender.send(());
            })
        };

        Self {
            mailbox,
            finished,
            worker: Some(worker),
            logger,
        }
    }

    /// Queues `verdict` for delivery, returning the unsent verdict it replaced.
    pub fn submit(&self, verdict: Verdict) -> Option<Verdict> {
        let replaced = self.mailbox.put(verdict);
        if let Some(old) = &replaced {
            let _ = self.logger.info(&format!(
                "Category {} superseded by {} before sending",
                old.category_id, verdict.category_id
            ));
        }
        replaced
    }

    /// Lets the current and queued deliveries finish, waiting at most
    /// `grace`. Returns false if the worker was still busy when time ran out.
    pub fn shutdown(mut self, grace: Duration) -> bool {
        self.mailbox.close();

        match self.finished.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(worker) = self.worker.take() {
                    let _ = worker.join();
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                let _ = self
                    .logger
                    .warn("Delivery still in progress after grace period, leaving it behind");
                false
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.mailbox.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_silent::LoggerSilent;
    use crate::report_sink::impl_fake::ReportSinkFake;
    use chrono::Utc;
    use std::sync::mpsc::Sender;

    fn verdict(category_id: u32) -> Verdict {
        Verdict {
            category_id,
            confidence: 0.8,
            decided_at: Utc::now(),
        }
    }

    fn spawn_with(sink: Arc<ReportSinkFake>) -> (Dispatcher, Receiver<(u32, DispatchResult)>) {
        let (sender, receiver): (Sender<(u32, DispatchResult)>, _) = channel();
        let dispatcher = Dispatcher::spawn(
            sink,
            BTreeMap::from([(1, "one".to_string()), (2, "two".to_string())]),
            chrono::FixedOffset::east_opt(0).unwrap(),
            Arc::new(LoggerSilent::new()),
            move |verdict, result| {
                let _ = sender.send((verdict.category_id, result));
            },
        );
        (dispatcher, receiver)
    }

    #[test]
    fn test_delivers_and_reports_outcome() {
        let sink = Arc::new(ReportSinkFake::new(Arc::new(LoggerSilent::new())));
        let (dispatcher, outcomes) = spawn_with(sink.clone());

        assert!(dispatcher.submit(verdict(2)).is_none());
        let (category, result) = outcomes.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(category, 2);
        assert_eq!(result, Ok(Ack { status: 200 }));
        assert_eq!(sink.delivered()[0].class_name, "two");

        assert!(dispatcher.shutdown(Duration::from_secs(1)));
    }

    #[test]
    fn test_failure_is_reported_not_retried() {
        let sink = Arc::new(ReportSinkFake::new(Arc::new(LoggerSilent::new())));
        sink.fail_next(DeliveryError::Status { status: 502 });
        let (dispatcher, outcomes) = spawn_with(sink.clone());

        dispatcher.submit(verdict(1));
        let (category, result) = outcomes.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(category, 1);
        assert_eq!(result, Err(DeliveryError::Status { status: 502 }));

        assert!(dispatcher.shutdown(Duration::from_secs(1)));
        assert_eq!(sink.attempts().len(), 1);
        assert!(sink.delivered().is_empty());
    }

    #[test]
    fn test_latest_verdict_wins_while_sink_is_busy() {
        let sink = Arc::new(
            ReportSinkFake::new(Arc::new(LoggerSilent::new()))
                .with_latency(Duration::from_millis(150)),
        );
        let (dispatcher, outcomes) = spawn_with(sink.clone());

        dispatcher.submit(verdict(1));
        std::thread::sleep(Duration::from_millis(50));
        // 1 is on the wire; 2 waits and is then replaced by 3.
        assert!(dispatcher.submit(verdict(2)).is_none());
        let replaced = dispatcher.submit(verdict(3)).unwrap();
        assert_eq!(replaced.category_id, 2);

        assert!(dispatcher.shutdown(Duration::from_secs(2)));
        let delivered: Vec<u32> = outcomes.try_iter().map(|(c, _)| c).collect();
        assert_eq!(delivered, vec![1, 3]);
    }

    #[test]
    fn test_shutdown_gives_up_after_grace() {
        let sink = Arc::new(
            ReportSinkFake::new(Arc::new(LoggerSilent::new()))
                .with_latency(Duration::from_millis(500)),
        );
        let (dispatcher, _outcomes) = spawn_with(sink);

        dispatcher.submit(verdict(1));
        std::thread::sleep(Duration::from_millis(20));
        assert!(!dispatcher.shutdown(Duration::from_millis(50)));
    }
}

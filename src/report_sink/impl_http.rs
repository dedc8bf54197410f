use crate::dispatcher::report::Report;
use crate::error::DeliveryError;
use crate::library::logger::interface::Logger;
use crate::report_sink::interface::{Ack, ReportSink};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub struct ReportSinkHttp {
    agent: ureq::Agent,
    endpoint: String,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ReportSinkHttp {
    pub fn new(endpoint: &str, timeout: Duration, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: endpoint.to_string(),
            logger: logger.with_namespace("report_sink").with_namespace("http"),
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    transport
        .source()
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .map(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
        .unwrap_or(false)
}

impl ReportSink for ReportSinkHttp {
    fn send(&self, report: &Report) -> Result<Ack, DeliveryError> {
        let body = serde_json::to_value(report).map_err(|e| DeliveryError::Encode(e.to_string()))?;

        let response = self
            .agent
            .post(&self.endpoint)
            .set("content-type", "application/json")
            .send_json(body);

        match response {
            Ok(response) => {
                let status = response.status();
                if (200..300).contains(&status) {
                    let _ = self
                        .logger
                        .info(&format!("POST {} -> {}", self.endpoint, status));
                    Ok(Ack { status })
                } else {
                    Err(DeliveryError::Status { status })
                }
            }
            Err(ureq::Error::Status(status, _)) => Err(DeliveryError::Status { status }),
            Err(ureq::Error::Transport(transport)) => {
                if is_timeout(&transport) {
                    Err(DeliveryError::Timeout(transport.to_string()))
                } else {
                    Err(DeliveryError::Transport(transport.to_string()))
                }
            }
        }
    }
}

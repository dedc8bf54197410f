use crate::dispatcher::report::Report;
use crate::error::DeliveryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
}

pub trait ReportSink {
    /// One delivery attempt. Retrying is up to the caller.
    fn send(&self, report: &Report) -> Result<Ack, DeliveryError>;
}

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameSourceError {
    #[error("frame source reached end of stream")]
    EndOfStream,
    #[error("frame source failed: {0}")]
    Device(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("classification failed: {0}")]
pub struct ClassificationError(pub String);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("report sink answered with status {status}")]
    Status { status: u16 },
    #[error("report sink timed out: {0}")]
    Timeout(String),
    #[error("report sink unreachable: {0}")]
    Transport(String),
    #[error("report could not be encoded: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API_URL is not set")]
    MissingEndpoint,
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("frame source exhausted: {0}")]
    SourceExhausted(#[from] FrameSourceError),
    #[error("event channel closed")]
    ChannelClosed,
}

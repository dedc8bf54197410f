use crate::library::logger::interface::{LogResult, Logger};
use std::sync::Arc;

/// Drops every line. Used where console output would only be noise.
#[derive(Debug, Clone, Default)]
pub struct LoggerSilent;

impl LoggerSilent {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for LoggerSilent {
    fn info(&self, _message: &str) -> LogResult {
        Ok(())
    }

    fn warn(&self, _message: &str) -> LogResult {
        Ok(())
    }

    fn error(&self, _message: &str) -> LogResult {
        Ok(())
    }

    fn with_namespace(&self, _namespace: &str) -> Arc<dyn Logger + Send + Sync> {
        Arc::new(LoggerSilent)
    }
}

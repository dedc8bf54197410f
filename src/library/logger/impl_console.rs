use crate::library::logger::interface::{LogResult, Logger};
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LoggerConsole {
    namespace: Option<String>,
    timezone: chrono::FixedOffset,
}

impl LoggerConsole {
    pub fn new(timezone: chrono::FixedOffset) -> Self {
        Self {
            namespace: None,
            timezone,
        }
    }

    fn line(&self, level: &str, message: &str) -> String {
        let local_time = Utc::now().with_timezone(&self.timezone);
        let formatted = local_time.format("%Y-%m-%d %I:%M:%S%.3f %p");
        match &self.namespace {
            Some(namespace) => format!("[{}] {} {}: {}", formatted, level, namespace, message),
            None => format!("[{}] {} {}", formatted, level, message),
        }
    }
}

impl Logger for LoggerConsole {
    fn info(&self, message: &str) -> LogResult {
        println!("{}", self.line("INFO", message));
        Ok(())
    }

    fn warn(&self, message: &str) -> LogResult {
        eprintln!("{}", self.line("WARN", message));
        Ok(())
    }

    fn error(&self, message: &str) -> LogResult {
        eprintln!("{}", self.line("ERROR", message));
        Ok(())
    }

    fn with_namespace(&self, namespace: &str) -> Arc<dyn Logger + Send + Sync> {
        let new_namespace = match &self.namespace {
            Some(current) => format!("{}:{}", current, namespace),
            None => namespace.to_string(),
        };

        Arc::new(LoggerConsole {
            namespace: Some(new_namespace),
            timezone: self.timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_line_without_namespace() {
        let logger = LoggerConsole::new(utc());
        let line = logger.line("INFO", "hello");
        assert!(line.ends_with("] INFO hello"));
    }

    #[test]
    fn test_nested_namespace() {
        let logger = LoggerConsole {
            namespace: Some("game_watch".to_string()),
            timezone: utc(),
        };
        let line = logger.line("WARN", "slow");
        assert!(line.ends_with("] WARN game_watch: slow"));
        assert!(logger.with_namespace("sampler").info("ok").is_ok());
    }
}

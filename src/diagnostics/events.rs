//! Event system for pipeline diagnostics

use super::codes::Code;
use crate::config::constants::compile_time::diagnostics::MAX_MESSAGE_LENGTH;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Core diagnostic event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        // Messages can embed caller-provided logic strings; cap them at the
        // retention bound
        let message = if message.len() > MAX_MESSAGE_LENGTH {
            let mut end = MAX_MESSAGE_LENGTH;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message[..end].to_string()
        } else {
            message.to_string()
        };
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message,
            context: HashMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    /// Create a warning event with a generic code
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Create a warning event with a specific code
    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    /// Create an info event (info may not need codes)
    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Add the id of the record being processed
    pub fn with_record_id(self, id: &str) -> Self {
        self.with_context("record_id", id)
    }

    /// Check if this is an error event
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    /// Check if this is a warning event
    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    /// Render the event for console output
    pub fn format_console(&self) -> String {
        let mut line = format!(
            "[{}] {} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level.as_str(),
            self.code.as_str(),
            self.message
        );

        if !self.context.is_empty() {
            let mut pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            pairs.sort();
            line.push_str(&format!(" ({})", pairs.join(", ")));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::codes;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_event_construction() {
        let event = LogEvent::warning_with_code(
            codes::eval::UNRESOLVED_FIELD_REFERENCE,
            "field not present in record",
        )
        .with_context("field", "q17")
        .with_record_id("ABC123");

        assert!(event.is_warning());
        assert_eq!(event.code.as_str(), "W030");
        assert_eq!(event.context.get("field").map(String::as_str), Some("q17"));

        let rendered = event.format_console();
        assert!(rendered.contains("[W030]"));
        assert!(rendered.contains("record_id=ABC123"));
    }
}

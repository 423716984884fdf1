//! Diagnostics service implementation

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use crate::config::constants::compile_time::diagnostics::MAX_RETAINED_EVENTS;
use std::sync::{Arc, Mutex};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main diagnostics service with level filtering
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    /// Create new service with specified logger and minimum level
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Console service at warning level, the default for library use
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleLogger), LogLevel::Warning)
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Log an event
    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    /// Convenience method: log error with code
    pub fn log_error(&self, code: Code, message: &str) {
        self.log_event(LogEvent::error(code, message));
    }

    /// Convenience method: log warning with code
    pub fn log_warning_with_code(&self, code: Code, message: &str) {
        self.log_event(LogEvent::warning_with_code(code, message));
    }

    /// Convenience method: log success
    pub fn log_success(&self, code: Code, message: &str) {
        self.log_event(LogEvent::success(code, message));
    }
}

/// Simple console logger writing to stderr
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", event.format_console());
    }
}

/// In-memory logger for test inspection and batch reporting
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all retained events
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Retained events matching a specific code
    pub fn events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.code == code)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.events().iter().filter(|e| e.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.events().iter().filter(|e| e.is_warning()).count()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            // Oldest events are dropped first once the retention bound is hit
            if events.len() >= MAX_RETAINED_EVENTS {
                events.remove(0);
            }
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::codes;

    #[test]
    fn test_level_filtering() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_event(LogEvent::debug("not retained"));
        service.log_event(LogEvent::info("not retained"));
        service.log_event(LogEvent::warning("retained"));
        service.log_event(LogEvent::error(
            codes::classify::STAGE_OUT_OF_ORDER,
            "retained",
        ));

        assert_eq!(memory.events().len(), 2);
        assert_eq!(memory.error_count(), 1);
        assert_eq!(memory.warning_count(), 1);
    }

    #[test]
    fn test_memory_logger_code_filter() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Debug);

        service.log_warning_with_code(codes::eval::UNRESOLVED_FIELD_REFERENCE, "one");
        service.log_warning_with_code(codes::syntax::MALFORMED_EXPRESSION, "two");

        let unresolved = memory.events_with_code(codes::eval::UNRESOLVED_FIELD_REFERENCE);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].message, "one");
    }
}

//! Global diagnostics module
//!
//! Provides a thread-safe global diagnostic sink with per-record context and
//! a clean macro interface. Every data-shape anomaly the pipeline recovers
//! from is reported here; emission is best-effort and never panics when the
//! sink is uninitialized.

pub mod codes;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static RECORD_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global diagnostics with the default console sink
pub fn init_diagnostics() -> Result<(), String> {
    init_diagnostics_with_service(Arc::new(LoggingService::console()))
}

/// Initialize with a custom service (primarily for testing)
pub fn init_diagnostics_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global diagnostics already initialized".to_string())?;

    if let Some(logger) = try_get_global_logger() {
        logger.log_success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Diagnostics system initialized",
        );
    }
    Ok(())
}

/// Check if global diagnostics is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to the global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// RECORD CONTEXT MANAGEMENT
// ============================================================================

/// Tag subsequent diagnostics on this thread with a record id
pub fn set_record_context(record_id: &str) {
    RECORD_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(record_id.to_string());
    });
}

/// Clear the record context for this thread
pub fn clear_record_context() {
    RECORD_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute a closure with a record context installed
pub fn with_record_context<F, R>(record_id: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_record_context(record_id);
    let result = f();
    clear_record_context();
    result
}

/// Get current record context (used by macros)
pub fn get_current_record_context() -> Option<String> {
    RECORD_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn attach_record_context(mut event: LogEvent) -> LogEvent {
    if let Some(record_id) = get_current_record_context() {
        event = event.with_record_id(&record_id);
    }
    event
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::error(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_record_context(event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::warning_with_code(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_record_context(event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_record_context(event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_record_context(event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log debug with context (used by log_debug! macro)
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::debug(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_record_context(event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_context_management() {
        assert!(get_current_record_context().is_none());

        set_record_context("SUBJ001");
        assert_eq!(get_current_record_context().as_deref(), Some("SUBJ001"));

        clear_record_context();
        assert!(get_current_record_context().is_none());
    }

    #[test]
    fn test_with_record_context() {
        let result = with_record_context("SUBJ002", || {
            assert_eq!(get_current_record_context().as_deref(), Some("SUBJ002"));
            42
        });
        assert_eq!(result, 42);
        assert!(get_current_record_context().is_none());
    }

    #[test]
    fn test_emission_without_initialization_does_not_panic() {
        // The global sink may or may not be installed depending on test
        // ordering; emission must be safe either way.
        log_warning_with_context(
            codes::eval::UNRESOLVED_FIELD_REFERENCE,
            "field missing",
            vec![("field", "q1")],
        );
    }
}

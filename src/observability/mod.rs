//! Observability for agora
//!
//! Structured JSON logs, one line per event:
//! - `event` first, then `severity`, then caller fields sorted by key
//! - ERROR and FATAL go to stderr, everything else to stdout
//! - Logging never fails the caller
//!
//! ```ignore
//! use agora::observability::{log_event_with_fields, LogEvent};
//!
//! log_event_with_fields(LogEvent::MutationApplied, &[("collection", "node")]);
//! ```

mod events;
mod logger;

pub use events::LogEvent;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: LogEvent, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

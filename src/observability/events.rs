//! Observable events in agora
//!
//! Events are explicit and typed so that log consumers can grep for a
//! stable name instead of free-form text.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Every entity descriptor built and verified
    SchemasVerified,
    /// An entity descriptor is malformed (FATAL)
    SchemaInvalid,
    /// Listener bound, serving requests
    ServerStarted,

    // Connections
    /// A client connection was accepted and subscribed
    ConnectionOpened,
    /// A client connection went away and was unsubscribed
    ConnectionClosed,

    // Pipeline
    /// A create/update/remove reached the store and succeeded
    MutationApplied,
    /// A mutation was refused (validation, identity, store)
    MutationRejected,
    /// An event was fanned out to subscribers
    EventPublished,
    /// A subscriber's queue was full and missed an event
    EventDropped,

    // Requests
    /// A request frame could not be parsed
    RequestMalformed,
    /// A module action failed with an unexpected error
    RequestFailed,
}

impl LogEvent {
    /// Returns the stable event name
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEvent::ConfigLoaded => "CONFIG_LOADED",
            LogEvent::SchemasVerified => "SCHEMAS_VERIFIED",
            LogEvent::SchemaInvalid => "SCHEMA_INVALID",
            LogEvent::ServerStarted => "SERVER_STARTED",
            LogEvent::ConnectionOpened => "CONNECTION_OPENED",
            LogEvent::ConnectionClosed => "CONNECTION_CLOSED",
            LogEvent::MutationApplied => "MUTATION_APPLIED",
            LogEvent::MutationRejected => "MUTATION_REJECTED",
            LogEvent::EventPublished => "EVENT_PUBLISHED",
            LogEvent::EventDropped => "EVENT_DROPPED",
            LogEvent::RequestMalformed => "REQUEST_MALFORMED",
            LogEvent::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::SchemaInvalid => Severity::Fatal,
            LogEvent::RequestMalformed | LogEvent::RequestFailed => Severity::Error,
            LogEvent::MutationRejected | LogEvent::EventDropped => Severity::Warn,
            LogEvent::EventPublished => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Whether this event means the process cannot continue
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        for event in [
            LogEvent::ConfigLoaded,
            LogEvent::ServerStarted,
            LogEvent::MutationApplied,
            LogEvent::EventPublished,
        ] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_only_schema_invalid_is_fatal() {
        assert!(LogEvent::SchemaInvalid.is_fatal());
        assert!(!LogEvent::MutationRejected.is_fatal());
        assert!(!LogEvent::RequestFailed.is_fatal());
    }
}

//! # Forum Entities
//!
//! Record types that go through the mutation pipeline, their descriptors,
//! and the read-side helpers modules use to look them up.
//!
//! Every entity deserializes from both client bodies (`id`) and stored
//! documents (`_id`), and serializes with `id` for responses.

mod node;
mod notice;
mod replay;
mod topic;
mod user;

pub use node::Node;
pub use notice::{Notice, NOTICE_REPLY};
pub use replay::Replay;
pub use topic::Topic;
pub use user::User;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::observability::{log_event_with_fields, LogEvent};
use crate::schema::{SchemaError, SchemaResult};
use crate::storage::{StoreError, StoreResult};

/// Decode a stored document into an entity
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

/// Decode a list of stored documents
pub(crate) fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> StoreResult<Vec<T>> {
    values.into_iter().map(decode).collect()
}

/// Seconds since the Unix epoch
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Build every entity descriptor and report the first structural error.
///
/// Run once at startup so a malformed descriptor stops the process before
/// it serves a request.
pub fn verify_catalog() -> SchemaResult<usize> {
    let checks: [(&str, fn() -> Result<(), SchemaError>); 5] = [
        ("Node", || node::node_schema().map(drop)),
        ("User", || user::user_schema().map(drop)),
        ("Topic", || topic::topic_schema().map(drop)),
        ("Replay", || replay::replay_schema().map(drop)),
        ("Notice", || notice::notice_schema().map(drop)),
    ];

    for (entity, check) in checks {
        if let Err(err) = check() {
            log_event_with_fields(
                LogEvent::SchemaInvalid,
                &[("entity", entity), ("reason", &err.to_string())],
            );
            return Err(err);
        }
    }

    log_event_with_fields(LogEvent::SchemasVerified, &[("count", &checks.len().to_string())]);
    Ok(checks.len())
}

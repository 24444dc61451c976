//! # Forum Modules
//!
//! Request routing for the `node`, `user`, `topic`, `replay` and `notice`
//! modules. Every action parses its body, runs through the mutation
//! pipeline, and ends as a `Response`.
//!
//! | module | actions                     |
//! |--------|-----------------------------|
//! | node   | add, save, remove, list, info |
//! | user   | reg, login, check           |
//! | topic  | add, list, info             |
//! | replay | add, list                   |
//! | notice | list, read, remove          |

mod errors;
mod node;
mod notice;
mod replay;
mod response;
mod topic;
mod user;

pub use errors::{ForumError, ForumResult};
pub use response::Response;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::auth::Session;
use crate::mutation::{MutationError, MutationExecutor};
use crate::observability::{log_event_with_fields, LogEvent};
use crate::schema::Validator;
use crate::storage::DocumentStore;

/// Who is asking: the connection's session and where it comes from
#[derive(Debug)]
pub struct RequestContext<'a> {
    pub session: &'a Session,
    pub client_ip: String,
}

impl<'a> RequestContext<'a> {
    pub fn new(session: &'a Session, client_ip: impl Into<String>) -> Self {
        Self {
            session,
            client_ip: client_ip.into(),
        }
    }
}

/// The forum service shared by every connection
#[derive(Clone)]
pub struct Forum {
    executor: MutationExecutor,
    page_size: usize,
}

impl Forum {
    pub fn new(executor: MutationExecutor, page_size: usize) -> Self {
        Self {
            executor,
            page_size: page_size.max(1),
        }
    }

    pub fn executor(&self) -> &MutationExecutor {
        &self.executor
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.executor.store()
    }

    pub fn validator(&self) -> &Validator {
        self.executor.validator()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Route one request to its module action
    pub fn dispatch(
        &self,
        ctx: &RequestContext<'_>,
        module: &str,
        action: &str,
        body: &Value,
    ) -> Response {
        let result = match (module, action) {
            ("node", "add") => node::add(self, body),
            ("node", "save") => node::save(self, body),
            ("node", "remove") => node::remove(self, body),
            ("node", "list") => node::list(self),
            ("node", "info") => node::info(self, body),
            ("user", "reg") => user::reg(self, ctx, body),
            ("user", "login") => user::login(self, ctx, body),
            ("user", "check") => user::check(self, body),
            ("topic", "add") => topic::add(self, ctx, body),
            ("topic", "list") => topic::list(self, body),
            ("topic", "info") => topic::info(self, body),
            ("replay", "add") => replay::add(self, ctx, body),
            ("replay", "list") => replay::list(self, body),
            ("notice", "list") => notice::list(self, ctx, body),
            ("notice", "read") => notice::read(self, ctx, body),
            ("notice", "remove") => notice::remove(self, ctx, body),
            _ => Err(ForumError::UnknownAction {
                module: module.to_string(),
                action: action.to_string(),
            }),
        };

        if let Err(err) = &result {
            if err.is_malformed() {
                log_event_with_fields(
                    LogEvent::RequestMalformed,
                    &[("module", module), ("action", action), ("reason", &err.to_string())],
                );
            } else if err.is_internal() {
                log_event_with_fields(
                    LogEvent::RequestFailed,
                    &[("module", module), ("action", action), ("reason", &err.to_string())],
                );
            }
        }

        Response::from(result)
    }
}

/// Decode a request body. A missing body reads as `{}`.
fn parse<T: DeserializeOwned>(body: &Value) -> ForumResult<T> {
    let body = if body.is_null() {
        Value::Object(Map::new())
    } else {
        body.clone()
    };
    serde_json::from_value(body).map_err(|e| ForumError::MalformedRequest(e.to_string()))
}

/// Fail fast on a blank identifier
fn require_id(id: &str) -> ForumResult<()> {
    if id.trim().is_empty() {
        return Err(MutationError::EmptyIdentity.into());
    }
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> ForumResult<Option<Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

/// One page of a listing
fn page_of<T: Serialize>(items: &[T], total: usize, page: usize) -> ForumResult<Option<Value>> {
    Ok(Some(json!({
        "items": serde_json::to_value(items)?,
        "total": total,
        "page": page.max(1),
    })))
}

/// Body of actions addressing one record
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ById {
    id: String,
}

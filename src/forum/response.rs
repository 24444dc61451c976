//! # Responses
//!
//! Every action ends in exactly one of two shapes.

use serde_json::{json, Value};

use super::errors::ForumResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Option<Value>),
    Failure(String),
}

impl Response {
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Response::Success(data) => data.as_ref(),
            Response::Failure(_) => None,
        }
    }

    /// Failure message, if this is a failure
    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Success(_) => None,
            Response::Failure(message) => Some(message),
        }
    }

    /// Reply frame for the transport
    pub fn to_frame(&self, module: &str, action: &str) -> Value {
        match self {
            Response::Success(data) => {
                let mut frame = json!({
                    "type": "success",
                    "module": module,
                    "action": action,
                });
                if let Some(data) = data {
                    frame["data"] = data.clone();
                }
                frame
            }
            Response::Failure(message) => json!({
                "type": "failure",
                "module": module,
                "action": action,
                "message": message,
            }),
        }
    }
}

impl From<ForumResult<Option<Value>>> for Response {
    fn from(result: ForumResult<Option<Value>>) -> Self {
        match result {
            Ok(data) => Response::Success(data),
            Err(err) => Response::Failure(err.client_message()),
        }
    }
}

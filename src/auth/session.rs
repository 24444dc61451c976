//! # Connection Sessions
//!
//! A small key/value map owned by one connection. Modules read and write
//! it; the transport creates it on connect and drops it on disconnect.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use super::errors::{AuthError, AuthResult};

pub const USER_ID: &str = "user_id";
pub const USER_NAME: &str = "user_name";
pub const USER_EMAIL: &str = "user_email";

/// Identity of the logged-in user on a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub name: String,
}

/// Per-connection session state
#[derive(Debug, Default)]
pub struct Session {
    values: RwLock<HashMap<String, Value>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Record a successful login
    pub fn login(&self, id: &str, name: &str, email: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(USER_ID.to_string(), Value::from(id));
        values.insert(USER_NAME.to_string(), Value::from(name));
        values.insert(USER_EMAIL.to_string(), Value::from(email));
    }

    /// The logged-in user, if any
    pub fn principal(&self) -> Option<Principal> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let id = values.get(USER_ID)?.as_str()?;
        let name = values.get(USER_NAME)?.as_str()?;
        Some(Principal {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    /// Like `principal`, but a missing login is an error
    pub fn require_login(&self) -> AuthResult<Principal> {
        self.principal().ok_or(AuthError::NotLoggedIn)
    }
}

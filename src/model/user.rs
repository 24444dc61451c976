//! Registered accounts

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::decode;
use crate::schema::{cached, Entity, EntitySchema, FieldSpec, MutationTag, Rule, SchemaResult};
use crate::storage::{DocumentStore, Filter, FindOptions, StoreResult};

pub(super) const COLLECTION: &str = "user";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "id", alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Plain text on the way in, Argon2 hash once stored; never serialized
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reg_ip: String,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub reg_time: i64,
}

fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

pub(super) fn user_schema() -> SchemaResult<EntitySchema<User>> {
    EntitySchema::builder("User", COLLECTION)
        .identity("Id", "_id", |u: &User| json!(u.id))
        .field(
            FieldSpec::new("Name", "name", MutationTag::InsertOnly, |u: &User| json!(u.name))
                .rules([Rule::Required, Rule::Min(4), Rule::Max(15), Rule::AlphaNum]),
        )
        .field(
            FieldSpec::new("Email", "email", MutationTag::Both, |u: &User| json!(u.email))
                .rules([Rule::Required, Rule::Min(8), Rule::Max(30), Rule::Email]),
        )
        .field(
            FieldSpec::new("Password", "password", MutationTag::Both, |u: &User| {
                json!(u.password)
            })
            .rules([Rule::Required, Rule::Min(8), Rule::Max(20), Rule::AlphaNum]),
        )
        .field(FieldSpec::new("RegIP", "reg_ip", MutationTag::InsertOnly, |u: &User| {
            json!(u.reg_ip)
        }))
        .field(FieldSpec::new("RegTime", "reg_time", MutationTag::InsertOnly, |u: &User| {
            json!(u.reg_time)
        }))
        .build()
}

impl Entity for User {
    fn schema() -> &'static EntitySchema<Self> {
        static SCHEMA: OnceLock<EntitySchema<User>> = OnceLock::new();
        cached(&SCHEMA, user_schema)
    }
}

impl User {
    pub fn find_by_name(store: &dyn DocumentStore, name: &str) -> StoreResult<Option<User>> {
        let filter = Filter::all().eq("name", name);
        let mut found = store.find(COLLECTION, &filter, FindOptions::page(1, 1))?;
        found.pop().map(decode).transpose()
    }

    pub fn name_exists(store: &dyn DocumentStore, name: &str) -> StoreResult<bool> {
        Ok(store.count(COLLECTION, &Filter::all().eq("name", name))? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Validator;

    fn alice() -> User {
        User {
            name: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret123".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(Validator::new().validate(&alice()).is_ok());
    }

    #[test]
    fn test_three_letter_name_rejected() {
        let user = User {
            name: "bob".into(),
            ..alice()
        };
        let failure = Validator::new().validate(&user).unwrap_err();
        assert_eq!(failure.field(), "Name");
        assert_eq!(failure.message(), "Name must be at least 4 characters in length");
    }

    #[test]
    fn test_bad_email_rejected() {
        let user = User {
            email: "alice-at-example".into(),
            ..alice()
        };
        assert_eq!(Validator::new().validate(&user).unwrap_err().rule(), "email");
    }

    #[test]
    fn test_password_never_serialized() {
        let encoded = serde_json::to_value(alice()).unwrap();
        assert!(encoded.get("password").is_none());
        assert_eq!(encoded["name"], "alice");
    }

    #[test]
    fn test_password_read_from_body() {
        let user: User =
            serde_json::from_value(json!({"name": "alice", "password": "secret123"})).unwrap();
        assert_eq!(user.password, "secret123");
    }
}

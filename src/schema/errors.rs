//! Schema error types
//!
//! Two families live here:
//! - `SchemaError`: a descriptor is malformed. Fatal at startup.
//! - `ValidationFailure`: an entity value broke a rule. Returned to the caller.

use thiserror::Error;

/// Result type for descriptor construction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for the validation gate
pub type ValidationResult = Result<(), ValidationFailure>;

/// Structural problems in an entity descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Descriptor has no collection name
    #[error("Entity '{entity}' has an empty collection name")]
    EmptyCollection { entity: &'static str },

    /// Descriptor never declared an identity field
    #[error("Entity '{entity}' declares no identity field")]
    MissingIdentity { entity: &'static str },

    /// Descriptor declared the identity field twice
    #[error("Entity '{entity}' declares more than one identity field")]
    DuplicateIdentity { entity: &'static str },

    /// Two fields share a name
    #[error("Entity '{entity}' declares field '{field}' twice")]
    DuplicateField {
        entity: &'static str,
        field: &'static str,
    },

    /// Two fields share a storage key
    #[error("Entity '{entity}' maps two fields to storage key '{key}'")]
    DuplicateStorageKey {
        entity: &'static str,
        key: &'static str,
    },

    /// Min bound above max bound
    #[error("Field '{field}' of '{entity}' has min {min} above max {max}")]
    InvertedBounds {
        entity: &'static str,
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// `required` and `omitempty` on the same field
    #[error("Field '{field}' of '{entity}' is both required and omitempty")]
    ConflictingRules {
        entity: &'static str,
        field: &'static str,
    },
}

/// The first rule an entity (or an ad-hoc value) violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    field: String,
    rule: &'static str,
    message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Name of the violated rule (e.g. "min")
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Human-readable reason, safe to show to clients
    pub fn message(&self) -> &str {
        &self.message
    }
}

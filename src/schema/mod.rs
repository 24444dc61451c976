//! Schema descriptors and the validation gate
//!
//! Every entity type publishes one `EntitySchema`: an ordered table of
//! fields, each with a storage key, a mutation tag and a rule list. The
//! table is built once per process and shared read-only afterwards.
//!
//! # Design Principles
//!
//! - Descriptors are plain data, no runtime introspection
//! - A malformed descriptor is a programmer error and aborts startup
//! - Validation is synchronous, side-effect free and first-error-wins
//! - Validation never touches storage

mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult, ValidationFailure, ValidationResult};
pub use types::{
    cached, describe, is_zero, Entity, EntitySchema, FieldSpec, MutationMode, MutationTag, Rule,
    SchemaBuilder,
};
pub use validator::Validator;

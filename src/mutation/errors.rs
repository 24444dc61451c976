//! # Mutation Errors

use thiserror::Error;

use crate::schema::ValidationFailure;
use crate::storage::StoreError;

/// Result type for executor operations
pub type MutationResult<T> = Result<T, MutationError>;

/// Why a mutation did not happen
#[derive(Debug, Clone, Error)]
pub enum MutationError {
    /// Input broke a schema rule; storage was not touched
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// Identifier required for update/remove/lookup was missing
    #[error("Identifier must not be empty")]
    EmptyIdentity,

    /// Identity-keyed update matched no record
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Underlying store call failed
    #[error("{0}")]
    Storage(#[from] StoreError),
}

impl MutationError {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            MutationError::Validation(_) => "validation",
            MutationError::EmptyIdentity => "empty_identity",
            MutationError::NotFound { .. } => "not_found",
            MutationError::Storage(_) => "storage",
        }
    }
}

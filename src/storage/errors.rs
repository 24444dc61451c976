//! # Storage Errors

use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure failures of a document store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not serve the call
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A document was not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

//! # Forum Errors
//!
//! Everything a module action can fail with. Each variant renders to the
//! single message carried by a `Failure` response.

use thiserror::Error;

use crate::auth::AuthError;
use crate::mutation::MutationError;
use crate::schema::ValidationFailure;
use crate::storage::StoreError;

/// Result type for module actions
pub type ForumResult<T> = Result<T, ForumError>;

/// Module-level errors
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("{0}")]
    Mutation(#[from] MutationError),

    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Storage(#[from] StoreError),

    /// A referenced record does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Domain uniqueness or integrity violation
    #[error("{0}")]
    Conflict(String),

    /// Request body did not have the expected shape
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unknown action {module}/{action}")]
    UnknownAction { module: String, action: String },

    /// Response data could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ForumError {
    /// Server-side failures; their details stay in the logs
    pub fn is_internal(&self) -> bool {
        match self {
            ForumError::Storage(_) | ForumError::Encoding(_) => true,
            ForumError::Mutation(MutationError::Storage(_)) => true,
            ForumError::Auth(err) => !err.is_client_error(),
            _ => false,
        }
    }

    /// Whether the request itself could not be understood
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ForumError::MalformedRequest(_) | ForumError::UnknownAction { .. }
        )
    }

    /// Message shown to the client
    pub fn client_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_details_are_hidden() {
        let err = ForumError::from(StoreError::Unavailable("10.0.0.7 refused".into()));
        assert!(err.is_internal());
        assert_eq!(err.client_message(), "Internal server error");

        let err = ForumError::from(MutationError::Storage(StoreError::Unavailable("x".into())));
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_errors_pass_through() {
        let err = ForumError::from(AuthError::NotLoggedIn);
        assert_eq!(err.client_message(), "please log in first");

        let err = ForumError::NotFound("Topic");
        assert_eq!(err.client_message(), "Topic not found");
    }

    #[test]
    fn test_malformed() {
        let err = ForumError::UnknownAction {
            module: "node".into(),
            action: "explode".into(),
        };
        assert!(err.is_malformed());
        assert_eq!(err.to_string(), "Unknown action node/explode");
    }
}

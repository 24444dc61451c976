//! # Auth Errors

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No account with the given name
    #[error("user name does not exist")]
    UnknownUser,

    /// Name exists but the password does not match
    #[error("user name and password do not match")]
    PasswordMismatch,

    /// Session carries no logged-in user
    #[error("please log in first")]
    NotLoggedIn,

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Stored hash could not be parsed
    #[error("Internal error: stored credential is malformed")]
    MalformedHash,
}

impl AuthError {
    /// Whether the caller, not the server, is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::HashingFailed | AuthError::MalformedHash)
    }
}

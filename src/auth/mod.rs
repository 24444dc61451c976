//! # Auth
//!
//! Password hashing and per-connection session state.
//!
//! A `Session` lives exactly as long as its connection; logging in writes
//! the user's identity into it and login-gated actions read it back.

pub mod crypto;
pub mod errors;
pub mod session;

pub use crypto::{hash_password, verify_password};
pub use errors::{AuthError, AuthResult};
pub use session::{Principal, Session};

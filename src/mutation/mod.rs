//! Mutation pipeline
//!
//! validate → project → persist → publish.
//!
//! Each executor call touches exactly one collection and is its own unit of
//! work. Composite workflows are sequences of calls owned by a module; a
//! failure part-way does not undo earlier steps.

mod errors;
mod executor;
mod projection;

pub use errors::{MutationError, MutationResult};
pub use executor::MutationExecutor;
pub use projection::project;

//! Document storage collaborator
//!
//! The pipeline depends only on a handful of per-collection verbs:
//! insert, update-by-id, remove-by-id, find-by-id, find and count.
//! Documents are JSON objects; the store owns the `_id` key and assigns it
//! on insert.
//!
//! `MemoryStore` is the shipped implementation. Every call is its own unit
//! of work: there is no cross-call or cross-collection atomicity.

mod errors;
mod filter;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use filter::{Filter, FindOptions};
pub use memory::MemoryStore;

use serde_json::{Map, Value};

/// Storage key of the store-assigned identity
pub const ID_KEY: &str = "_id";

/// A projected document: storage key to value
pub type Document = Map<String, Value>;

/// Per-collection storage verbs
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return the identity assigned to it
    fn insert(&self, collection: &str, document: Document) -> StoreResult<String>;

    /// Set the given keys on the record with `id`, leaving other keys alone.
    ///
    /// Returns `false` when no record matched.
    fn update_by_id(&self, collection: &str, id: &str, patch: Document) -> StoreResult<bool>;

    /// Delete the record with `id`. Returns whether one was removed.
    fn remove_by_id(&self, collection: &str, id: &str) -> StoreResult<bool>;

    fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    fn find(&self, collection: &str, filter: &Filter, options: FindOptions)
        -> StoreResult<Vec<Value>>;

    fn count(&self, collection: &str, filter: &Filter) -> StoreResult<usize>;
}

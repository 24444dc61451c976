//! # Projection
//!
//! Create builds a full snapshot of every insertable field. Update builds a
//! sparse patch: only updatable fields with a non-zero value. The identity
//! field is tagged `None` and never appears in either.

use crate::schema::{is_zero, Entity, MutationMode};
use crate::storage::Document;

/// Build the document `mode` would persist for `entity`
pub fn project<E: Entity>(entity: &E, mode: MutationMode) -> Document {
    let mut document = Document::new();

    for spec in E::schema().fields() {
        if !spec.tag().includes(mode) {
            continue;
        }
        let value = spec.value_of(entity);
        if mode == MutationMode::Update && is_zero(&value) {
            continue;
        }
        document.insert(spec.storage_key().to_string(), value);
    }

    document
}

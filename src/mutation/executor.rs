//! # Mutation Executor
//!
//! One call, one collection. Events declared on the entity's descriptor are
//! published only after the store call succeeds, carrying the affected
//! record's id as `{"id": ...}`.

use std::sync::Arc;

use serde_json::json;

use super::errors::{MutationError, MutationResult};
use super::projection::project;
use crate::observability::{log_event_with_fields, LogEvent};
use crate::realtime::{Event, EventBus};
use crate::schema::{Entity, MutationMode, Validator};
use crate::storage::{Document, DocumentStore};

/// Shared write path for every module
#[derive(Clone)]
pub struct MutationExecutor {
    store: Arc<dyn DocumentStore>,
    validator: Arc<Validator>,
    bus: Arc<EventBus>,
}

impl MutationExecutor {
    pub fn new(store: Arc<dyn DocumentStore>, validator: Arc<Validator>, bus: Arc<EventBus>) -> Self {
        Self {
            store,
            validator,
            bus,
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Validate, project in create mode, insert. Returns the new identity.
    pub fn create<E: Entity>(&self, entity: &E) -> MutationResult<String> {
        self.create_with(entity, |_| {})
    }

    /// Like `create`, with a chance to rewrite the projected document after
    /// validation passed (e.g. to swap a password for its hash).
    pub fn create_with<E, F>(&self, entity: &E, finish: F) -> MutationResult<String>
    where
        E: Entity,
        F: FnOnce(&mut Document),
    {
        let schema = E::schema();

        if let Err(failure) = self.validator.validate(entity) {
            return Err(rejected(schema.collection(), failure.into()));
        }

        let mut document = project(entity, MutationMode::Create);
        finish(&mut document);
        let id = self
            .store
            .insert(schema.collection(), document)
            .map_err(|e| rejected(schema.collection(), e.into()))?;

        applied(schema.collection(), MutationMode::Create, &id);
        self.announce(schema.events(), &id);
        Ok(id)
    }

    /// Apply the sparse update-mode projection of `entity` to record `id`.
    ///
    /// Update payloads are partial, so whole-struct validation is left to
    /// the caller.
    pub fn update<E: Entity>(&self, id: &str, entity: &E) -> MutationResult<()> {
        let schema = E::schema();

        if id.trim().is_empty() {
            return Err(rejected(schema.collection(), MutationError::EmptyIdentity));
        }

        // An empty patch still goes to the store
        let patch = project(entity, MutationMode::Update);
        let matched = self
            .store
            .update_by_id(schema.collection(), id, patch)
            .map_err(|e| rejected(schema.collection(), e.into()))?;

        if !matched {
            return Err(rejected(
                schema.collection(),
                MutationError::NotFound {
                    entity: schema.entity(),
                },
            ));
        }

        applied(schema.collection(), MutationMode::Update, id);
        self.announce(schema.events(), id);
        Ok(())
    }

    /// Delete record `id`. Removing a missing record succeeds as a no-op.
    ///
    /// Returns whether a record was actually removed; events are only
    /// published in that case.
    pub fn remove<E: Entity>(&self, id: &str) -> MutationResult<bool> {
        let schema = E::schema();

        if id.trim().is_empty() {
            return Err(rejected(schema.collection(), MutationError::EmptyIdentity));
        }

        let removed = self
            .store
            .remove_by_id(schema.collection(), id)
            .map_err(|e| rejected(schema.collection(), e.into()))?;

        if removed {
            log_event_with_fields(
                LogEvent::MutationApplied,
                &[("collection", schema.collection()), ("mode", "remove"), ("id", id)],
            );
            self.announce(schema.events(), id);
        }
        Ok(removed)
    }

    fn announce(&self, events: &[Event], id: &str) {
        let events: Vec<Event> = events
            .iter()
            .map(|event| event.clone().with_data(json!({ "id": id })))
            .collect();
        self.bus.publish_all(&events);
    }
}

fn applied(collection: &str, mode: MutationMode, id: &str) {
    log_event_with_fields(
        LogEvent::MutationApplied,
        &[("collection", collection), ("mode", mode.as_str()), ("id", id)],
    );
}

fn rejected(collection: &str, err: MutationError) -> MutationError {
    log_event_with_fields(
        LogEvent::MutationRejected,
        &[
            ("collection", collection),
            ("kind", err.kind()),
            ("reason", &err.to_string()),
        ],
    );
    err
}

//! Entity descriptor types
//!
//! A descriptor replaces struct-tag metadata with an explicit table:
//!
//! ```ignore
//! EntitySchema::builder("Node", "node")
//!     .identity("Id", "_id", |n: &Node| json!(n.id))
//!     .field(FieldSpec::new("Name", "name", MutationTag::Both, |n| json!(n.name))
//!         .rules([Rule::Required, Rule::Max(30), Rule::AlphaNum]))
//!     .notify("node", "list")
//!     .build()
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use crate::observability::{log_event_with_fields, LogEvent};
use crate::realtime::Event;

/// Which mutation a write is performing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    /// Full snapshot of a new record
    Create,
    /// Sparse patch of an existing record
    Update,
}

impl MutationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationMode::Create => "create",
            MutationMode::Update => "update",
        }
    }
}

impl fmt::Display for MutationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which mutation modes may write a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationTag {
    /// Written on create only
    InsertOnly,
    /// Written on update only
    UpdateOnly,
    /// Written on create and update
    Both,
    /// Never written by the pipeline (identity, store-managed fields)
    None,
}

impl MutationTag {
    /// Whether a field with this tag is projected in `mode`
    pub fn includes(&self, mode: MutationMode) -> bool {
        matches!(
            (self, mode),
            (MutationTag::InsertOnly, MutationMode::Create)
                | (MutationTag::UpdateOnly, MutationMode::Update)
                | (MutationTag::Both, _)
        )
    }
}

/// A single validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-zero
    Required,
    /// Skip the remaining rules when the value is zero
    OmitEmpty,
    /// Minimum character count (strings) or value (numbers)
    Min(usize),
    /// Maximum character count (strings) or value (numbers)
    Max(usize),
    /// ASCII letters and digits only
    AlphaNum,
    /// A number, or a string holding one
    Numeric,
    /// Looks like an email address
    Email,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::OmitEmpty => "omitempty",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::AlphaNum => "alphanum",
            Rule::Numeric => "numeric",
            Rule::Email => "email",
        }
    }
}

/// Zero values are treated as "not provided"
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// One row of an entity descriptor
pub struct FieldSpec<E> {
    name: &'static str,
    storage_key: &'static str,
    tag: MutationTag,
    rules: Vec<Rule>,
    read: fn(&E) -> Value,
}

impl<E> FieldSpec<E> {
    pub fn new(
        name: &'static str,
        storage_key: &'static str,
        tag: MutationTag,
        read: fn(&E) -> Value,
    ) -> Self {
        Self {
            name,
            storage_key,
            tag,
            rules: Vec::new(),
            read,
        }
    }

    /// Attach rules, evaluated in the given order
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn storage_key(&self) -> &'static str {
        self.storage_key
    }

    pub fn tag(&self) -> MutationTag {
        self.tag
    }

    pub fn rule_list(&self) -> &[Rule] {
        &self.rules
    }

    /// Current value of this field on `entity`
    pub fn value_of(&self, entity: &E) -> Value {
        (self.read)(entity)
    }
}

impl<E> fmt::Debug for FieldSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("storage_key", &self.storage_key)
            .field("tag", &self.tag)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Complete descriptor for one entity type
#[derive(Debug)]
pub struct EntitySchema<E> {
    entity: &'static str,
    collection: &'static str,
    identity: usize,
    fields: Vec<FieldSpec<E>>,
    events: Vec<Event>,
}

impl<E> EntitySchema<E> {
    pub fn builder(entity: &'static str, collection: &'static str) -> SchemaBuilder<E> {
        SchemaBuilder {
            entity,
            collection,
            identity: Vec::new(),
            fields: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// All fields in declaration order, identity included
    pub fn fields(&self) -> &[FieldSpec<E>] {
        &self.fields
    }

    pub fn identity(&self) -> &FieldSpec<E> {
        &self.fields[self.identity]
    }

    /// Events published after a successful mutation of this entity
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec<E>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Collects fields and checks the result for structural mistakes
pub struct SchemaBuilder<E> {
    entity: &'static str,
    collection: &'static str,
    identity: Vec<usize>,
    fields: Vec<FieldSpec<E>>,
    events: Vec<Event>,
}

impl<E> SchemaBuilder<E> {
    /// Declare the identity field. It is assigned by the store and never projected.
    pub fn identity(
        mut self,
        name: &'static str,
        storage_key: &'static str,
        read: fn(&E) -> Value,
    ) -> Self {
        self.identity.push(self.fields.len());
        self.fields
            .push(FieldSpec::new(name, storage_key, MutationTag::None, read));
        self
    }

    pub fn field(mut self, spec: FieldSpec<E>) -> Self {
        self.fields.push(spec);
        self
    }

    /// Publish `module/action` after every successful mutation
    pub fn notify(mut self, module: &'static str, action: &'static str) -> Self {
        self.events.push(Event::new(module, action));
        self
    }

    pub fn build(self) -> SchemaResult<EntitySchema<E>> {
        let entity = self.entity;

        if self.collection.is_empty() {
            return Err(SchemaError::EmptyCollection { entity });
        }

        let identity = match self.identity.as_slice() {
            [] => return Err(SchemaError::MissingIdentity { entity }),
            [index] => *index,
            _ => return Err(SchemaError::DuplicateIdentity { entity }),
        };

        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for spec in &self.fields {
            if !names.insert(spec.name) {
                return Err(SchemaError::DuplicateField {
                    entity,
                    field: spec.name,
                });
            }
            if !keys.insert(spec.storage_key) {
                return Err(SchemaError::DuplicateStorageKey {
                    entity,
                    key: spec.storage_key,
                });
            }
            check_rules(entity, spec)?;
        }

        Ok(EntitySchema {
            entity,
            collection: self.collection,
            identity,
            fields: self.fields,
            events: self.events,
        })
    }
}

fn check_rules<E>(entity: &'static str, spec: &FieldSpec<E>) -> SchemaResult<()> {
    let rules = &spec.rules;

    if rules.contains(&Rule::Required) && rules.contains(&Rule::OmitEmpty) {
        return Err(SchemaError::ConflictingRules {
            entity,
            field: spec.name,
        });
    }

    let min = rules.iter().find_map(|r| match r {
        Rule::Min(n) => Some(*n),
        _ => None,
    });
    let max = rules.iter().find_map(|r| match r {
        Rule::Max(n) => Some(*n),
        _ => None,
    });
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(SchemaError::InvertedBounds {
                entity,
                field: spec.name,
                min,
                max,
            });
        }
    }

    Ok(())
}

/// Implemented by every record type that goes through the pipeline
pub trait Entity: Sized + 'static {
    /// The process-wide descriptor for this type
    fn schema() -> &'static EntitySchema<Self>;
}

/// Ordered field table for `E`
pub fn describe<E: Entity>() -> &'static [FieldSpec<E>] {
    E::schema().fields()
}

/// Build a descriptor on first use and keep it for the process lifetime.
///
/// A malformed descriptor is a programmer error: it is logged as FATAL and
/// the process aborts.
pub fn cached<E>(
    cell: &'static OnceLock<EntitySchema<E>>,
    build: fn() -> SchemaResult<EntitySchema<E>>,
) -> &'static EntitySchema<E> {
    cell.get_or_init(|| match build() {
        Ok(schema) => schema,
        Err(err) => {
            log_event_with_fields(LogEvent::SchemaInvalid, &[("reason", &err.to_string())]);
            panic!("invalid entity descriptor: {}", err);
        }
    })
}

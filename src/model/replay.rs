//! Replies to a topic

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::decode_all;
use crate::schema::{cached, Entity, EntitySchema, FieldSpec, MutationTag, Rule, SchemaResult};
use crate::storage::{DocumentStore, Filter, FindOptions, StoreResult};

pub(super) const COLLECTION: &str = "replay";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replay {
    #[serde(rename = "id", alias = "_id")]
    pub id: String,
    pub topic: String,
    pub author: String,
    pub content: String,
    pub time: i64,
}

pub(super) fn replay_schema() -> SchemaResult<EntitySchema<Replay>> {
    EntitySchema::builder("Replay", COLLECTION)
        .identity("Id", "_id", |r: &Replay| json!(r.id))
        .field(
            FieldSpec::new("Topic", "topic", MutationTag::InsertOnly, |r: &Replay| json!(r.topic))
                .rules([Rule::Required]),
        )
        .field(
            FieldSpec::new("Author", "author", MutationTag::InsertOnly, |r: &Replay| {
                json!(r.author)
            })
            .rules([Rule::Required]),
        )
        .field(
            FieldSpec::new("Content", "content", MutationTag::Both, |r: &Replay| json!(r.content))
                .rules([Rule::Required]),
        )
        .field(FieldSpec::new("Time", "time", MutationTag::InsertOnly, |r: &Replay| json!(r.time)))
        .notify("replay", "list")
        .build()
}

impl Entity for Replay {
    fn schema() -> &'static EntitySchema<Self> {
        static SCHEMA: OnceLock<EntitySchema<Replay>> = OnceLock::new();
        cached(&SCHEMA, replay_schema)
    }
}

impl Replay {
    /// Replies of `topic` in the order they were written
    pub fn paginate(
        store: &dyn DocumentStore,
        topic: &str,
        page: usize,
        size: usize,
    ) -> StoreResult<(Vec<Replay>, usize)> {
        let filter = Filter::all().eq("topic", topic);
        let items = store.find(COLLECTION, &filter, FindOptions::page(page, size))?;
        Ok((decode_all(items)?, store.count(COLLECTION, &filter)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::project;
    use crate::schema::{MutationMode, Validator};
    use crate::storage::MemoryStore;

    #[test]
    fn test_empty_content_rejected() {
        let replay = Replay {
            topic: "t1".into(),
            author: "u1".into(),
            ..Default::default()
        };
        let failure = Validator::new().validate(&replay).unwrap_err();
        assert_eq!(failure.message(), "Content is a required field");
    }

    #[test]
    fn test_paginate_keeps_write_order() {
        let store = MemoryStore::new();
        for n in 1..=3 {
            let replay = Replay {
                topic: "t1".into(),
                author: "u1".into(),
                content: format!("reply {}", n),
                time: n,
                ..Default::default()
            };
            store.insert(COLLECTION, project(&replay, MutationMode::Create)).unwrap();
        }

        let (page, total) = Replay::paginate(&store, "t1", 1, 2).unwrap();
        assert_eq!(total, 3);
        assert_eq!(page[0].content, "reply 1");
        assert_eq!(page[1].content, "reply 2");
        assert!(!page[0].id.is_empty());
    }
}

//! Discussion threads. Each carries a last-reply marker kept current by the
//! replay module.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{decode, decode_all};
use crate::schema::{cached, Entity, EntitySchema, FieldSpec, MutationTag, Rule, SchemaResult};
use crate::storage::{DocumentStore, Filter, FindOptions, StoreResult};

pub(super) const COLLECTION: &str = "topic";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    #[serde(rename = "id", alias = "_id")]
    pub id: String,
    pub node: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub time: i64,
    pub replay_count: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_replay_user: String,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub last_replay_time: i64,
}

fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

pub(super) fn topic_schema() -> SchemaResult<EntitySchema<Topic>> {
    EntitySchema::builder("Topic", COLLECTION)
        .identity("Id", "_id", |t: &Topic| json!(t.id))
        .field(
            FieldSpec::new("Node", "node", MutationTag::InsertOnly, |t: &Topic| json!(t.node))
                .rules([Rule::Required]),
        )
        .field(
            FieldSpec::new("Title", "title", MutationTag::Both, |t: &Topic| json!(t.title))
                .rules([Rule::Required, Rule::Max(60)]),
        )
        .field(
            FieldSpec::new("Content", "content", MutationTag::Both, |t: &Topic| json!(t.content))
                .rules([Rule::Required]),
        )
        .field(
            FieldSpec::new("Author", "author", MutationTag::InsertOnly, |t: &Topic| json!(t.author))
                .rules([Rule::Required]),
        )
        .field(FieldSpec::new("Time", "time", MutationTag::InsertOnly, |t: &Topic| json!(t.time)))
        .field(FieldSpec::new("ReplayCount", "replay_count", MutationTag::Both, |t: &Topic| {
            json!(t.replay_count)
        }))
        .field(FieldSpec::new(
            "LastReplayUser",
            "last_replay_user",
            MutationTag::UpdateOnly,
            |t: &Topic| json!(t.last_replay_user),
        ))
        .field(FieldSpec::new(
            "LastReplayTime",
            "last_replay_time",
            MutationTag::UpdateOnly,
            |t: &Topic| json!(t.last_replay_time),
        ))
        .notify("topic", "list")
        .build()
}

impl Entity for Topic {
    fn schema() -> &'static EntitySchema<Self> {
        static SCHEMA: OnceLock<EntitySchema<Topic>> = OnceLock::new();
        cached(&SCHEMA, topic_schema)
    }
}

impl Topic {
    pub fn find_by_id(store: &dyn DocumentStore, id: &str) -> StoreResult<Option<Topic>> {
        if id.is_empty() {
            return Ok(None);
        }
        store.find_by_id(COLLECTION, id)?.map(decode).transpose()
    }

    /// Newest topics of `node` first
    pub fn paginate(
        store: &dyn DocumentStore,
        node: &str,
        page: usize,
        size: usize,
    ) -> StoreResult<(Vec<Topic>, usize)> {
        let filter = Filter::all().eq("node", node);
        let items = store.find(COLLECTION, &filter, FindOptions::page(page, size).newest_first())?;
        Ok((decode_all(items)?, store.count(COLLECTION, &filter)?))
    }

    /// Patch recording a new reply by `user_name` at `time`
    pub fn replay_marker(&self, user_name: &str, time: i64) -> Topic {
        Topic {
            replay_count: self.replay_count + 1,
            last_replay_user: user_name.to_string(),
            last_replay_time: time,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::project;
    use crate::schema::MutationMode;

    #[test]
    fn test_marker_patch_touches_only_marker_fields() {
        let topic = Topic {
            id: "t1".into(),
            title: "Hello".into(),
            replay_count: 2,
            ..Default::default()
        };
        let patch = project(&topic.replay_marker("bob", 1_700_000_000), MutationMode::Update);

        let mut keys: Vec<_> = patch.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["last_replay_time", "last_replay_user", "replay_count"]);
        assert_eq!(patch["replay_count"], 3);
    }

    #[test]
    fn test_create_leaves_marker_out() {
        let topic = Topic {
            node: "n1".into(),
            title: "Hello".into(),
            content: "World".into(),
            author: "u1".into(),
            ..Default::default()
        };
        let doc = project(&topic, MutationMode::Create);
        assert!(!doc.contains_key("last_replay_user"));
        assert_eq!(doc["replay_count"], 0);
    }
}

//! Notifications addressed to one user (`master`)

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{decode, decode_all};
use crate::schema::{cached, Entity, EntitySchema, FieldSpec, MutationTag, Rule, SchemaResult};
use crate::storage::{DocumentStore, Filter, FindOptions, StoreResult};

pub(super) const COLLECTION: &str = "notice";

/// Someone replied to a topic the master started
pub const NOTICE_REPLY: i64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notice {
    #[serde(rename = "id", alias = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub time: i64,
    /// Recipient user id
    pub master: String,
    /// Name of the user who caused the notice
    pub user: String,
    pub topic_id: String,
    pub topic_title: String,
    pub read: bool,
}

pub(super) fn notice_schema() -> SchemaResult<EntitySchema<Notice>> {
    EntitySchema::builder("Notice", COLLECTION)
        .identity("Id", "_id", |n: &Notice| json!(n.id))
        .field(FieldSpec::new("Type", "type", MutationTag::InsertOnly, |n: &Notice| json!(n.kind)))
        .field(FieldSpec::new("Time", "time", MutationTag::InsertOnly, |n: &Notice| json!(n.time)))
        .field(
            FieldSpec::new("Master", "master", MutationTag::InsertOnly, |n: &Notice| {
                json!(n.master)
            })
            .rules([Rule::Required]),
        )
        .field(FieldSpec::new("User", "user", MutationTag::InsertOnly, |n: &Notice| json!(n.user)))
        .field(FieldSpec::new("TopicID", "topic_id", MutationTag::InsertOnly, |n: &Notice| {
            json!(n.topic_id)
        }))
        .field(FieldSpec::new(
            "TopicTitle",
            "topic_title",
            MutationTag::InsertOnly,
            |n: &Notice| json!(n.topic_title),
        ))
        .field(FieldSpec::new("Read", "read", MutationTag::Both, |n: &Notice| json!(n.read)))
        .notify("notice", "list")
        .build()
}

impl Entity for Notice {
    fn schema() -> &'static EntitySchema<Self> {
        static SCHEMA: OnceLock<EntitySchema<Notice>> = OnceLock::new();
        cached(&SCHEMA, notice_schema)
    }
}

impl Notice {
    pub fn find_by_id(store: &dyn DocumentStore, id: &str) -> StoreResult<Option<Notice>> {
        if id.is_empty() {
            return Ok(None);
        }
        store.find_by_id(COLLECTION, id)?.map(decode).transpose()
    }

    /// Notices for `master`, newest first
    pub fn paginate(
        store: &dyn DocumentStore,
        master: &str,
        page: usize,
        size: usize,
    ) -> StoreResult<(Vec<Notice>, usize)> {
        let filter = Filter::all().eq("master", master);
        let items = store.find(COLLECTION, &filter, FindOptions::page(page, size).newest_first())?;
        Ok((decode_all(items)?, store.count(COLLECTION, &filter)?))
    }

    pub fn unread_count(store: &dyn DocumentStore, master: &str) -> StoreResult<usize> {
        let filter = Filter::all().eq("master", master).eq("read", false);
        store.count(COLLECTION, &filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::project;
    use crate::schema::MutationMode;
    use crate::storage::MemoryStore;

    fn reply_notice(master: &str) -> Notice {
        Notice {
            kind: NOTICE_REPLY,
            time: 1_700_000_000,
            master: master.into(),
            user: "bob".into(),
            topic_id: "t1".into(),
            topic_title: "Hello".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let encoded = serde_json::to_value(reply_notice("u1")).unwrap();
        assert_eq!(encoded["type"], 1);
        assert!(encoded.get("kind").is_none());
    }

    #[test]
    fn test_create_stores_unread() {
        let doc = project(&reply_notice("u1"), MutationMode::Create);
        assert_eq!(doc["read"], false);
    }

    #[test]
    fn test_read_patch_is_single_field() {
        let patch = Notice {
            read: true,
            ..Default::default()
        };
        let doc = project(&patch, MutationMode::Update);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["read"], true);
    }

    #[test]
    fn test_unread_count_per_master() {
        let store = MemoryStore::new();
        for master in ["u1", "u1", "u2"] {
            store
                .insert(COLLECTION, project(&reply_notice(master), MutationMode::Create))
                .unwrap();
        }
        assert_eq!(Notice::unread_count(&store, "u1").unwrap(), 2);
        let (items, total) = Notice::paginate(&store, "u2", 1, 10).unwrap();
        assert_eq!((items.len(), total), (1, 1));
    }
}

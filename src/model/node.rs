//! Forum categories. Nodes may nest through `parent`.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{decode, decode_all};
use crate::schema::{cached, Entity, EntitySchema, FieldSpec, MutationTag, Rule, SchemaResult};
use crate::storage::{DocumentStore, Filter, FindOptions, StoreResult};

pub(super) const COLLECTION: &str = "node";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "id", alias = "_id")]
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub sort: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub desc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent: String,
}

fn is_zero_i64(n: &i64) -> bool {
    *n == 0
}

pub(super) fn node_schema() -> SchemaResult<EntitySchema<Node>> {
    EntitySchema::builder("Node", COLLECTION)
        .identity("Id", "_id", |n: &Node| json!(n.id))
        .field(
            FieldSpec::new("Name", "name", MutationTag::Both, |n: &Node| json!(n.name))
                .rules([Rule::Required, Rule::Max(30), Rule::AlphaNum]),
        )
        .field(
            FieldSpec::new("Title", "title", MutationTag::Both, |n: &Node| json!(n.title))
                .rules([Rule::Required, Rule::Max(30)]),
        )
        .field(
            FieldSpec::new("Sort", "sort", MutationTag::Both, |n: &Node| json!(n.sort))
                .rules([Rule::OmitEmpty, Rule::Numeric]),
        )
        .field(
            FieldSpec::new("Desc", "desc", MutationTag::Both, |n: &Node| json!(n.desc))
                .rules([Rule::OmitEmpty, Rule::Min(5), Rule::Max(300)]),
        )
        .field(FieldSpec::new("Parent", "parent", MutationTag::Both, |n: &Node| {
            json!(n.parent)
        }))
        .notify("node", "list")
        .build()
}

impl Entity for Node {
    fn schema() -> &'static EntitySchema<Self> {
        static SCHEMA: OnceLock<EntitySchema<Node>> = OnceLock::new();
        cached(&SCHEMA, node_schema)
    }
}

impl Node {
    pub fn find_all(store: &dyn DocumentStore) -> StoreResult<Vec<Node>> {
        decode_all(store.find(COLLECTION, &Filter::all(), FindOptions::default())?)
    }

    pub fn find_by_id(store: &dyn DocumentStore, id: &str) -> StoreResult<Option<Node>> {
        store.find_by_id(COLLECTION, id)?.map(decode).transpose()
    }

    pub fn find_by_name(store: &dyn DocumentStore, name: &str) -> StoreResult<Option<Node>> {
        let filter = Filter::all().eq("name", name);
        let mut found = store.find(COLLECTION, &filter, FindOptions::page(1, 1))?;
        found.pop().map(decode).transpose()
    }

    /// Look up by `id` when set, otherwise by `name`
    pub fn find_by_id_or_name(
        store: &dyn DocumentStore,
        id: &str,
        name: &str,
    ) -> StoreResult<Option<Node>> {
        if !id.is_empty() {
            Self::find_by_id(store, id)
        } else if !name.is_empty() {
            Self::find_by_name(store, name)
        } else {
            Ok(None)
        }
    }

    pub fn id_exists(store: &dyn DocumentStore, id: &str) -> StoreResult<bool> {
        Ok(!id.is_empty() && store.find_by_id(COLLECTION, id)?.is_some())
    }

    pub fn name_exists(store: &dyn DocumentStore, name: &str) -> StoreResult<bool> {
        Ok(store.count(COLLECTION, &Filter::all().eq("name", name))? > 0)
    }

    /// Whether any node names `id` as its parent
    pub fn has_child(store: &dyn DocumentStore, id: &str) -> StoreResult<bool> {
        Ok(store.count(COLLECTION, &Filter::all().eq("parent", id))? > 0)
    }

    /// Whether any topic lives under node `id`
    pub fn has_topic(store: &dyn DocumentStore, id: &str) -> StoreResult<bool> {
        Ok(store.count(super::topic::COLLECTION, &Filter::all().eq("node", id))? > 0)
    }
}

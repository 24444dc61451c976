//! # In-Memory Document Store
//!
//! Collections are kept in insertion order behind one `RwLock`.
//! Identities are UUID v4 strings.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use super::errors::StoreResult;
use super::filter::{Filter, FindOptions};
use super::{Document, DocumentStore, ID_KEY};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
}

impl Collection {
    fn position(&self, id: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.get(ID_KEY).and_then(Value::as_str) == Some(id))
    }
}

/// Document store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Collection>> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Collection>> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, collection: &str, mut document: Document) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        document.insert(ID_KEY.to_string(), Value::String(id.clone()));

        self.write()
            .entry(collection.to_string())
            .or_default()
            .documents
            .push(document);

        Ok(id)
    }

    fn update_by_id(&self, collection: &str, id: &str, patch: Document) -> StoreResult<bool> {
        let mut collections = self.write();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(index) = coll.position(id) else {
            return Ok(false);
        };

        let document = &mut coll.documents[index];
        for (key, value) in patch {
            if key != ID_KEY {
                document.insert(key, value);
            }
        }
        Ok(true)
    }

    fn remove_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.write();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match coll.position(id) {
            Some(index) => {
                coll.documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.read();
        Ok(collections.get(collection).and_then(|coll| {
            coll.position(id)
                .map(|index| Value::Object(coll.documents[index].clone()))
        }))
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Value>> {
        let collections = self.read();
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let matching = coll
            .documents
            .iter()
            .filter(|doc| filter.matches_document(doc))
            .map(|doc| Value::Object(doc.clone()));

        let ordered: Vec<Value> = if options.newest_first {
            matching.collect::<Vec<_>>().into_iter().rev().collect()
        } else {
            matching.collect()
        };

        Ok(ordered
            .into_iter()
            .skip(options.skip)
            .take(options.limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn count(&self, collection: &str, filter: &Filter) -> StoreResult<usize> {
        let collections = self.read();
        Ok(collections.get(collection).map_or(0, |coll| {
            coll.documents
                .iter()
                .filter(|doc| filter.matches_document(doc))
                .count()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_assigns_identity() {
        let store = MemoryStore::new();
        let id = store.insert("node", doc(json!({"name": "tech"}))).unwrap();

        let stored = store.find_by_id("node", &id).unwrap().unwrap();
        assert_eq!(stored["_id"], json!(id));
        assert_eq!(stored["name"], "tech");
    }

    #[test]
    fn test_update_sets_only_given_keys() {
        let store = MemoryStore::new();
        let id = store
            .insert("node", doc(json!({"name": "tech", "title": "Technology"})))
            .unwrap();

        let matched = store
            .update_by_id("node", &id, doc(json!({"title": "Tech"})))
            .unwrap();
        assert!(matched);

        let stored = store.find_by_id("node", &id).unwrap().unwrap();
        assert_eq!(stored["name"], "tech");
        assert_eq!(stored["title"], "Tech");
    }

    #[test]
    fn test_update_cannot_rewrite_identity() {
        let store = MemoryStore::new();
        let id = store.insert("node", doc(json!({"name": "tech"}))).unwrap();
        store
            .update_by_id("node", &id, doc(json!({"_id": "forged"})))
            .unwrap();
        assert!(store.find_by_id("node", &id).unwrap().is_some());
    }

    #[test]
    fn test_update_unknown_id_reports_no_match() {
        let store = MemoryStore::new();
        assert!(!store.update_by_id("node", "missing", Document::new()).unwrap());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = MemoryStore::new();
        let id = store.insert("node", doc(json!({"name": "tech"}))).unwrap();
        assert!(store.remove_by_id("node", &id).unwrap());
        assert!(!store.remove_by_id("node", &id).unwrap());
    }

    #[test]
    fn test_find_with_paging_and_order() {
        let store = MemoryStore::new();
        for n in 1..=5 {
            store
                .insert("replay", doc(json!({"topic": "t1", "n": n})))
                .unwrap();
        }
        store
            .insert("replay", doc(json!({"topic": "t2", "n": 99})))
            .unwrap();

        let filter = Filter::all().eq("topic", "t1");
        let page = store.find("replay", &filter, FindOptions::page(2, 2)).unwrap();
        let ns: Vec<_> = page.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![3, 4]);

        let newest = store
            .find("replay", &filter, FindOptions::page(1, 2).newest_first())
            .unwrap();
        assert_eq!(newest[0]["n"], 5);

        assert_eq!(store.count("replay", &filter).unwrap(), 5);
        assert_eq!(store.count("replay", &Filter::all()).unwrap(), 6);
    }

    #[test]
    fn test_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.find("nothing", &Filter::all(), FindOptions::default()).unwrap().is_empty());
        assert_eq!(store.count("nothing", &Filter::all()).unwrap(), 0);
        assert!(store.find_by_id("nothing", "x").unwrap().is_none());
    }
}

//! # Query Filters
//!
//! Equality-only filters. Every condition must hold for a document to match.

use serde_json::Value;

use super::Document;

/// Conjunction of `key == value` conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check if a document matches this filter
    pub fn matches(&self, document: &Value) -> bool {
        document
            .as_object()
            .is_some_and(|doc| self.matches_document(doc))
    }

    pub fn matches_document(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(key, expected)| {
            match document.get(key) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            }
        })
    }
}

/// Paging and ordering for `find`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Documents to skip after ordering
    pub skip: usize,
    /// Maximum documents to return (`None` = unbounded)
    pub limit: Option<usize>,
    /// Reverse insertion order
    pub newest_first: bool,
}

impl FindOptions {
    /// Page `page` (1-based) of size `size`
    pub fn page(page: usize, size: usize) -> Self {
        Self {
            skip: page.saturating_sub(1).saturating_mul(size),
            limit: Some(size),
            newest_first: false,
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }
}

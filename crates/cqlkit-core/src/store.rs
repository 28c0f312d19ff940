//! Read-only collaborators consulted by the query engine
//!
//! The engine never writes to these; the search surface owns the data and
//! hands out shared references for the duration of a query.

use crate::content::{Record, record_id};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Record accessor
pub trait RecordStore {
    /// Fetch a record by identifier
    fn get(&self, id: &str) -> Option<&Record>;

    /// Iterate every record in store order
    fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_>;
}

/// Label accessor
pub trait LabelStore {
    /// All labels attached to the record with the given identifier
    fn labels_for(&self, id: &str) -> Vec<String>;
}

/// Label store that knows no labels
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelStore for NoLabels {
    fn labels_for(&self, _id: &str) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory content store
///
/// Deserializes from `{"contents": {id: record}, "content_labels": {id: [..]}}`.
/// Records are kept in identifier order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryContentStore {
    #[serde(default)]
    contents: BTreeMap<String, Record>,

    #[serde(default)]
    content_labels: BTreeMap<String, Vec<String>>,
}

impl InMemoryContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a store from a JSON file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Insert a record, keyed by its `id` field (or the next free index)
    pub fn insert(&mut self, record: Record) -> String {
        let id = record_id(&record).unwrap_or_else(|| self.next_free_key());
        self.contents.insert(id.clone(), record);
        id
    }

    fn next_free_key(&self) -> String {
        (self.contents.len()..)
            .map(|index| index.to_string())
            .find(|key| !self.contents.contains_key(key))
            .unwrap_or_default()
    }

    /// Builder: insert a record
    pub fn with_record(mut self, record: Record) -> Self {
        self.insert(record);
        self
    }

    /// Replace the labels of a record
    pub fn set_labels<I, S>(&mut self, id: &str, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_labels
            .insert(id.to_string(), labels.into_iter().map(Into::into).collect());
    }

    /// Builder: attach labels to a record
    pub fn with_labels<I, S>(mut self, id: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_labels(id, labels);
        self
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns true if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl RecordStore for InMemoryContentStore {
    fn get(&self, id: &str) -> Option<&Record> {
        self.contents.get(id)
    }

    fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_> {
        Box::new(self.contents.values())
    }
}

impl LabelStore for InMemoryContentStore {
    fn labels_for(&self, id: &str) -> Vec<String> {
        self.content_labels.get(id).cloned().unwrap_or_default()
    }
}

impl<T: LabelStore + ?Sized> LabelStore for &T {
    fn labels_for(&self, id: &str) -> Vec<String> {
        (**self).labels_for(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let mut store = InMemoryContentStore::new();
        let id = store.insert(json!({"id": "7", "type": "page"}));
        assert_eq!(id, "7");
        assert_eq!(store.get("7").and_then(|r| r["type"].as_str()), Some("page"));
        assert!(store.get("8").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_without_id_keeps_existing_records() {
        let mut store = InMemoryContentStore::new();
        store.insert(json!({"id": "1", "title": "kept"}));
        let first = store.insert(json!({"title": "a"}));
        let second = store.insert(json!({"title": "b"}));

        assert_eq!(store.len(), 3);
        assert_ne!(first, "1");
        assert_ne!(second, "1");
        assert_ne!(first, second);
        assert_eq!(store.get("1").and_then(|r| r["title"].as_str()), Some("kept"));
    }

    #[test]
    fn test_labels() {
        let store = InMemoryContentStore::new()
            .with_record(json!({"id": "1"}))
            .with_labels("1", ["finished", "Release"]);
        assert_eq!(store.labels_for("1"), vec!["finished", "Release"]);
        assert!(store.labels_for("2").is_empty());
        assert!(NoLabels.labels_for("1").is_empty());
    }

    #[test]
    fn test_from_json() {
        let store = InMemoryContentStore::from_json(
            r#"{
                "contents": {
                    "2": {"id": "2", "type": "blogpost"},
                    "1": {"id": "1", "type": "page"}
                },
                "content_labels": {"1": ["draft"]}
            }"#,
        )
        .unwrap();
        let ids: Vec<_> = store.records().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.labels_for("1"), vec!["draft"]);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = InMemoryContentStore::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Deserialization(_)));
    }
}

//! Field resolution
//!
//! Maps a CQL field name to the value it denotes on a content record.

use cqlkit_core::content::{self, Record, body_storage_text, created_date, record_id, value_to_text};
use cqlkit_core::LabelStore;

/// Fields a query may reference
pub const SUPPORTED_FIELDS: [&str; 10] = [
    "type",
    "space",
    "spaceKey",
    "title",
    "status",
    "id",
    "text",
    "created",
    "postingDay",
    "label",
];

/// How a field's value is obtained from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Top-level key, exact then case-insensitive
    Direct(&'a str),
    /// Another top-level key
    Alias(&'a str),
    /// `history.createdDate`
    CreatedDate,
    /// Title, body storage text and labels joined by spaces
    TextAggregate,
    /// Every label attached to the record
    Labels,
}

impl<'a> Resolution<'a> {
    /// Resolution rule for a field name (case-insensitive)
    pub fn for_field(field: &'a str) -> Self {
        match field.to_ascii_lowercase().as_str() {
            "space" => Resolution::Alias("spaceKey"),
            "text" => Resolution::TextAggregate,
            "created" => Resolution::CreatedDate,
            "label" => Resolution::Labels,
            _ => Resolution::Direct(field),
        }
    }
}

/// A resolved field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Key missing or `null`
    Absent,
    Scalar(String),
    /// Only produced for `label`
    List(Vec<String>),
}

impl FieldValue {
    /// Returns true if the field was absent
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

fn scalar(value: Option<&serde_json::Value>) -> FieldValue {
    value
        .and_then(value_to_text)
        .map_or(FieldValue::Absent, FieldValue::Scalar)
}

fn labels_of(record: &Record, labels: &dyn LabelStore) -> Vec<String> {
    record_id(record)
        .map(|id| labels.labels_for(&id))
        .unwrap_or_default()
}

/// Resolve `field` against `record`
pub fn resolve(field: &str, record: &Record, labels: &dyn LabelStore) -> FieldValue {
    match Resolution::for_field(field) {
        Resolution::Direct(key) | Resolution::Alias(key) => scalar(content::lookup(record, key)),
        Resolution::CreatedDate => scalar(created_date(record)),
        Resolution::TextAggregate => {
            let title = content::lookup(record, "title").and_then(value_to_text);
            let body = body_storage_text(record).map(str::to_string);
            let parts: Vec<String> = title
                .into_iter()
                .chain(body)
                .chain(labels_of(record, labels))
                .filter(|part| !part.is_empty())
                .collect();
            FieldValue::Scalar(parts.join(" "))
        }
        Resolution::Labels => FieldValue::List(labels_of(record, labels)),
    }
}

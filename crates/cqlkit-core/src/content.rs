//! Read access to content records
//!
//! Records are schemaless JSON objects owned by the caller. The engine only
//! reads them; a JSON `null` is treated the same as a missing key.

use serde_json::Value;

/// A content record (page, blogpost, comment, ...)
pub type Record = Value;

/// Look up a top-level key: exact match first, then case-insensitive.
pub fn lookup<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    let object = record.as_object()?;
    let value = object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })?;
    (!value.is_null()).then_some(value)
}

/// Follow a chain of object keys (exact match at every level).
pub fn lookup_path<'a>(record: &'a Record, path: &[&str]) -> Option<&'a Value> {
    let value = path
        .iter()
        .try_fold(record, |current, key| current.as_object()?.get(*key))?;
    (!value.is_null()).then_some(value)
}

/// The record identifier in string form, if any.
pub fn record_id(record: &Record) -> Option<String> {
    lookup_path(record, &["id"]).and_then(value_to_text)
}

/// The creation timestamp stored under `history.createdDate`.
pub fn created_date(record: &Record) -> Option<&Value> {
    lookup_path(record, &["history", "createdDate"])
}

/// The storage representation of the body, `body.storage.value`.
pub fn body_storage_text(record: &Record) -> Option<&str> {
    lookup_path(record, &["body", "storage", "value"]).and_then(Value::as_str)
}

/// Render a JSON value as the text used for comparisons.
///
/// Returns `None` for `null`, which counts as an absent value.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

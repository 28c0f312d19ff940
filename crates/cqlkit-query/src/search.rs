//! Search over a record store

use crate::compile::compile_with_clock;
use cqlkit_core::{Clock, Error, LabelStore, Record, RecordStore, Result, SystemClock};
use tracing::info;

/// Run a CQL query over every record in `store`.
///
/// A blank query is rejected rather than treated as "match nothing".
pub fn search<'s, S>(query: &str, store: &'s S) -> Result<Vec<&'s Record>>
where
    S: RecordStore + LabelStore,
{
    search_with_clock(query, store, &SystemClock)
}

/// Same as [`search`], evaluating `now()` against `clock`
pub fn search_with_clock<'s, S>(query: &str, store: &'s S, clock: &dyn Clock) -> Result<Vec<&'s Record>>
where
    S: RecordStore + LabelStore,
{
    if query.trim().is_empty() {
        return Err(Error::MissingQuery);
    }

    let compiled = compile_with_clock(query, clock)?;
    let matched = compiled.filter(store.records(), store)?;
    info!(query, results = matched.len(), "CQL search completed");
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqlkit_core::InMemoryContentStore;
    use serde_json::json;

    fn store() -> InMemoryContentStore {
        InMemoryContentStore::new()
            .with_record(json!({"id": "1", "type": "page", "title": "Project launch", "spaceKey": "DEV", "status": "current"}))
            .with_record(json!({"id": "2", "type": "blogpost", "title": "Launch recap", "spaceKey": "MKT", "status": "current"}))
            .with_record(json!({"id": "3", "type": "page", "title": "Old notes", "spaceKey": "DEV", "status": "draft"}))
            .with_labels("1", ["finished"])
            .with_labels("3", ["draft", "archive"])
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r["id"].as_str().unwrap_or_default().to_string()).collect()
    }

    #[test]
    fn test_search() {
        let store = store();
        let found = search("type='page' AND (title~'launch' OR label!='draft')", &store).unwrap();
        assert_eq!(ids(&found), vec!["1"]);

        let found = search("space='DEV'", &store).unwrap();
        assert_eq!(ids(&found), vec!["1", "3"]);

        let found = search("text~'archive'", &store).unwrap();
        assert_eq!(ids(&found), vec!["3"]);
    }

    #[test]
    fn test_blank_query_rejected() {
        let store = store();
        assert!(matches!(search("  ", &store), Err(Error::MissingQuery)));
    }

    #[test]
    fn test_compile_error_propagates_before_scan() {
        let empty = InMemoryContentStore::new();
        assert!(matches!(search("type='page' OR", &empty), Err(Error::StructuralEvaluation(_))));
        assert!(matches!(search("()", &store()), Err(Error::StructuralEvaluation(_))));
    }
}

//! cqlkit command-line search
//!
//! Loads a JSON content fixture and runs CQL queries against it.

pub mod config;

pub use config::CliConfig;

use cqlkit_core::{Clock, FixedClock, InMemoryContentStore, Record, Result, SystemClock};
use tracing::info;

/// Load the fixture named by `config` and run `query` against it
pub fn run_query(config: &CliConfig, query: &str) -> Result<Vec<Record>> {
    let store = InMemoryContentStore::from_file(&config.data_file)?;
    info!(path = %config.data_file.display(), records = store.len(), "Loaded content fixture");

    let clock: Box<dyn Clock> = match config.reference_time {
        Some(instant) => Box::new(FixedClock::new(instant)),
        None => Box::new(SystemClock),
    };
    let matched = cqlkit_query::search_with_clock(query, &store, clock.as_ref())?;
    Ok(matched.into_iter().cloned().collect())
}

/// Render results as a JSON array
pub fn render(results: &[Record], pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(results)?
    } else {
        serde_json::to_string(results)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "contents": {{
                    "1": {{"id": "1", "type": "page", "title": "Launch", "history": {{"createdDate": "2024-06-10T00:00:00.000Z"}}}},
                    "2": {{"id": "2", "type": "page", "title": "Archive", "history": {{"createdDate": "2024-01-10T00:00:00.000Z"}}}}
                }},
                "content_labels": {{"2": ["old"]}}
            }}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_run_query_with_pinned_clock() {
        let file = fixture();
        let config = CliConfig::new(file.path())
            .reference_time("2024-06-15T00:00:00.000Z".parse().unwrap());
        let results = run_query(&config, "created > now('-4w')").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "1");

        let results = run_query(&config, "label = 'OLD'").unwrap();
        assert_eq!(results[0]["id"], "2");
    }

    #[test]
    fn test_run_query_missing_file() {
        let config = CliConfig::new("/nonexistent/content.json");
        assert!(matches!(
            run_query(&config, "type='page'"),
            Err(cqlkit_core::Error::Io(_))
        ));
    }

    #[test]
    fn test_render() {
        let results = vec![serde_json::json!({"id": "1"})];
        assert_eq!(render(&results, false).unwrap(), r#"[{"id":"1"}]"#);
        assert!(render(&results, true).unwrap().contains('\n'));
    }
}

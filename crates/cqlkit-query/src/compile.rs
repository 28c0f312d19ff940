//! Query compilation
//!
//! Runs the full front end once per query: function preprocessing, lexing,
//! field validation, postfix conversion and a structural check. The result
//! can then be applied to any number of records.

use crate::executor::evaluate;
use crate::functions::preprocess;
use crate::lexer::tokenize;
use crate::parser::{Instruction, check_structure, to_postfix};
use crate::validator::validate;
use cqlkit_core::{Clock, LabelStore, Record, Result, SystemClock};
use std::fmt;
use tracing::{debug, warn};

/// A compiled CQL predicate
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    program: Vec<Instruction>,
}

impl CompiledQuery {
    /// The postfix program
    pub fn postfix(&self) -> &[Instruction] {
        &self.program
    }

    /// Returns true if the query had no tokens and so matches nothing
    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Test one record
    pub fn matches(&self, record: &Record, labels: &dyn LabelStore) -> Result<bool> {
        evaluate(&self.program, record, labels)
    }

    /// Keep the candidates this query matches, in input order
    pub fn filter<'r, I>(&self, candidates: I, labels: &dyn LabelStore) -> Result<Vec<&'r Record>>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut matched = Vec::new();
        let mut scanned = 0usize;
        for record in candidates {
            scanned += 1;
            if self.matches(record, labels)? {
                matched.push(record);
            }
        }
        debug!(scanned, matched = matched.len(), "Filtered content records");
        Ok(matched)
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.program.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

/// Compile a query, evaluating `now()` against the system clock
pub fn compile(query: &str) -> Result<CompiledQuery> {
    compile_with_clock(query, &SystemClock)
}

/// Compile a query, evaluating `now()` against `clock`
pub fn compile_with_clock(query: &str, clock: &dyn Clock) -> Result<CompiledQuery> {
    let compiled = preprocess(query, clock)
        .and_then(|query| tokenize(&query))
        .and_then(|tokens| {
            if tokens.is_empty() {
                return Ok(CompiledQuery { program: Vec::new() });
            }
            validate(&tokens)?;
            let program = to_postfix(tokens)?;
            check_structure(&program)?;
            Ok(CompiledQuery { program })
        });

    match &compiled {
        Ok(query) => debug!(postfix = %query, "Compiled CQL query"),
        Err(err) => warn!(error = %err, "Rejected CQL query"),
    }
    compiled
}

/// Compile `query` and keep the matching candidates
pub fn compile_and_filter<'r, I>(
    query: &str,
    candidates: I,
    labels: &dyn LabelStore,
) -> Result<Vec<&'r Record>>
where
    I: IntoIterator<Item = &'r Record>,
{
    compile(query)?.filter(candidates, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use cqlkit_core::temporal::format_timestamp;
    use cqlkit_core::{Error, FixedClock, InMemoryContentStore, NoLabels, SyntaxError};
    use serde_json::json;

    fn matches(query: &str, record: &Record) -> bool {
        compile(query).unwrap().matches(record, &NoLabels).unwrap()
    }

    #[test]
    fn test_round_trip() {
        assert!(matches("type='page'", &json!({"type": "page"})));
        assert!(!matches("type='page'", &json!({"type": "blogpost"})));
    }

    #[test]
    fn test_precedence() {
        let record = json!({"status": "current", "type": "blogpost"});
        // (NOT status='current') AND type='page' -> false
        assert!(!matches("NOT status='current' AND type='page'", &record));
        // NOT (status='current' AND type='page') -> true
        assert!(matches("NOT (status='current' AND type='page')", &record));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let compiled = compile("   ").unwrap();
        assert!(compiled.is_empty());
        assert!(!compiled.matches(&json!({"type": "page"}), &NoLabels).unwrap());
    }

    #[test]
    fn test_parentheses_alone_are_malformed() {
        for query in ["()", "(())", " ( ) "] {
            assert!(
                matches!(compile(query), Err(Error::StructuralEvaluation(_))),
                "{query}"
            );
        }
        assert!(compile("  ").unwrap().is_empty());
    }

    #[test]
    fn test_display_postfix() {
        let compiled = compile("type='page' AND (title~'x' OR id=3)").unwrap();
        assert_eq!(compiled.to_string(), "type='page' title~'x' id=3 OR AND");
    }

    #[test]
    fn test_errors_surface_at_compile_time() {
        assert!(matches!(
            compile("type=='page'"),
            Err(Error::Syntax(SyntaxError::DoubleEquals))
        ));
        assert!(matches!(
            compile("foo='bar'"),
            Err(Error::UnsupportedField { ref field, .. }) if field == "foo"
        ));
        assert!(matches!(
            compile("(type='page'"),
            Err(Error::Syntax(SyntaxError::MismatchedParentheses))
        ));
        assert!(matches!(
            compile("type='page')"),
            Err(Error::Syntax(SyntaxError::MismatchedParentheses))
        ));
        assert!(matches!(compile("type='page' AND"), Err(Error::StructuralEvaluation(_))));
        assert!(matches!(compile("created>now('soon')"), Err(Error::FunctionEvaluation(_))));
    }

    #[test]
    fn test_field_error_precedes_parse_error() {
        assert!(matches!(compile("(foo='bar'"), Err(Error::UnsupportedField { .. })));
    }

    #[test]
    fn test_created_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let clock = FixedClock::new(now);
        let compiled = compile_with_clock("created > now('-4w')", &clock).unwrap();

        let fresh = json!({"history": {"createdDate": format_timestamp(now)}});
        let stale = json!({"history": {"createdDate": format_timestamp(now - Duration::days(60))}});
        assert!(compiled.matches(&fresh, &NoLabels).unwrap());
        assert!(!compiled.matches(&stale, &NoLabels).unwrap());
    }

    #[test]
    fn test_now_is_stable_for_a_fixed_instant() {
        let clock = FixedClock::from_millis(1_718_452_800_000).unwrap();
        let first = compile_with_clock("created > now('-4w')", &clock).unwrap();
        let second = compile_with_clock("created > now('-4w')", &clock).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compile_and_filter_with_labels() {
        let store = InMemoryContentStore::new()
            .with_record(json!({"id": "1", "type": "page"}))
            .with_record(json!({"id": "2", "type": "page"}))
            .with_record(json!({"id": "3", "type": "blogpost"}))
            .with_labels("1", ["Finished"])
            .with_labels("3", ["finished"]);
        let records: Vec<Record> = ["1", "2", "3"]
            .iter()
            .filter_map(|id| cqlkit_core::RecordStore::get(&store, id).cloned())
            .collect();

        let matched = compile_and_filter("label = 'finished' AND type = 'page'", &records, &store)
            .unwrap();
        let ids: Vec<_> = matched.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1"]);
    }
}

//! Atomic comparisons against resolved field values

use crate::fields::{FieldValue, resolve};
use crate::lexer::{Comparison, ComparisonOp, Literal};
use chrono::NaiveDate;
use cqlkit_core::temporal::parse_timestamp;
use cqlkit_core::{LabelStore, Record};
use std::cmp::Ordering;

/// Evaluate one comparison against a record
pub fn evaluate_comparison(
    comparison: &Comparison,
    record: &Record,
    labels: &dyn LabelStore,
) -> bool {
    let actual = resolve(&comparison.field, record, labels);
    compare(&actual, comparison.op, &comparison.value)
}

/// Apply `op` between a resolved value and a literal
pub fn compare(actual: &FieldValue, op: ComparisonOp, value: &Literal) -> bool {
    if value.is_null() {
        return match op {
            ComparisonOp::Equals => actual.is_absent(),
            ComparisonOp::NotEquals => !actual.is_absent(),
            _ => false,
        };
    }

    let expected = value.as_text();
    match actual {
        FieldValue::Absent => matches!(op, ComparisonOp::NotEquals | ComparisonOp::NotContains),
        FieldValue::List(items) => match op {
            ComparisonOp::Equals => items.iter().any(|item| eq_ignore_case(item, expected)),
            ComparisonOp::NotEquals => !items.iter().any(|item| eq_ignore_case(item, expected)),
            ComparisonOp::Contains => items.iter().any(|item| contains_ignore_case(item, expected)),
            ComparisonOp::NotContains => {
                !items.iter().any(|item| contains_ignore_case(item, expected))
            }
            _ => false,
        },
        FieldValue::Scalar(text) if op.is_ordering() => {
            order(text, value).is_some_and(|ordering| match op {
                ComparisonOp::GreaterThan => ordering.is_gt(),
                ComparisonOp::LessThan => ordering.is_lt(),
                ComparisonOp::GreaterEquals => ordering.is_ge(),
                _ => ordering.is_le(),
            })
        }
        FieldValue::Scalar(text) => match op {
            ComparisonOp::Equals => eq_ignore_case(text, expected),
            ComparisonOp::NotEquals => !eq_ignore_case(text, expected),
            ComparisonOp::Contains => contains_ignore_case(text, expected),
            ComparisonOp::NotContains => !contains_ignore_case(text, expected),
            _ => false,
        },
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Returns true for ISO dates/timestamps, or for text made only of digits
/// and the punctuation `-:.TZ`.
pub fn looks_date_like(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    parse_timestamp(text).is_some()
        || text
            .get(..10)
            .is_some_and(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok())
        || text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | ':' | '.' | 'T' | 'Z'))
}

/// Ordering for `>`, `<`, `>=`, `<=`.
///
/// Numeric when both sides are numbers, lexicographic when both look like
/// dates, otherwise incomparable.
fn order(actual: &str, expected: &Literal) -> Option<Ordering> {
    let expected_number = match expected {
        Literal::Number { value, .. } => Some(*value),
        other => parse_number(other.as_text()),
    };
    if let (Some(a), Some(b)) = (parse_number(actual), expected_number) {
        return a.partial_cmp(&b);
    }
    let expected = expected.as_text();
    (looks_date_like(actual) && looks_date_like(expected)).then(|| actual.cmp(expected))
}

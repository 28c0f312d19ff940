//! Field validation over the flat token stream
//!
//! Runs before parsing, so an unsupported field is reported even when it sits
//! in a branch the boolean expression would never reach.

use crate::fields::SUPPORTED_FIELDS;
use crate::lexer::Token;
use cqlkit_core::{Error, Result};

/// Returns true if `field` is queryable (case-insensitive)
pub fn is_supported_field(field: &str) -> bool {
    SUPPORTED_FIELDS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(field))
}

/// Reject the first comparison whose field is not queryable
pub fn validate(tokens: &[Token]) -> Result<()> {
    for token in tokens {
        if let Token::Comparison(comparison) = token {
            if !is_supported_field(&comparison.field) {
                let mut supported: Vec<String> =
                    SUPPORTED_FIELDS.iter().map(|f| f.to_string()).collect();
                supported.sort();
                return Err(Error::UnsupportedField {
                    field: comparison.field.clone(),
                    supported,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_supported_fields_any_case() {
        let tokens = tokenize("TYPE='page' AND spacekey='DEV' AND PostingDay>'2024'").unwrap();
        assert!(validate(&tokens).is_ok());
    }

    #[test]
    fn test_unsupported_field() {
        let tokens = tokenize("foo='bar'").unwrap();
        match validate(&tokens).unwrap_err() {
            Error::UnsupportedField { field, supported } => {
                assert_eq!(field, "foo");
                assert_eq!(supported.len(), SUPPORTED_FIELDS.len());
                assert!(supported.contains(&"postingDay".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_branch_still_checked() {
        let tokens = tokenize("type='page' OR (type='x' AND version>'4')").unwrap();
        let err = validate(&tokens).unwrap_err();
        assert!(err.to_string().contains("'version'"));
    }
}

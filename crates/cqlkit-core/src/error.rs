//! Error types for cqlkit
//!
//! Every failure of the query pipeline is reported through [`Error`]; query
//! text never changes between attempts, so none of these are retried.

use thiserror::Error;

/// The main error type for cqlkit operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Query Errors ==========
    #[error("CQL query is missing.")]
    MissingQuery,

    #[error("CQL function error: {0}")]
    FunctionEvaluation(String),

    #[error("CQL query is invalid: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("CQL query contains unsupported field '{field}'. Supported fields are: {}.", .supported.join(", "))]
    UnsupportedField {
        field: String,
        supported: Vec<String>,
    },

    #[error("CQL evaluation error: {0}")]
    StructuralEvaluation(String),

    // ========== Serialization Errors ==========
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ========== IO Errors ==========
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Configuration Errors ==========
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Lexing and parenthesis failures, classified by their most likely cause
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error(
        "Unsupported operator detected. Found '==' operator. Use single '=' for equality. \
         Supported operators: =, !=, >, <, >=, <=, ~, !~"
    )]
    DoubleEquals,

    #[error(
        "String values must be quoted. Found unquoted value in: '{0}'. \
         Use single or double quotes around string values."
    )]
    UnquotedValue(String),

    #[error("Unclosed quote detected. Ensure all quoted strings are properly closed.")]
    UnclosedQuote,

    #[error("Unsupported operator detected. Supported operators: =, !=, >, <, >=, <=, ~, !~")]
    UnsupportedOperator,

    #[error("Unrecognized syntax '{0}'. Check field names, operators, and quote usage.")]
    Unrecognized(String),

    #[error("Mismatched parentheses.")]
    MismatchedParentheses,
}

/// Result type alias for cqlkit operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the query text itself could not be tokenized or parsed
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }

    /// Returns true if this error was caused by the query rather than by
    /// the environment (files, configuration)
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Error::MissingQuery
                | Error::FunctionEvaluation(_)
                | Error::Syntax(_)
                | Error::UnsupportedField { .. }
                | Error::StructuralEvaluation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}

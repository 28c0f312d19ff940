//! cqlkit Query Engine
//!
//! Parses and evaluates CQL (Content Query Language) filters such as
//! `type='page' AND (title~'launch' OR label!='draft') AND created>now('-4w')`.
//!
//! # Overview
//!
//! A query goes through:
//! - Function preprocessing (`now()` becomes a timestamp literal)
//! - Lexing into comparisons, connectives and parentheses
//! - Field validation against the supported field list
//! - Shunting-yard conversion to postfix
//! - Stack evaluation per record

pub mod compare;
pub mod compile;
pub mod executor;
pub mod fields;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod search;
pub mod validator;

pub use compile::{CompiledQuery, compile, compile_and_filter, compile_with_clock};
pub use fields::{FieldValue, SUPPORTED_FIELDS};
pub use lexer::{Comparison, ComparisonOp, Keyword, Literal, LogicalOp, Paren, Token, tokenize};
pub use parser::{Instruction, to_postfix};
pub use search::{search, search_with_clock};

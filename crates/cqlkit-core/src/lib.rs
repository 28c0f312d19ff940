//! cqlkit Core Library
//!
//! This crate provides the fundamental types, traits, and error handling
//! shared by the content query engine.
//!
//! # Modules
//!
//! - `error` - Error types and result aliases
//! - `content` - Read access to content records
//! - `store` - Read-only record and label collaborators
//! - `temporal` - Clocks and timestamp formatting

pub mod content;
pub mod error;
pub mod store;
pub mod temporal;

pub use content::Record;
pub use error::{Error, Result, SyntaxError};
pub use store::{InMemoryContentStore, LabelStore, NoLabels, RecordStore};
pub use temporal::{Clock, FixedClock, SystemClock};

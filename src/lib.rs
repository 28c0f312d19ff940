//! cqlkit - CQL parsing and evaluation for content search
//!
//! This is the main library crate that re-exports all cqlkit components.

pub use cqlkit_core as core;
pub use cqlkit_query as query;

// Re-export commonly used types
pub use cqlkit_core::{
    Clock, Error, FixedClock, InMemoryContentStore, LabelStore, NoLabels, Record, RecordStore,
    Result, SyntaxError, SystemClock,
};

pub use cqlkit_query::{CompiledQuery, compile, compile_and_filter, compile_with_clock, search};

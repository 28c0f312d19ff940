//! Clocks and timestamp formatting
//!
//! Timestamps are rendered as `YYYY-MM-DDTHH:MM:SS.sssZ`, the same shape the
//! content store uses for `history.createdDate`, so they order correctly as
//! plain strings.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// The current UTC instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create from a DateTime
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Create from milliseconds since Unix epoch
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format an instant with millisecond precision and a `Z` suffix
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

//! CLI configuration

use chrono::{DateTime, Utc};
use cqlkit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON content fixture
    pub data_file: PathBuf,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// Instant used for `now()`; the system clock when unset
    pub reference_time: Option<DateTime<Utc>>,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./content.json"),
            log_level: "info".to_string(),
            reference_time: None,
            pretty: false,
        }
    }
}

impl CliConfig {
    /// Create a new configuration
    pub fn new<P: Into<PathBuf>>(data_file: P) -> Self {
        Self {
            data_file: data_file.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|err| {
            Error::Configuration(format!("{}: {}", path.display(), err))
        })
    }

    /// Builder: set the content fixture
    pub fn data_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_file = path.into();
        self
    }

    /// Builder: set log level
    pub fn log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    /// Builder: pin `now()` to an instant
    pub fn reference_time(mut self, instant: DateTime<Utc>) -> Self {
        self.reference_time = Some(instant);
        self
    }

    /// Builder: pretty-print output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

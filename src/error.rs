//! Error types for Dayline

use std::fmt;
use thiserror::Error;

/// Which per-user log a source could not supply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Tagged activity log (`user_tags/<id>.csv`)
    Tags,
    /// Step sensor log (`user_data/data_<id>.csv`)
    Sensor,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Tags => "user_tags",
            SourceKind::Sensor => "user_data",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while loading logs or assembling datasets
#[derive(Debug, Error)]
pub enum DaylineError {
    #[error("User roster not found: {0}")]
    MissingRoster(String),

    #[error("no {kind}: {user_id}")]
    MissingSource { user_id: String, kind: SourceKind },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Failed to parse value: {0}")]
    ParseError(String),

    #[error("Invalid window length: {0} days (must be at least 1)")]
    InvalidWindow(u32),
}

// In crates/signal-log/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Signal log not available: {0}")]
    DataUnavailable(PathBuf),

    #[error("Signal log is missing required column '{column}'")]
    SchemaViolation { column: &'static str },

    #[error("Failed to access signal log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single log row was rejected. Rows that fail are dropped, never repaired.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowParseError {
    #[error("line {line}: missing value for '{column}'")]
    MissingField { line: u64, column: &'static str },

    #[error("line {line}: '{column}' is not a usable number: {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: unparseable timestamp {value:?}")]
    InvalidTimestamp { line: u64, value: String },

    #[error("line {line}: malformed row: {reason}")]
    Malformed { line: u64, reason: String },
}

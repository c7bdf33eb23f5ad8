// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised signal value: {0:?}")]
pub struct ParseSignalError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown strategy {0:?} (expected `combined` or `rsi`)")]
pub struct ParseStrategyError(pub String);

// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Insufficient data: need at least {required} prices, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid indicator period for {name}: {value}")]
    InvalidPeriod { name: &'static str, value: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

// In crates/backtester/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid backtest parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Log(#[from] signal_log::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

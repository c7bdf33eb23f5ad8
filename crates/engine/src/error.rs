// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Price provider error: {0}")]
    Provider(#[from] api_client::Error),

    #[error("Indicator error: {0}")]
    Indicators(#[from] strategies::Error),

    #[error("Signal log error: {0}")]
    Log(#[from] signal_log::Error),

    #[error("Watchlist error: {0}")]
    Config(#[from] app_config::Error),

    #[error("No symbol produced a signal ({attempted} attempted)")]
    NoSignals { attempted: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

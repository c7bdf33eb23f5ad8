// In crates/web-server/src/types.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYMBOL: &str = "BTCUSDC";

/// Query parameters of `GET /api/signal` (e.g. `?symbol=ETHUSDC`).
#[derive(Debug, Deserialize)]
pub struct SignalQuery {
    // `serde(default = ...)` provides a default value if the param is missing.
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

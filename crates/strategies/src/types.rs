// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

/// Window lengths for the indicator engine.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub ema_short_period: usize,
    pub ema_long_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_short_period: 9,
            ema_long_period: 21,
        }
    }
}

/// RSI levels that separate the BUY / WAIT / SELL zones.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SignalThresholds {
    /// RSI strictly below this is oversold (BUY zone).
    pub oversold: f64,
    /// RSI strictly above this is overbought (SELL zone).
    pub overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

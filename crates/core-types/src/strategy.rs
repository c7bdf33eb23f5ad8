use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseStrategyError;

/// Selects the decision rule used to turn indicators into a `Signal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// RSI threshold and EMA short/long ordering must agree.
    #[default]
    Combined,
    /// RSI thresholds only.
    #[serde(rename = "rsi", alias = "rsi_only")]
    RsiOnly,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Combined => "combined",
            StrategyKind::RsiOnly => "rsi",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(StrategyKind::Combined),
            "rsi" | "rsi_only" => Ok(StrategyKind::RsiOnly),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

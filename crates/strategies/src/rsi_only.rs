// In crates/strategies/src/rsi_only.rs

use crate::types::SignalThresholds;
use crate::{Signal, Strategy};
use core_types::IndicatorSnapshot;

/// Momentum rule that looks at the RSI level alone.
#[derive(Debug, Clone)]
pub struct RsiOnly {
    thresholds: SignalThresholds,
}

impl RsiOnly {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }
}

impl Strategy for RsiOnly {
    fn name(&self) -> &'static str {
        "RsiOnly"
    }

    fn assess(&self, snapshot: &IndicatorSnapshot) -> Signal {
        let Some(rsi) = snapshot.rsi else {
            return Signal::Wait;
        };

        if rsi < self.thresholds.oversold {
            Signal::Buy
        } else if rsi > self.thresholds.overbought {
            Signal::Sell
        } else {
            Signal::Wait
        }
    }
}

// In crates/strategies/src/combined.rs

use crate::types::SignalThresholds;
use crate::{Signal, Strategy};
use core_types::IndicatorSnapshot;

/// RSI threshold confirmed by the short/long EMA ordering.
///
/// BUY needs an oversold RSI while the short EMA is above the long one,
/// SELL needs an overbought RSI while the short EMA is below it.
#[derive(Debug, Clone)]
pub struct RsiEmaCombined {
    thresholds: SignalThresholds,
}

impl RsiEmaCombined {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }
}

impl Strategy for RsiEmaCombined {
    fn name(&self) -> &'static str {
        "RsiEmaCombined"
    }

    fn assess(&self, snapshot: &IndicatorSnapshot) -> Signal {
        // Any indicator still warming up means no decision.
        let (Some(rsi), Some(ema_short), Some(ema_long)) =
            (snapshot.rsi, snapshot.ema_short, snapshot.ema_long)
        else {
            return Signal::Wait;
        };

        if rsi < self.thresholds.oversold && ema_short > ema_long {
            Signal::Buy
        } else if rsi > self.thresholds.overbought && ema_short < ema_long {
            Signal::Sell
        } else {
            Signal::Wait
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(rsi: f64, ema_short: Option<f64>, ema_long: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            timestamp: Utc::now(),
            price: 100.0,
            rsi: Some(rsi),
            ema_short,
            ema_long,
        }
    }

    #[test]
    fn requires_ema_agreement() {
        let strategy = RsiEmaCombined::new(SignalThresholds::default());
        assert_eq!(strategy.assess(&snapshot(25.0, Some(101.0), Some(100.0))), Signal::Buy);
        assert_eq!(strategy.assess(&snapshot(25.0, Some(99.0), Some(100.0))), Signal::Wait);
        assert_eq!(strategy.assess(&snapshot(75.0, Some(99.0), Some(100.0))), Signal::Sell);
        assert_eq!(strategy.assess(&snapshot(75.0, Some(101.0), Some(100.0))), Signal::Wait);
        assert_eq!(strategy.assess(&snapshot(50.0, Some(101.0), Some(100.0))), Signal::Wait);
    }

    #[test]
    fn equal_emas_never_signal() {
        let strategy = RsiEmaCombined::new(SignalThresholds::default());
        assert_eq!(strategy.assess(&snapshot(10.0, Some(100.0), Some(100.0))), Signal::Wait);
        assert_eq!(strategy.assess(&snapshot(90.0, Some(100.0), Some(100.0))), Signal::Wait);
    }

    #[test]
    fn undefined_emas_wait() {
        let strategy = RsiEmaCombined::new(SignalThresholds::default());
        assert_eq!(strategy.assess(&snapshot(10.0, None, Some(100.0))), Signal::Wait);
        assert_eq!(strategy.assess(&snapshot(90.0, Some(100.0), None)), Signal::Wait);
    }
}

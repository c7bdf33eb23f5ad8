// In crates/engine/src/evaluator.rs

use chrono::{DateTime, Utc};
use core_types::{IndicatorSnapshot, PricePoint, Signal, SignalRecord, StrategyKind, Symbol};
use serde::Serialize;
use strategies::{IndicatorSettings, SignalThresholds, compute_snapshots, create_strategy};

use crate::error::Result;

/// Aligned chart arrays for the dashboard. `None` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SignalHistory {
    /// `HH:MM` of each bar, UTC.
    pub times: Vec<String>,
    pub prices: Vec<f64>,
    pub ema_short: Vec<Option<f64>>,
    pub ema_long: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

impl SignalHistory {
    fn from_snapshots(snapshots: &[IndicatorSnapshot]) -> Self {
        let mut history = SignalHistory::default();
        for snapshot in snapshots {
            history.times.push(snapshot.timestamp.format("%H:%M").to_string());
            history.prices.push(snapshot.price);
            history.ema_short.push(snapshot.ema_short);
            history.ema_long.push(snapshot.ema_long);
            history.rsi.push(snapshot.rsi);
        }
        history
    }
}

/// The evaluation of one symbol at its most recent bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSignal {
    pub symbol: Symbol,
    pub price: f64,
    pub rsi: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    /// RSI+EMA decision.
    pub signal: Signal,
    /// RSI-only decision.
    pub signal_rsi: Signal,
    pub history: SignalHistory,
}

impl SymbolSignal {
    /// The log row for this evaluation, stamped with the cycle time.
    pub fn to_record(&self, timestamp: DateTime<Utc>) -> SignalRecord {
        SignalRecord {
            timestamp,
            symbol: self.symbol.clone(),
            price: self.price,
            rsi: self.rsi,
            ema_short: Some(self.ema_short),
            ema_long: Some(self.ema_long),
            signal_rsi: Some(self.signal_rsi),
            signal_combined: Some(self.signal),
        }
    }
}

/// Computes indicators over `prices` and classifies the last bar under both strategies.
///
/// Fails with `InsufficientData` when the RSI is still warming up at the last bar.
pub fn evaluate_series(
    symbol: &Symbol,
    prices: &[PricePoint],
    indicators: &IndicatorSettings,
    thresholds: SignalThresholds,
) -> Result<SymbolSignal> {
    let snapshots = compute_snapshots(prices, indicators)?;

    let latest = snapshots
        .last()
        .and_then(|s| Some((s, s.rsi?, s.ema_short?, s.ema_long?)));
    let Some((last, rsi, ema_short, ema_long)) = latest else {
        return Err(strategies::Error::InsufficientData {
            required: indicators.rsi_period + 1,
            actual: prices.len(),
        }
        .into());
    };

    let signal = create_strategy(StrategyKind::Combined, thresholds).assess(last);
    let signal_rsi = create_strategy(StrategyKind::RsiOnly, thresholds).assess(last);

    Ok(SymbolSignal {
        symbol: symbol.clone(),
        price: last.price,
        rsi,
        ema_short,
        ema_long,
        signal,
        signal_rsi,
        history: SignalHistory::from_snapshots(&snapshots),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::{Duration, TimeZone};

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, price)| PricePoint {
                timestamp: start + Duration::minutes(5 * i as i64),
                price: *price,
            })
            .collect()
    }

    #[test]
    fn falling_market_is_oversold() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64 * 2.0).collect();
        let result = evaluate_series(
            &Symbol::from("BTCUSDC"),
            &series(&closes),
            &IndicatorSettings::default(),
            SignalThresholds::default(),
        )
        .unwrap();

        assert_eq!(result.price, 142.0);
        assert!(result.rsi < 30.0);
        assert_eq!(result.signal_rsi, Signal::Buy);
        // Short EMA sits below the long one in a downtrend, so the combined rule waits.
        assert!(result.ema_short < result.ema_long);
        assert_eq!(result.signal, Signal::Wait);
    }

    #[test]
    fn history_is_aligned_with_nulls_during_warm_up() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let result = evaluate_series(
            &Symbol::from("ETHUSDC"),
            &series(&closes),
            &IndicatorSettings::default(),
            SignalThresholds::default(),
        )
        .unwrap();

        let history = &result.history;
        assert_eq!(history.times.len(), 20);
        assert_eq!(history.times[0], "10:00");
        assert_eq!(history.times[1], "10:05");
        assert_eq!(history.rsi.iter().filter(|v| v.is_none()).count(), 14);
        assert!(history.ema_short.iter().all(Option::is_some));

        let json = serde_json::to_value(history).unwrap();
        assert!(json["rsi"][0].is_null());
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = evaluate_series(
            &Symbol::from("BTCUSDC"),
            &series(&[100.0, 101.0, 102.0]),
            &IndicatorSettings::default(),
            SignalThresholds::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Indicators(strategies::Error::InsufficientData { required: 15, actual: 3 })
        ));
    }

    #[test]
    fn record_carries_both_signals() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = evaluate_series(
            &Symbol::from("BTCUSDC"),
            &series(&closes),
            &IndicatorSettings::default(),
            SignalThresholds::default(),
        )
        .unwrap();
        let now = Utc::now();
        let record = result.to_record(now);
        assert_eq!(record.timestamp, now);
        assert_eq!(record.signal_combined, Some(result.signal));
        assert_eq!(record.signal_rsi, Some(Signal::Sell));
    }
}

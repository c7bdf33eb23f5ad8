// In crates/strategies/src/indicators.rs

use core_types::{IndicatorSnapshot, PricePoint};
use ta::Next;
use ta::indicators::ExponentialMovingAverage as Ema;

use crate::error::{Error, Result};
use crate::types::IndicatorSettings;

/// The smallest series the engine accepts.
pub const MIN_PRICE_POINTS: usize = 2;

/// Three indicator series aligned index-for-index with the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub ema_short: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Computes all indicators over a sequence of closing prices.
    pub fn from_closes(closes: &[f64], settings: &IndicatorSettings) -> Result<Self> {
        if closes.len() < MIN_PRICE_POINTS {
            return Err(Error::InsufficientData {
                required: MIN_PRICE_POINTS,
                actual: closes.len(),
            });
        }

        Ok(Self {
            ema_short: ema_series(closes, settings.ema_short_period)?,
            ema_long: ema_series(closes, settings.ema_long_period)?,
            rsi: rsi_series(closes, settings.rsi_period)?,
        })
    }

    pub fn len(&self) -> usize {
        self.ema_short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_short.is_empty()
    }
}

/// Computes one `IndicatorSnapshot` per price point.
pub fn compute_snapshots(
    prices: &[PricePoint],
    settings: &IndicatorSettings,
) -> Result<Vec<IndicatorSnapshot>> {
    let closes: Vec<f64> = prices.iter().map(|p| p.price).collect();
    let series = IndicatorSeries::from_closes(&closes, settings)?;

    let snapshots = prices
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorSnapshot {
            timestamp: point.timestamp,
            price: point.price,
            rsi: series.rsi[i],
            ema_short: Some(series.ema_short[i]),
            ema_long: Some(series.ema_long[i]),
        })
        .collect();

    Ok(snapshots)
}

/// Exponential moving average seeded with the first price.
///
/// `ema[i] = ema[i-1] + 2/(span+1) * (price[i] - ema[i-1])`, `ema[0] = price[0]`.
pub fn ema_series(closes: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = Ema::new(span).map_err(|_| Error::InvalidPeriod {
        name: "ema",
        value: span,
    })?;
    Ok(closes.iter().map(|c| ema.next(*c)).collect())
}

/// Relative Strength Index using Wilder's smoothing (`alpha = 1/period`).
///
/// The averages are seeded with the first price change and the value is
/// reported once `period` changes have been observed; earlier entries are
/// `None`. A zero average loss yields 100.
pub fn rsi_series(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(Error::InvalidPeriod {
            name: "rsi",
            value: period,
        });
    }

    let mut values = vec![None; closes.len()];
    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i == 1 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain += alpha * (gain - avg_gain);
            avg_loss += alpha * (loss - avg_loss);
        }

        if i >= period {
            values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    Ok(values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn zigzag(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn ema_is_seeded_with_first_price() {
        let ema = ema_series(&[10.0, 20.0, 30.0], 3).unwrap();
        assert_eq!(ema[0], 10.0);
        // k = 2 / (3 + 1) = 0.5
        assert!((ema[1] - 15.0).abs() < 1e-12);
        assert!((ema[2] - 22.5).abs() < 1e-12);
    }

    #[test]
    fn ema_has_no_look_ahead() {
        let prices = zigzag(60);
        let full = ema_series(&prices, 9).unwrap();
        for cut in [1, 5, 20, 59] {
            let prefix = ema_series(&prices[..cut], 9).unwrap();
            for i in 0..cut {
                assert_eq!(prefix[i], full[i], "index {i} changed with cut {cut}");
            }
        }
    }

    #[test]
    fn rsi_is_undefined_during_warm_up_and_bounded_after() {
        let prices = zigzag(80);
        let rsi = rsi_series(&prices, 14).unwrap();
        assert_eq!(rsi.len(), prices.len());
        assert!(rsi[..14].iter().all(Option::is_none));
        for value in rsi[14..].iter() {
            let v = value.expect("rsi should be defined after warm-up");
            assert!((0.0..=100.0).contains(&v), "rsi out of bounds: {v}");
        }
    }

    #[test]
    fn rsi_extremes() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rsi_series(&rising, 14).unwrap()[19], Some(100.0));
        assert_eq!(rsi_series(&falling, 14).unwrap()[19], Some(0.0));
    }

    #[test]
    fn rsi_matches_hand_computed_value() {
        // period 2: changes +2, -1, +1
        let rsi = rsi_series(&[10.0, 12.0, 11.0, 12.0], 2).unwrap();
        assert_eq!(rsi[0], None);
        assert_eq!(rsi[1], None);
        // gain 2 -> 1.0, loss 0 -> 0.5  => rs = 2
        assert!((rsi[2].unwrap() - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
        // gain 1.0 -> 1.0, loss 0.5 -> 0.25 => rs = 4
        assert!((rsi[3].unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn fewer_than_two_prices_is_insufficient() {
        let settings = IndicatorSettings::default();
        assert_eq!(
            IndicatorSeries::from_closes(&[42.0], &settings),
            Err(Error::InsufficientData { required: 2, actual: 1 })
        );
        assert!(IndicatorSeries::from_closes(&[], &settings).is_err());
        assert!(IndicatorSeries::from_closes(&[1.0, 2.0], &settings).is_ok());
    }

    #[test]
    fn zero_periods_are_rejected() {
        assert!(ema_series(&[1.0, 2.0], 0).is_err());
        assert!(rsi_series(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn snapshots_are_aligned_with_prices() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let prices: Vec<PricePoint> = zigzag(30)
            .into_iter()
            .enumerate()
            .map(|(i, price)| PricePoint {
                timestamp: start + Duration::minutes(5 * i as i64),
                price,
            })
            .collect();

        let snapshots = compute_snapshots(&prices, &IndicatorSettings::default()).unwrap();
        assert_eq!(snapshots.len(), 30);
        assert_eq!(snapshots[0].ema_short, Some(prices[0].price));
        assert_eq!(snapshots[0].rsi, None);
        assert!(snapshots[29].rsi.is_some());
        assert_eq!(snapshots[29].timestamp, prices[29].timestamp);
    }
}

// In crates/engine/src/lib.rs

pub mod error;
pub mod evaluator;

pub use error::{Error, Result};
pub use evaluator::{SignalHistory, SymbolSignal, evaluate_series};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use api_client::PriceProvider;
use app_config::{SignalSettings, load_watchlist};
use chrono::Utc;
use core_types::Symbol;
use futures::future;
use signal_log::SignalLog;
use tokio::sync::RwLock;

/// Runs the live evaluation cycle over the watchlist and keeps the latest results.
pub struct SignalEngine {
    provider: Arc<dyn PriceProvider + Send + Sync>,
    log: SignalLog,
    settings: SignalSettings,
    watchlist_path: PathBuf,
    latest: RwLock<Vec<SymbolSignal>>,
}

impl SignalEngine {
    pub fn new(
        provider: Arc<dyn PriceProvider + Send + Sync>,
        log: SignalLog,
        settings: SignalSettings,
        watchlist_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            log,
            settings,
            watchlist_path: watchlist_path.into(),
            latest: RwLock::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &SignalSettings {
        &self.settings
    }

    /// Fetches and classifies one symbol. Nothing is logged or cached.
    pub async fn evaluate_symbol(&self, symbol: &Symbol) -> Result<SymbolSignal> {
        let prices = self
            .provider
            .get_price_series(symbol, &self.settings.interval, self.settings.history_limit)
            .await?;
        evaluate_series(
            symbol,
            &prices,
            &self.settings.indicators,
            self.settings.thresholds,
        )
    }

    /// One pass over the enabled watchlist symbols.
    ///
    /// Symbols that fail are logged and skipped. Successful results share one
    /// timestamp, are appended to the signal log as a single batch and replace
    /// the cached results. If every symbol failed the cache is left alone and
    /// `NoSignals` is returned.
    pub async fn run_cycle(&self) -> Result<Vec<SymbolSignal>> {
        let symbols = load_watchlist(&self.watchlist_path)?.enabled_symbols();
        if symbols.is_empty() {
            tracing::warn!(path = %self.watchlist_path.display(), "Watchlist has no enabled symbols.");
            return Ok(Vec::new());
        }

        let evaluations = future::join_all(symbols.iter().map(|s| self.evaluate_symbol(s))).await;

        let mut results = Vec::with_capacity(symbols.len());
        for (symbol, evaluation) in symbols.iter().zip(evaluations) {
            match evaluation {
                Ok(signal) => results.push(signal),
                Err(e) => tracing::warn!(symbol = %symbol, error = %e, "Skipping symbol this cycle."),
            }
        }

        if results.is_empty() {
            return Err(Error::NoSignals {
                attempted: symbols.len(),
            });
        }

        let now = Utc::now();
        let records: Vec<_> = results.iter().map(|r| r.to_record(now)).collect();
        let written = self.log.append_batch(&records)?;

        tracing::info!(
            symbols = results.len(),
            skipped = symbols.len() - results.len(),
            rows = written,
            "Signal cycle complete."
        );

        *self.latest.write().await = results.clone();
        Ok(results)
    }

    /// The results of the last successful cycle, in watchlist order.
    pub async fn latest(&self) -> Vec<SymbolSignal> {
        self.latest.read().await.clone()
    }

    /// The cached result for `symbol`, or a one-off live evaluation that is not logged.
    pub async fn signal_for(&self, symbol: &Symbol) -> Result<SymbolSignal> {
        let cached = self
            .latest
            .read()
            .await
            .iter()
            .find(|s| &s.symbol == symbol)
            .cloned();
        match cached {
            Some(signal) => Ok(signal),
            None => self.evaluate_symbol(symbol).await,
        }
    }

    /// Repeats the cycle every `poll_interval_secs`. A failed cycle is logged and the loop goes on.
    pub async fn run(&self) {
        let period = Duration::from_secs(self.settings.poll_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(
            interval = %self.settings.interval,
            poll_secs = period.as_secs(),
            "Starting signal engine."
        );
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "Signal cycle failed.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use core_types::{PricePoint, Signal};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        series: HashMap<Symbol, Vec<PricePoint>>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(entries: &[(&str, Vec<f64>)]) -> Self {
            let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
            let series = entries
                .iter()
                .map(|(symbol, closes)| {
                    let points = closes
                        .iter()
                        .enumerate()
                        .map(|(i, price)| PricePoint {
                            timestamp: start + ChronoDuration::minutes(5 * i as i64),
                            price: *price,
                        })
                        .collect();
                    (Symbol::from(*symbol), points)
                })
                .collect();
            Self {
                series,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceProvider for MockProvider {
        async fn get_price_series(
            &self,
            symbol: &Symbol,
            _interval: &str,
            limit: u16,
        ) -> api_client::Result<Vec<PricePoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let points = self.series.get(symbol).ok_or_else(|| api_client::Error::ApiError {
                code: -1121,
                msg: "Invalid symbol.".into(),
            })?;
            let skip = points.len().saturating_sub(limit as usize);
            Ok(points[skip..].to_vec())
        }
    }

    fn falling() -> Vec<f64> {
        (0..40).map(|i| 200.0 - i as f64).collect()
    }

    fn rising() -> Vec<f64> {
        (0..40).map(|i| 100.0 + i as f64).collect()
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        engine: SignalEngine,
        provider: Arc<MockProvider>,
        log_path: PathBuf,
    }

    fn fixture(watchlist: &str, provider: MockProvider) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let watchlist_path = dir.path().join("watchlist.json");
        std::fs::write(&watchlist_path, watchlist).unwrap();
        let log_path = dir.path().join("signals_log.csv");

        let provider = Arc::new(provider);
        let engine = SignalEngine::new(
            provider.clone(),
            SignalLog::new(&log_path),
            SignalSettings::default(),
            watchlist_path,
        );
        Fixture {
            _dir: dir,
            engine,
            provider,
            log_path,
        }
    }

    #[tokio::test]
    async fn cycle_logs_one_batch_and_skips_failing_symbols() {
        let fx = fixture(
            r#"{"symbols": [
                {"symbol": "BTCUSDC"},
                {"symbol": "NOPEUSDC"},
                {"symbol": "XRPUSDC", "enabled": false},
                {"symbol": "ETHUSDC"}
            ]}"#,
            MockProvider::new(&[("BTCUSDC", falling()), ("ETHUSDC", rising())]),
        );

        let results = fx.engine.run_cycle().await.unwrap();
        let symbols: Vec<_> = results.iter().map(|r| r.symbol.0.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDC", "ETHUSDC"]);
        assert_eq!(results[0].signal_rsi, Signal::Buy);
        assert_eq!(results[1].signal_rsi, Signal::Sell);
        assert_eq!(fx.provider.calls.load(Ordering::SeqCst), 3);

        let (records, dropped) = SignalLog::new(&fx.log_path).read().unwrap().into_valid();
        assert_eq!(dropped, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, records[1].timestamp);
        assert_eq!(records[1].signal_combined, Some(results[1].signal));

        assert_eq!(fx.engine.latest().await, results);
    }

    #[tokio::test]
    async fn cycle_with_no_successes_logs_nothing() {
        let fx = fixture(
            r#"{"symbols": [{"symbol": "NOPEUSDC"}]}"#,
            MockProvider::new(&[]),
        );

        let err = fx.engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, Error::NoSignals { attempted: 1 }));
        assert!(!fx.log_path.exists());
        assert!(fx.engine.latest().await.is_empty());
    }

    #[tokio::test]
    async fn missing_watchlist_is_a_config_error() {
        let fx = fixture("{}", MockProvider::new(&[]));
        std::fs::remove_file(fx._dir.path().join("watchlist.json")).unwrap();
        assert!(matches!(fx.engine.run_cycle().await, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn signal_for_prefers_cache_and_falls_back_to_live() {
        let fx = fixture(
            r#"{"symbols": [{"symbol": "BTCUSDC"}]}"#,
            MockProvider::new(&[("BTCUSDC", falling()), ("SOLUSDC", rising())]),
        );
        fx.engine.run_cycle().await.unwrap();
        assert_eq!(fx.provider.calls.load(Ordering::SeqCst), 1);

        let cached = fx.engine.signal_for(&Symbol::from("BTCUSDC")).await.unwrap();
        assert_eq!(cached.symbol, Symbol::from("BTCUSDC"));
        assert_eq!(fx.provider.calls.load(Ordering::SeqCst), 1);

        let live = fx.engine.signal_for(&Symbol::from("SOLUSDC")).await.unwrap();
        assert_eq!(live.signal_rsi, Signal::Sell);
        assert_eq!(fx.provider.calls.load(Ordering::SeqCst), 2);

        // The live lookup is not logged.
        let (records, _) = SignalLog::new(&fx.log_path).read().unwrap().into_valid();
        assert_eq!(records.len(), 1);
    }
}

// In crates/backtester/src/lib.rs

pub mod error;
pub mod logger;
pub mod prepare;
pub mod report;

pub use error::{Error, Result};
pub use logger::{TradeLogger, TraceStep};
pub use prepare::{BacktestRow, CleanedSeries, clean_records, load_series};
pub use report::{print_report, render_report};

use analytics::engine::AnalyticsEngine;
use analytics::types::{PerformanceReport, PositionState, Trade, TradeKind};
use core_types::{Signal, SignalRecord, StrategyKind, Symbol};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use signal_log::SignalLog;
use strategies::{SignalResolver, SignalThresholds};
use tracing::{debug, info, warn};

/// Validated account parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestSettings {
    pub start_balance: Decimal,
    /// One-way fee rate charged on both the BUY and the SELL leg.
    pub fee: Decimal,
}

impl BacktestSettings {
    /// Fails with `InvalidParameter` unless the balance is finite and `0 <= fee < 1`.
    pub fn new(start_balance: f64, fee: f64) -> Result<Self> {
        if !fee.is_finite() || !(0.0..1.0).contains(&fee) {
            return Err(Error::InvalidParameter(format!(
                "fee must be in [0, 1), got {fee}"
            )));
        }
        let start_balance = Decimal::from_f64(start_balance).ok_or_else(|| {
            Error::InvalidParameter(format!("start balance must be finite, got {start_balance}"))
        })?;
        let fee = Decimal::from_f64(fee)
            .ok_or_else(|| Error::InvalidParameter(format!("fee is not representable: {fee}")))?;

        Ok(Self { start_balance, fee })
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub symbol: Symbol,
    pub strategy: StrategyKind,
    pub trades: Vec<Trade>,
    /// One entry per simulated row.
    pub trace: Vec<TraceStep>,
    pub report: PerformanceReport,
    pub records_processed: usize,
    pub rows_dropped: usize,
}

impl BacktestOutcome {
    pub fn closed_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.kind == TradeKind::Sell)
    }

    /// True when cleaning left nothing to replay.
    pub fn is_empty(&self) -> bool {
        self.records_processed == 0
    }
}

/// The account while the cleaned series is folded over.
struct Simulation {
    state: PositionState,
    fee: Decimal,
    last_price: Option<Decimal>,
    logger: TradeLogger,
}

impl Simulation {
    fn new(settings: &BacktestSettings) -> Self {
        Self {
            state: PositionState::flat(settings.start_balance),
            fee: settings.fee,
            last_price: None,
            logger: TradeLogger::new(),
        }
    }

    fn step(mut self, row: &BacktestRow) -> Self {
        self.last_price = Some(row.price);
        let action = match row.signal {
            Signal::Buy if self.state.is_flat() => self.buy(row),
            Signal::Sell if !self.state.is_flat() => self.sell(row),
            _ => None,
        };
        self.logger.record_step(row.signal, action, &self.state);
        self
    }

    fn buy(&mut self, row: &BacktestRow) -> Option<TradeKind> {
        let cash = self.state.cash_balance;
        if cash <= dec!(0) {
            debug!(time = %row.time, "Skipping BUY with no cash.");
            return None;
        }
        let quantity = match (cash * (dec!(1) - self.fee)).checked_div(row.price) {
            Some(quantity) if quantity > dec!(0) => quantity,
            _ => {
                warn!(time = %row.time, price = %row.price, "Skipping BUY, quantity is not representable.");
                return None;
            }
        };
        self.state = PositionState {
            quantity_held: quantity,
            entry_price: Some(row.price),
            cash_balance: dec!(0),
        };
        self.logger.record_buy(row.time, row.price, quantity);
        Some(TradeKind::Buy)
    }

    fn sell(&mut self, row: &BacktestRow) -> Option<TradeKind> {
        let quantity = self.state.quantity_held;
        let entry_price = self.state.entry_price.unwrap_or(row.price);
        let proceeds = quantity
            .checked_mul(row.price)
            .and_then(|gross| gross.checked_mul(dec!(1) - self.fee));
        let cost = entry_price.checked_mul(quantity);
        let pnl = proceeds.zip(cost).and_then(|(p, c)| p.checked_sub(c));
        let (Some(proceeds), Some(pnl)) = (proceeds, pnl) else {
            warn!(time = %row.time, price = %row.price, "Skipping SELL, proceeds overflow.");
            return None;
        };

        self.state = PositionState::flat(proceeds);
        self.logger.record_sell(row.time, row.price, quantity, pnl);
        Some(TradeKind::Sell)
    }

    fn final_equity(&self) -> Decimal {
        match self.last_price {
            Some(price) => self.state.equity_at(price),
            None => self.state.cash_balance,
        }
    }
}

/// Replays logged decisions for one symbol as a long-only, single-position account.
pub struct Backtester {
    pub symbol: Symbol,
    resolver: SignalResolver,
    settings: BacktestSettings,
}

impl Backtester {
    pub fn new(
        symbol: Symbol,
        strategy: StrategyKind,
        thresholds: SignalThresholds,
        settings: BacktestSettings,
    ) -> Self {
        Self {
            symbol,
            resolver: SignalResolver::new(strategy, thresholds),
            settings,
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.resolver.kind()
    }

    pub fn settings(&self) -> &BacktestSettings {
        &self.settings
    }

    /// Reads the symbol's rows from `log` and replays them.
    pub fn run_from_log(&self, log: &SignalLog) -> Result<BacktestOutcome> {
        let series = load_series(log, &self.symbol, &self.resolver)?;
        Ok(self.simulate(series))
    }

    /// Cleans already-parsed records for this symbol and replays them.
    /// Records of other symbols are ignored.
    pub fn run(&self, records: Vec<SignalRecord>) -> BacktestOutcome {
        let records = records.into_iter().filter(|r| r.symbol == self.symbol).collect();
        self.simulate(clean_records(records, &self.resolver))
    }

    /// The pure fold. The same series always produces the same outcome.
    pub fn simulate(&self, series: CleanedSeries) -> BacktestOutcome {
        let strategy = self.strategy();
        if series.is_empty() {
            info!(symbol = %self.symbol, dropped = series.dropped, "Nothing to backtest.");
            return BacktestOutcome {
                symbol: self.symbol.clone(),
                strategy,
                trades: Vec::new(),
                trace: Vec::new(),
                report: PerformanceReport::unchanged(self.settings.start_balance),
                records_processed: 0,
                rows_dropped: series.dropped,
            };
        }

        let simulation = series
            .rows
            .iter()
            .fold(Simulation::new(&self.settings), Simulation::step);

        let final_equity = simulation.final_equity();
        let report = AnalyticsEngine::new().calculate(
            self.settings.start_balance,
            final_equity,
            &simulation.logger.trades,
        );

        info!(
            symbol = %self.symbol,
            strategy = %strategy,
            rows = series.rows.len(),
            trades = simulation.logger.trades.len(),
            final_equity = %final_equity,
            "Backtest finished."
        );

        BacktestOutcome {
            symbol: self.symbol.clone(),
            strategy,
            trades: simulation.logger.trades,
            trace: simulation.logger.steps,
            report,
            records_processed: series.rows.len(),
            rows_dropped: series.dropped,
        }
    }
}

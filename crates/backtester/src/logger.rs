// In crates/backtester/src/logger.rs

use analytics::types::{PositionState, Trade, TradeKind};
use chrono::{DateTime, Utc};
use core_types::Signal;
use rust_decimal::Decimal;

/// One processed row of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    /// The decision resolved for the row.
    pub signal: Signal,
    /// The fill the decision caused; `None` when it was a no-op.
    pub action: Option<TradeKind>,
    /// The account after the row.
    pub state: PositionState,
}

/// Records the fills and the per-row account state of a simulation.
#[derive(Debug, Default)]
pub struct TradeLogger {
    pub trades: Vec<Trade>,
    pub steps: Vec<TraceStep>,
}

impl TradeLogger {
    /// Creates a new, empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_buy(&mut self, time: DateTime<Utc>, price: Decimal, quantity: Decimal) {
        self.trades.push(Trade {
            kind: TradeKind::Buy,
            time,
            price,
            quantity,
            pnl: None,
        });
    }

    pub fn record_sell(&mut self, time: DateTime<Utc>, price: Decimal, quantity: Decimal, pnl: Decimal) {
        self.trades.push(Trade {
            kind: TradeKind::Sell,
            time,
            price,
            quantity,
            pnl: Some(pnl),
        });
    }

    /// Records the state after a row, with the fill it caused if any.
    pub fn record_step(&mut self, signal: Signal, action: Option<TradeKind>, state: &PositionState) {
        self.steps.push(TraceStep {
            signal,
            action,
            state: state.clone(),
        });
    }
}

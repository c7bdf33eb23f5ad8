// In crates/analytics/src/types.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeKind {
    Buy,
    Sell,
}

/// A single fill in the simulated trade log.
///
/// `pnl` is only present on SELL trades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub kind: TradeKind,
    pub time: DateTime<Utc>,
    pub price: Decimal,
    pub quantity: Decimal,
    pub pnl: Option<Decimal>,
}

/// The account after a record has been processed.
///
/// Either flat (`quantity_held == 0`, all value in cash) or fully invested
/// (`cash_balance == 0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionState {
    pub quantity_held: Decimal,
    pub entry_price: Option<Decimal>,
    pub cash_balance: Decimal,
}

impl PositionState {
    pub fn flat(cash: Decimal) -> Self {
        Self {
            quantity_held: Decimal::ZERO,
            entry_price: None,
            cash_balance: cash,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity_held.is_zero()
    }

    /// Marks the account to `price` without charging a closing fee.
    /// Saturates at `Decimal::MAX` for values beyond the decimal range.
    pub fn equity_at(&self, price: Decimal) -> Decimal {
        if self.is_flat() {
            self.cash_balance
        } else {
            self.cash_balance
                .saturating_add(self.quantity_held.saturating_mul(price))
        }
    }
}

/// Summary statistics of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PerformanceReport {
    pub start_balance: Decimal,
    pub final_equity: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_percentage: f64,
    pub closed_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate: f64,
}

impl PerformanceReport {
    /// A report for a run that never traded.
    pub fn unchanged(start_balance: Decimal) -> Self {
        Self {
            start_balance,
            final_equity: start_balance,
            ..Self::default()
        }
    }
}

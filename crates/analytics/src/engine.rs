use crate::types::{PerformanceReport, Trade, TradeKind};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// The engine responsible for calculating performance metrics from trade data.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the report from the trade log and the marked-to-market final equity.
    pub fn calculate(
        &self,
        start_balance: Decimal,
        final_equity: Decimal,
        trades: &[Trade],
    ) -> PerformanceReport {
        let mut report = PerformanceReport::unchanged(start_balance);
        report.final_equity = final_equity;

        // Only SELLs close a round trip.
        let closed: Vec<Decimal> = trades
            .iter()
            .filter(|t| t.kind == TradeKind::Sell)
            .map(|t| t.pnl.unwrap_or(Decimal::ZERO))
            .collect();

        report.closed_trades = closed.len() as u32;
        report.winning_trades = closed.iter().filter(|pnl| **pnl > dec!(0)).count() as u32;
        // A break-even trade counts as a loss.
        report.losing_trades = closed.iter().filter(|pnl| **pnl <= dec!(0)).count() as u32;

        if report.closed_trades > 0 {
            report.win_rate =
                report.winning_trades as f64 / report.closed_trades as f64 * 100.0;
        }

        report.total_pnl = final_equity.saturating_sub(start_balance);
        if start_balance > dec!(0) {
            report.total_pnl_percentage = final_equity
                .checked_div(start_balance)
                .and_then(|ratio| (ratio - dec!(1)).checked_mul(dec!(100)))
                .and_then(|pct| pct.to_f64())
                .unwrap_or_else(|| {
                    let start = start_balance.to_f64().unwrap_or(f64::NAN);
                    let end = final_equity.to_f64().unwrap_or(f64::NAN);
                    (end / start - 1.0) * 100.0
                });
        }

        report
    }
}

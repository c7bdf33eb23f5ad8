// In crates/backtester/src/report.rs

use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::BacktestOutcome;

const TRADE_PREVIEW: usize = 5;

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats the fixed-order summary printed by the backtest command.
pub fn render_report(outcome: &BacktestOutcome) -> String {
    if outcome.is_empty() {
        return format!(
            "Nothing to backtest for {} ({} strategy): no usable rows in the signal log.\n",
            outcome.symbol, outcome.strategy
        );
    }

    let report = &outcome.report;
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "===== BACKTEST RESULT =====");
    let _ = writeln!(out, "Symbol:          {}", outcome.symbol);
    let _ = writeln!(out, "Strategy:        {}", outcome.strategy);
    let _ = writeln!(out, "Start balance:   {:.2} USDC", money(report.start_balance));
    let _ = writeln!(out, "End balance:     {:.2} USDC", money(report.final_equity));
    let _ = writeln!(
        out,
        "Total PnL:       {:.2} USDC ({:.2} %)",
        money(report.total_pnl),
        report.total_pnl_percentage
    );
    let _ = writeln!(out, "Closed trades:   {}", report.closed_trades);
    let _ = writeln!(out, "Winning trades:  {}", report.winning_trades);
    let _ = writeln!(out, "Losing trades:   {}", report.losing_trades);
    let _ = writeln!(out, "Win rate:        {:.1} %", report.win_rate);

    if report.closed_trades > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "First {TRADE_PREVIEW} closed trades:");
        for trade in outcome.closed_trades().take(TRADE_PREVIEW) {
            let _ = writeln!(
                out,
                " - {}  SELL @ {:.2}, pnl: {:.2} USDC",
                trade.time.format("%Y-%m-%d %H:%M:%S"),
                money(trade.price),
                money(trade.pnl.unwrap_or_default())
            );
        }
    }
    out
}

pub fn print_report(outcome: &BacktestOutcome) {
    print!("{}", render_report(outcome));
}

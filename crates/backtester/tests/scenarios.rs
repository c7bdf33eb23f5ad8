// In crates/backtester/tests/scenarios.rs

use std::fs;

use analytics::types::TradeKind;
use backtester::{BacktestSettings, Backtester, Error, render_report};
use core_types::{Signal, StrategyKind, Symbol};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use signal_log::SignalLog;
use strategies::SignalThresholds;

const HEADER: &str = "timestamp,symbol,price,rsi,ema_short,ema_long,signal_rsi,signal_combined\n";

fn backtester(strategy: StrategyKind, fee: f64) -> Backtester {
    Backtester::new(
        Symbol::from("BTCUSDC"),
        strategy,
        SignalThresholds::default(),
        BacktestSettings::new(1000.0, fee).expect("valid settings"),
    )
}

fn write_log(body: &str) -> (tempfile::TempDir, SignalLog) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signals_log.csv");
    fs::write(&path, body).unwrap();
    (dir, SignalLog::new(path))
}

#[test]
fn rsi_only_scenario_from_log() {
    let (_dir, log) = write_log(&format!(
        "{HEADER}\
         2024-05-01T10:00:00Z,BTCUSDC,100,25,,,,\n\
         2024-05-01T10:05:00Z,BTCUSDC,101,28,,,,\n\
         2024-05-01T10:10:00Z,BTCUSDC,102,75,,,,\n\
         2024-05-01T10:15:00Z,BTCUSDC,103,72,,,,\n"
    ));

    let outcome = backtester(StrategyKind::RsiOnly, 0.0).run_from_log(&log).unwrap();
    let actions: Vec<_> = outcome.trace.iter().map(|s| s.action).collect();
    assert_eq!(actions, vec![Some(TradeKind::Buy), None, Some(TradeKind::Sell), None]);
    assert_eq!(outcome.report.closed_trades, 1);
}

#[test]
fn fee_scenario_from_log() {
    let (_dir, log) = write_log(&format!(
        "{HEADER}\
         2024-05-01T10:00:00Z,BTCUSDC,100,20,,,,\n\
         2024-05-01T10:05:00Z,BTCUSDC,110,80,,,,\n"
    ));

    let outcome = backtester(StrategyKind::RsiOnly, 0.001).run_from_log(&log).unwrap();
    let proceeds = 9.99 * 110.0 * 0.999;

    assert_eq!(outcome.trades[0].quantity, dec!(9.99));
    let pnl = outcome.trades[1].pnl.unwrap().to_f64().unwrap();
    assert!((pnl - (proceeds - 999.0)).abs() < 1e-6);
    let equity = outcome.report.final_equity.to_f64().unwrap();
    assert!((equity - proceeds).abs() < 1e-6);
}

#[test]
fn extreme_prices_do_not_abort_the_run() {
    let (_dir, log) = write_log(&format!(
        "{HEADER}\
         2024-05-01T10:00:00Z,BTCUSDC,1e-30,20,,,,\n\
         2024-05-01T10:05:00Z,BTCUSDC,1e-20,20,,,,\n\
         2024-05-01T10:10:00Z,BTCUSDC,1e10,80,,,,\n"
    ));

    let outcome = backtester(StrategyKind::RsiOnly, 0.001).run_from_log(&log).unwrap();
    assert_eq!(outcome.rows_dropped, 1);
    let actions: Vec<_> = outcome.trace.iter().map(|s| s.action).collect();
    assert_eq!(actions, vec![Some(TradeKind::Buy), None]);
    assert!(render_report(&outcome).contains("Closed trades:   0"));
}

#[test]
fn header_only_log_has_nothing_to_backtest() {
    let (_dir, log) = write_log(HEADER);
    let outcome = backtester(StrategyKind::Combined, 0.001).run_from_log(&log).unwrap();

    assert!(outcome.is_empty());
    assert_eq!(outcome.report.final_equity, dec!(1000));
    assert!(render_report(&outcome).starts_with("Nothing to backtest"));
}

#[test]
fn all_malformed_rows_have_nothing_to_backtest() {
    let (_dir, log) = write_log(&format!(
        "{HEADER}\
         not-a-time,BTCUSDC,100,20,,,,\n\
         2024-05-01T10:05:00Z,BTCUSDC,,80,,,,\n\
         2024-05-01T10:10:00Z,BTCUSDC,100,,,,,\n"
    ));

    let outcome = backtester(StrategyKind::RsiOnly, 0.001).run_from_log(&log).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.rows_dropped, 3);
    assert_eq!(outcome.report.total_pnl, dec!(0));
}

#[test]
fn stored_combined_signal_wins_over_recomputation() {
    // Recomputing the first row would give BUY: rsi 20 with short EMA above long.
    let (_dir, log) = write_log(&format!(
        "{HEADER}\
         2024-05-01T10:00:00Z,BTCUSDC,100,20,101,100,BUY,WAIT\n\
         2024-05-01T10:05:00Z,BTCUSDC,100,50,101,100,WAIT,BUY\n\
         2024-05-01T10:10:00Z,BTCUSDC,105,50,101,100,WAIT,SELL\n"
    ));

    let outcome = backtester(StrategyKind::Combined, 0.0).run_from_log(&log).unwrap();
    let signals: Vec<Signal> = outcome.trace.iter().map(|s| s.signal).collect();
    assert_eq!(signals, vec![Signal::Wait, Signal::Buy, Signal::Sell]);
    assert_eq!(outcome.trades[0].price, dec!(100));
    assert_eq!(outcome.trades[1].price, dec!(105));
}

#[test]
fn legacy_signal_column_is_reused_and_rows_are_sorted() {
    let (_dir, log) = write_log(
        "timestamp,symbol,price,rsi,ema9,ema21,signal\n\
         2024-05-01 10:10:00,BTCUSDC,120,50,1,2,SELL\n\
         2024-05-01 10:00:00,BTCUSDC,100,50,1,2,BUY\n\
         2024-05-01 10:05:00,ETHUSDC,3000,50,1,2,SELL\n",
    );

    let outcome = backtester(StrategyKind::Combined, 0.0).run_from_log(&log).unwrap();
    assert_eq!(outcome.records_processed, 2);
    assert_eq!(outcome.trades[0].kind, TradeKind::Buy);
    assert_eq!(outcome.trades[1].pnl, Some(dec!(200)));
}

#[test]
fn combined_without_signal_or_ema_columns_is_a_schema_violation() {
    let (_dir, log) = write_log(
        "timestamp,symbol,price,rsi\n\
         2024-05-01T10:00:00Z,BTCUSDC,100,20\n",
    );

    let err = backtester(StrategyKind::Combined, 0.0).run_from_log(&log).unwrap_err();
    assert!(matches!(
        err,
        Error::Log(signal_log::Error::SchemaViolation { column: "ema_short" })
    ));

    // The RSI-only rule needs nothing beyond the required columns.
    let outcome = backtester(StrategyKind::RsiOnly, 0.0).run_from_log(&log).unwrap();
    assert_eq!(outcome.trades.len(), 1);
}

#[test]
fn missing_log_is_reported_as_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let log = SignalLog::new(dir.path().join("absent.csv"));
    let err = backtester(StrategyKind::RsiOnly, 0.0).run_from_log(&log).unwrap_err();
    assert!(matches!(err, Error::Log(signal_log::Error::DataUnavailable(_))));
}

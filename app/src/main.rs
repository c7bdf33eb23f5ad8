// In app/src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use api_client::ApiClient;
use app_config::Settings;
use backtester::{BacktestSettings, Backtester, print_report};
use clap::{Parser, Subcommand};
use core_types::{StrategyKind, Symbol};
use engine::SignalEngine;
use signal_log::SignalLog;

mod telemetry;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A momentum signal bot for Binance spot pairs.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Polls the watchlist, logs signals and serves the dashboard API.
    Run,

    /// Runs one evaluation cycle and prints the results as JSON.
    Signals,

    /// Replays the signal log for one symbol as a long-only account.
    Backtest {
        /// The trading symbol to backtest.
        #[arg(short, long, default_value = "BTCUSDC")]
        symbol: String,

        /// Starting cash in USDC.
        #[arg(short, long, default_value_t = 1000.0)]
        balance: f64,

        /// One-way fee rate, charged on both legs.
        #[arg(short, long, default_value_t = 0.001)]
        fee: f64,

        /// Which decision to replay: `combined` (RSI+EMA) or `rsi`.
        #[arg(long, default_value = "combined")]
        signal_type: StrategyKind,

        /// Signal log to read; defaults to `paths.signal_log`.
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load configuration")?;
    telemetry::init(&settings.app.log_level);
    tracing::debug!(environment = %settings.app.environment, "Settings loaded.");

    match cli.command {
        Commands::Run => run_app(settings).await,
        Commands::Signals => handle_signals(settings).await,
        Commands::Backtest {
            symbol,
            balance,
            fee,
            signal_type,
            log,
        } => handle_backtest(&settings, symbol, balance, fee, signal_type, log),
    }
}

fn build_engine(settings: &Settings) -> Result<SignalEngine> {
    let client = ApiClient::new(&settings.binance)?;
    Ok(SignalEngine::new(
        Arc::new(client),
        SignalLog::new(&settings.paths.signal_log),
        settings.signals.clone(),
        &settings.paths.watchlist,
    ))
}

// --- "Run" Subcommand Logic ---

/// Runs the polling loop and the web server side by side until one stops or Ctrl-C.
async fn run_app(settings: Settings) -> Result<()> {
    let engine = Arc::new(build_engine(&settings)?);

    tracing::info!(
        watchlist = %settings.paths.watchlist.display(),
        log = %settings.paths.signal_log.display(),
        "Launching signal engine and web server."
    );

    let engine_handle = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run().await })
    };
    let server_handle = tokio::spawn(web_server::run(settings.server.clone(), engine));

    // In a healthy state neither task completes.
    tokio::select! {
        engine_result = engine_handle => {
            tracing::error!(?engine_result, "Signal engine task has terminated unexpectedly.");
        }
        server_result = server_handle => {
            match server_result {
                Ok(Err(e)) => return Err(e).context("Web server stopped"),
                other => tracing::error!(?other, "Web server task has terminated unexpectedly."),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested.");
            return Ok(());
        }
    }

    anyhow::bail!("A critical task terminated. Shutting down.");
}

// --- "Signals" Subcommand Logic ---

async fn handle_signals(settings: Settings) -> Result<()> {
    let engine = build_engine(&settings)?;
    match engine.run_cycle().await {
        Ok(results) => {
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Err(engine::Error::NoSignals { attempted }) => {
            println!("No signals this cycle: all {attempted} symbol(s) failed, see the log for details.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

// --- "Backtest" Subcommand Logic ---

fn handle_backtest(
    settings: &Settings,
    symbol: String,
    balance: f64,
    fee: f64,
    signal_type: StrategyKind,
    log: Option<PathBuf>,
) -> Result<()> {
    let account = BacktestSettings::new(balance, fee)?;
    let symbol = Symbol(symbol.trim().to_ascii_uppercase());
    let log = SignalLog::new(log.unwrap_or_else(|| settings.paths.signal_log.clone()));

    let backtester = Backtester::new(symbol, signal_type, settings.signals.thresholds, account);

    match backtester.run_from_log(&log) {
        Ok(outcome) => {
            if outcome.rows_dropped > 0 {
                tracing::warn!(dropped = outcome.rows_dropped, "Some log rows were unusable and skipped.");
            }
            print_report(&outcome);
            Ok(())
        }
        Err(backtester::Error::Log(signal_log::Error::DataUnavailable(path))) => {
            println!(
                "No signal data found at {}. Run `signal-bot run` for a while first.",
                path.display()
            );
            Ok(())
        }
        Err(backtester::Error::Log(signal_log::Error::SchemaViolation { column })) => {
            anyhow::bail!(
                "Signal log {} has no `{column}` column; cannot backtest the {} strategy.",
                log.path().display(),
                signal_type
            )
        }
        Err(e) => Err(e.into()),
    }
}

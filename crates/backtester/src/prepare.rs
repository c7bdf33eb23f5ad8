// In crates/backtester/src/prepare.rs

use chrono::{DateTime, Utc};
use core_types::{Signal, SignalRecord, StrategyKind, Symbol};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use signal_log::{Column, SignalLog};
use strategies::SignalResolver;

/// A row that survived cleaning, with its decision already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRow {
    pub time: DateTime<Utc>,
    pub price: Decimal,
    pub signal: Signal,
}

/// The simulation input plus how many rows were thrown away on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    pub rows: Vec<BacktestRow>,
    pub dropped: usize,
}

impl CleanedSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Filter stage of the pipeline.
///
/// Drops rows the resolver cannot decide on (combined without a stored signal
/// and without both EMAs) and rows whose price has no positive decimal
/// representation (too small prices round to zero), stably sorts the rest by timestamp and resolves each decision.
pub fn clean_records(records: Vec<SignalRecord>, resolver: &SignalResolver) -> CleanedSeries {
    let total = records.len();
    let mut usable: Vec<(SignalRecord, Decimal)> = records
        .into_iter()
        .filter(|r| resolver.can_resolve(r))
        .filter_map(|r| {
            Decimal::from_f64(r.price)
                .filter(|price| *price > Decimal::ZERO)
                .map(|price| (r, price))
        })
        .collect();
    let dropped = total - usable.len();

    usable.sort_by_key(|(r, _)| r.timestamp);

    let rows = usable
        .into_iter()
        .map(|(record, price)| BacktestRow {
            time: record.timestamp,
            price,
            signal: resolver.resolve(&record),
        })
        .collect();

    CleanedSeries { rows, dropped }
}

/// Reads the log and runs the whole parse-then-filter pipeline for one symbol.
///
/// `combined` needs either a stored combined signal column or both EMA
/// columns; a header with neither is a schema violation.
pub fn load_series(
    log: &SignalLog,
    symbol: &Symbol,
    resolver: &SignalResolver,
) -> signal_log::Result<CleanedSeries> {
    let contents = log.read()?;

    if resolver.kind() == StrategyKind::Combined && !contents.columns.has(Column::SignalCombined) {
        contents.columns.require(&[Column::EmaShort, Column::EmaLong])?;
    }

    let (records, parse_dropped) = contents.into_symbol(symbol);
    let mut series = clean_records(records, resolver);
    series.dropped += parse_dropped;

    tracing::info!(
        symbol = %symbol,
        rows = series.rows.len(),
        dropped = series.dropped,
        "Prepared backtest series."
    );
    Ok(series)
}

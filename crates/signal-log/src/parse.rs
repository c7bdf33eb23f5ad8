// In crates/signal-log/src/parse.rs

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use core_types::{Signal, SignalRecord, Symbol};
use csv::StringRecord;

use crate::error::RowParseError;
use crate::schema::{Column, ColumnMap};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Formats a timestamp the way the writer stores it: RFC 3339 with as many
/// fractional digits as needed, so every stored instant reads back unchanged.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Accepts RFC 3339, naive ISO-8601 (taken as UTC) and epoch milliseconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

/// Turns one CSV row into a `SignalRecord`.
///
/// `timestamp`, `symbol`, a positive `price` and a finite `rsi` are required.
/// EMA cells that are empty or not finite numbers read as absent. A signal
/// cell that is not BUY/SELL/WAIT reads as WAIT, since it can never trade.
pub fn parse_row(
    map: &ColumnMap,
    record: &StringRecord,
    line: u64,
) -> Result<SignalRecord, RowParseError> {
    let raw_timestamp = required(map, record, Column::Timestamp, line)?;
    let timestamp =
        parse_timestamp(raw_timestamp).ok_or_else(|| RowParseError::InvalidTimestamp {
            line,
            value: raw_timestamp.to_string(),
        })?;

    let symbol = Symbol(required(map, record, Column::Symbol, line)?.to_string());

    let price = required_number(map, record, Column::Price, line)?;
    if price <= 0.0 {
        return Err(RowParseError::InvalidNumber {
            line,
            column: Column::Price.name(),
            value: price.to_string(),
        });
    }
    let rsi = required_number(map, record, Column::Rsi, line)?;

    Ok(SignalRecord {
        timestamp,
        symbol,
        price,
        rsi,
        ema_short: optional_number(map, record, Column::EmaShort),
        ema_long: optional_number(map, record, Column::EmaLong),
        signal_rsi: optional_signal(map, record, Column::SignalRsi, line),
        signal_combined: optional_signal(map, record, Column::SignalCombined, line),
    })
}

fn required<'r>(
    map: &ColumnMap,
    record: &'r StringRecord,
    column: Column,
    line: u64,
) -> Result<&'r str, RowParseError> {
    map.field(record, column).ok_or(RowParseError::MissingField {
        line,
        column: column.name(),
    })
}

fn required_number(
    map: &ColumnMap,
    record: &StringRecord,
    column: Column,
    line: u64,
) -> Result<f64, RowParseError> {
    let raw = required(map, record, column, line)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowParseError::InvalidNumber {
            line,
            column: column.name(),
            value: raw.to_string(),
        })
}

fn optional_number(map: &ColumnMap, record: &StringRecord, column: Column) -> Option<f64> {
    map.field(record, column)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn optional_signal(
    map: &ColumnMap,
    record: &StringRecord,
    column: Column,
    line: u64,
) -> Option<Signal> {
    let raw = map.field(record, column)?;
    match raw.parse::<Signal>() {
        Ok(signal) => Some(signal),
        Err(e) => {
            tracing::debug!(line, column = column.name(), error = %e, "Treating unknown signal as WAIT.");
            Some(Signal::Wait)
        }
    }
}

// In crates/signal-log/src/lib.rs

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use core_types::{SignalRecord, Symbol};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

pub mod error;
pub mod parse;
pub mod schema;

pub use error::{Error, Result, RowParseError};
pub use schema::{Column, ColumnMap};

/// Append-only CSV log of per-symbol indicator snapshots.
///
/// Each call to [`SignalLog::append_batch`] writes one evaluation cycle with a
/// single `write_all`. Readers skip rows they cannot parse, so a batch cut
/// short by a crash costs at most the truncated rows.
#[derive(Debug)]
pub struct SignalLog {
    path: PathBuf,
    write_guard: Mutex<()>,
}

/// Everything read from the log: the resolved header and one parse result per row.
#[derive(Debug)]
pub struct LogContents {
    pub columns: ColumnMap,
    pub rows: Vec<std::result::Result<SignalRecord, RowParseError>>,
}

impl LogContents {
    /// The rows that parsed, in file order, plus how many were dropped.
    pub fn into_valid(self) -> (Vec<SignalRecord>, usize) {
        let total = self.rows.len();
        let valid: Vec<SignalRecord> = self.rows.into_iter().filter_map(|r| r.ok()).collect();
        let dropped = total - valid.len();
        (valid, dropped)
    }

    /// Like [`LogContents::into_valid`] but keeps only `symbol`.
    /// Dropped rows are counted whatever symbol they claimed.
    pub fn into_symbol(self, symbol: &Symbol) -> (Vec<SignalRecord>, usize) {
        let (valid, dropped) = self.into_valid();
        let matching = valid.into_iter().filter(|r| &r.symbol == symbol).collect();
        (matching, dropped)
    }
}

impl SignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one cycle's rows. The header is written only to a new or empty file.
    ///
    /// Returns the number of rows written; an empty batch touches nothing.
    pub fn append_batch(&self, records: &[SignalRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let _guard = self.write_guard.lock().unwrap_or_else(|e| e.into_inner());

        let existing_len = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let mut buffer = Vec::new();
        if existing_len > 0 && !ends_with_newline(&self.path)? {
            // A previous batch was cut short; keep its fragment on its own line.
            buffer.push(b'\n');
        }

        {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(&mut buffer);
            if existing_len == 0 {
                writer.write_record(&schema::header_record())?;
            }
            for record in records {
                writer.write_record(&encode(record))?;
            }
            writer.flush()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&buffer)?;
        file.flush()?;

        tracing::debug!(path = %self.path.display(), rows = records.len(), "Appended signal batch.");
        Ok(records.len())
    }

    /// Reads and parses every row.
    ///
    /// A missing or header-less file is `DataUnavailable`; a header without the
    /// always-required columns is `SchemaViolation`. Bad rows are returned as
    /// `Err` entries rather than failing the read.
    pub fn read(&self) -> Result<LogContents> {
        if !self.path.exists() {
            return Err(Error::DataUnavailable(self.path.clone()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::DataUnavailable(self.path.clone()));
        }
        let columns = ColumnMap::from_headers(&headers);
        columns.require(&Column::REQUIRED)?;

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        loop {
            let line = reader.position().line();
            match reader.read_record(&mut record) {
                Ok(true) => rows.push(parse::parse_row(&columns, &record, line)),
                Ok(false) => break,
                Err(e) => {
                    // Non-UTF-8 or otherwise unreadable row; skip it and go on.
                    rows.push(Err(RowParseError::Malformed {
                        line,
                        reason: e.to_string(),
                    }));
                    if e.is_io_error() {
                        break;
                    }
                }
            }
        }

        let dropped = rows.iter().filter(|r| r.is_err()).count();
        if dropped > 0 {
            tracing::info!(path = %self.path.display(), dropped, total = rows.len(), "Skipped malformed signal log rows.");
        }

        Ok(LogContents { columns, rows })
    }
}

fn encode(record: &SignalRecord) -> StringRecord {
    let number = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    let signal = |s: Option<core_types::Signal>| s.map(|x| x.as_str().to_string()).unwrap_or_default();

    StringRecord::from(vec![
        parse::format_timestamp(&record.timestamp),
        record.symbol.0.clone(),
        record.price.to_string(),
        record.rsi.to_string(),
        number(record.ema_short),
        number(record.ema_long),
        signal(record.signal_rsi),
        signal(record.signal_combined),
    ])
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

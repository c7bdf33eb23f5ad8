// In crates/signal-log/src/schema.rs

use csv::StringRecord;

use crate::error::{Error, Result};

/// The columns of the signal log, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Timestamp,
    Symbol,
    Price,
    Rsi,
    EmaShort,
    EmaLong,
    SignalRsi,
    SignalCombined,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Timestamp,
        Column::Symbol,
        Column::Price,
        Column::Rsi,
        Column::EmaShort,
        Column::EmaLong,
        Column::SignalRsi,
        Column::SignalCombined,
    ];

    /// Columns every reader needs, whatever the strategy.
    pub const REQUIRED: [Column; 4] = [
        Column::Timestamp,
        Column::Symbol,
        Column::Price,
        Column::Rsi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Symbol => "symbol",
            Column::Price => "price",
            Column::Rsi => "rsi",
            Column::EmaShort => "ema_short",
            Column::EmaLong => "ema_long",
            Column::SignalRsi => "signal_rsi",
            Column::SignalCombined => "signal_combined",
        }
    }

    /// Older header names still found in existing logs.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::EmaShort => &["ema9"],
            Column::EmaLong => &["ema21"],
            Column::SignalCombined => &["signal"],
            _ => &[],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Header positions resolved once per file. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    positions: [Option<usize>; 8],
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let mut map = ColumnMap::default();
        for column in Column::ALL {
            // The canonical name takes precedence over an alias.
            map.positions[column.index()] = find(column.name())
                .or_else(|| column.aliases().iter().find_map(|alias| find(alias)));
        }
        map
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column.index()]
    }

    pub fn has(&self, column: Column) -> bool {
        self.position(column).is_some()
    }

    /// Fails with `SchemaViolation` on the first absent column.
    pub fn require(&self, columns: &[Column]) -> Result<()> {
        match columns.iter().find(|c| !self.has(**c)) {
            Some(missing) => Err(Error::SchemaViolation {
                column: missing.name(),
            }),
            None => Ok(()),
        }
    }

    /// The trimmed value of `column` in `record`, `None` when absent or empty.
    pub fn field<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.position(column)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// The header line written to a fresh log.
pub fn header_record() -> StringRecord {
    Column::ALL.iter().map(|c| c.name()).collect()
}

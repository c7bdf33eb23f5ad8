// In crates/app-config/src/watchlist.rs

use std::path::Path;

use core_types::Symbol;
use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_enabled() -> bool {
    true
}

/// One `symbols` item. Per-symbol keys other than `symbol` and `enabled` are kept in `extra`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WatchlistEntry {
    pub symbol: Symbol,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The contents of `watchlist.json`.
///
/// Keys other than `symbols` are kept in `extra` untouched.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Watchlist {
    #[serde(default)]
    pub symbols: Vec<WatchlistEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Watchlist {
    /// Enabled symbols in file order, each listed once.
    pub fn enabled_symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for entry in self.symbols.iter().filter(|e| e.enabled) {
            if !symbols.contains(&entry.symbol) {
                symbols.push(entry.symbol.clone());
            }
        }
        symbols
    }
}

pub fn parse_watchlist(json: &str) -> Result<Watchlist> {
    Ok(serde_json::from_str(json)?)
}

/// Reads the watchlist file. The file is re-read on every call so edits apply on the next cycle.
pub fn load_watchlist(path: impl AsRef<Path>) -> Result<Watchlist> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_watchlist(&content)
}

// In crates/app-config/src/types.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strategies::{IndicatorSettings, SignalThresholds};

/// Every section falls back to its defaults, so the binary runs with no config files at all.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Binance API.
    pub binance: BinanceSettings,
    pub server: ServerSettings,
    pub signals: SignalSettings,
    pub paths: PathSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            log_level: "info".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct BinanceSettings {
    /// The REST API base URL for Binance spot.
    pub rest_base_url: String,
    /// Sent as `X-MBX-APIKEY` when present. Klines are public, so it is optional.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com".into(),
            api_key: None,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// How the live cycle fetches prices and classifies them.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SignalSettings {
    /// Kline interval, e.g. "5m".
    pub interval: String,
    /// Number of klines fetched per symbol; 288 five-minute bars is one day.
    pub history_limit: u16,
    pub poll_interval_secs: u64,
    pub indicators: IndicatorSettings,
    pub thresholds: SignalThresholds,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            interval: "5m".into(),
            history_limit: 288,
            poll_interval_secs: 10,
            indicators: IndicatorSettings::default(),
            thresholds: SignalThresholds::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PathSettings {
    pub signal_log: PathBuf,
    pub watchlist: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            signal_log: PathBuf::from("signals_log.csv"),
            watchlist: PathBuf::from("watchlist.json"),
        }
    }
}

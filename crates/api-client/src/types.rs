// In crates/api-client/src/types.rs

use chrono::{TimeZone, Utc};
use core_types::PricePoint;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

/// The main client for the public Binance spot market-data endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// Optional Binance API key, sent as `X-MBX-APIKEY`.
    pub api_key: Option<String>,
    /// The base URL for the Binance spot REST API.
    pub base_url: String,
}

/// Temporary struct to deserialize the kline response from Binance,
/// which is a JSON array of mixed types.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,         // 0: Open time
    pub String,      // 1: Open
    pub String,      // 2: High
    pub String,      // 3: Low
    pub String,      // 4: Close
    pub String,      // 5: Volume
    pub i64,         // 6: Close time
    pub String,      // 7: Quote asset volume
    pub i64,         // 8: Number of trades
    pub String,      // 9: Taker buy base asset volume
    pub String,      // 10: Taker buy quote asset volume
    pub String,      // 11: Ignore
);

impl RawKline {
    /// The bar's close, stamped with its open time.
    pub fn to_price_point(&self) -> Result<PricePoint> {
        let timestamp = Utc
            .timestamp_millis_opt(self.0)
            .single()
            .ok_or_else(|| Error::InvalidData(format!("open time {} out of range", self.0)))?;
        let price = self
            .4
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| Error::InvalidData(format!("close price {:?}", self.4)))?;

        Ok(PricePoint { timestamp, price })
    }
}

/// The error object Binance returns instead of a payload.
#[derive(Debug, Deserialize)]
pub struct BinanceErrorBody {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

// In crates/api-client/src/lib.rs

use std::time::Duration;

use app_config::types::BinanceSettings;
use async_trait::async_trait;
use core_types::{PricePoint, Symbol};

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// Source of recent closing prices for a symbol.
#[async_trait]
pub trait PriceProvider {
    /// Returns up to `limit` closes at `interval`, oldest first.
    async fn get_price_series(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<PricePoint>>;
}

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches historical kline (candlestick) data.
    ///
    /// This corresponds to the public `GET /api/v3/klines` endpoint.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The symbol to fetch klines for.
    /// * `interval`: The kline interval (e.g., "1m", "5m", "1h").
    /// * `limit`: Number of klines to return (max 1000).
    pub async fn get_klines(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<RawKline>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol.0, interval, limit
        );

        let mut request = self.http_client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let response_body = request
            .send()
            .await
            .map_err(Error::RequestFailed)?
            .text()
            .await
            .map_err(Error::RequestFailed)?;

        parse_klines(&response_body)
    }
}

#[async_trait]
impl PriceProvider for ApiClient {
    async fn get_price_series(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<PricePoint>> {
        let raw_klines = self.get_klines(symbol, interval, limit).await?;
        let series = to_price_series(&raw_klines)?;
        tracing::debug!(symbol = %symbol, interval, bars = series.len(), "Fetched klines.");
        Ok(series)
    }
}

/// Parses a klines response body, recognising Binance's `{code, msg}` error object.
pub fn parse_klines(body: &str) -> Result<Vec<RawKline>> {
    serde_json::from_str::<Vec<RawKline>>(body).map_err(|e| {
        // If deserialization fails, it might be a Binance error object.
        match serde_json::from_str::<BinanceErrorBody>(body) {
            Ok(err) => Error::ApiError { code: err.code, msg: err.msg },
            Err(_) => Error::DeserializationFailed(e),
        }
    })
}

/// Converts raw klines into closes, oldest first.
pub fn to_price_series(raw_klines: &[RawKline]) -> Result<Vec<PricePoint>> {
    let mut series = raw_klines
        .iter()
        .map(RawKline::to_price_point)
        .collect::<Result<Vec<_>>>()?;
    series.sort_by_key(|p| p.timestamp);
    Ok(series)
}

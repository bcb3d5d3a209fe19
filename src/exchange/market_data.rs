//! Public market-data REST client (Binance-compatible endpoint shape).
//!
//! Read-only: tickers and klines only, no authentication. The base URL is
//! configurable so tests and alternative mirrors can point elsewhere.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{Candle, PriceSeries, Ticker};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for unauthenticated market-data endpoints.
pub struct MarketDataClient {
    client: Client,
    base_url: String,
}

/// 24h ticker payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    bid_price: Decimal,
    ask_price: Decimal,
    last_price: Decimal,
    high_price: Decimal,
    low_price: Decimal,
    volume: Decimal,
    close_time: i64,
}

impl MarketDataClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// `BTC/USDT` -> `BTCUSDT`, the form REST endpoints expect.
    fn rest_symbol(symbol: &str) -> String {
        symbol.replace('/', "")
    }

    /// Liveness probe used by gateway `connect`.
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/api/v3/ping", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to reach market data endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("ping failed: {}", response.status());
        }
        Ok(())
    }

    /// Current top-of-book snapshot for a symbol.
    pub async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        let url = format!(
            "{}/api/v3/ticker/24hr?symbol={}",
            self.base_url,
            Self::rest_symbol(symbol)
        );
        debug!(url = %url, "fetching ticker");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to fetch ticker")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("ticker request failed: {} - {}", status, body);
        }

        let payload: TickerResponse = response
            .json()
            .await
            .context("failed to parse ticker response")?;

        let timestamp = Utc
            .timestamp_millis_opt(payload.close_time)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(Ticker {
            symbol: symbol.to_string(),
            bid: payload.bid_price,
            ask: payload.ask_price,
            last: payload.last_price,
            high: payload.high_price,
            low: payload.low_price,
            volume: payload.volume,
            timestamp,
        })
    }

    /// Candle history, oldest first. The endpoint returns rows of the form
    /// `[open_time, open, high, low, close, volume, ...]` with prices as
    /// strings.
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<PriceSeries> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            Self::rest_symbol(symbol),
            interval,
            limit.min(1000)
        );
        debug!(url = %url, "fetching klines");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to fetch klines")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("klines request failed: {} - {}", status, body);
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .context("failed to parse klines response")?;

        let mut series = PriceSeries::new(symbol, Vec::new());
        for row in rows {
            if let Some(candle) = Self::parse_kline_row(&row) {
                series.push(candle);
            }
        }

        Ok(series)
    }

    fn parse_kline_row(row: &[Value]) -> Option<Candle> {
        let open_time = row.first()?.as_i64()?;
        let timestamp = Utc.timestamp_millis_opt(open_time).single()?;

        let field = |index: usize| -> Option<f64> { row.get(index)?.as_str()?.parse().ok() };

        Some(Candle {
            timestamp,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
            volume: field(5)?,
        })
    }
}

//! OHLCV candles and the chronological price series fed to strategies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV candle. Immutable once produced by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronologically ordered candle history for one symbol.
///
/// Append-only within a fetch window; strategies read it, nothing mutates it
/// after the gateway hands it over.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub symbol: String,
    candles: Vec<Candle>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Most recent candle, if any.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Close prices in chronological order, ready for indicator math.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64) -> Candle {
        Candle {
            timestamp: Utc::now(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn closes_preserve_order() {
        let series = PriceSeries::new("BTC/USDT", vec![candle(1.0), candle(2.0), candle(3.0)]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().unwrap().close, 3.0);
    }
}

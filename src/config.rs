//! Typed configuration for the bot, loaded from a TOML file.
//!
//! Every section has defaults, so a partial file (or none at all) still
//! produces a runnable configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BotError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Trading pairs, `BASE/QUOTE` form, evaluated in order each cycle.
    pub symbols: Vec<String>,
    pub trading: TradingConfig,
    pub risk_management: RiskConfig,
    pub algorithm: AlgorithmConfig,
    pub exchange: ExchangeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTC/USDT".to_string()],
            trading: TradingConfig::default(),
            risk_management: RiskConfig::default(),
            algorithm: AlgorithmConfig::default(),
            exchange: ExchangeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .map_err(|e| BotError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

/// Cycle cadence and the global trading switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// When false the bot evaluates and logs signals but never submits entries.
    pub enabled: bool,

    /// Seconds between decision cycles.
    pub trading_frequency: u64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trading_frequency: 300,
        }
    }
}

/// Risk limits and position sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Fraction of available balance committed at full signal strength.
    pub position_size_percent: Decimal,

    /// Smallest notional worth trading; sizing below this returns zero.
    pub min_trade_amount: Decimal,

    /// Hard cap on a single position's notional.
    pub max_position_size: Decimal,

    /// Trades allowed per calendar day.
    pub max_daily_trades: u32,

    /// Open positions allowed at once.
    pub max_concurrent_positions: usize,

    /// Running max drawdown above which new entries are blocked (0 to 1).
    pub max_drawdown: f64,

    /// Drawdown ceiling that halts entries outright (0 to 1).
    pub emergency_stop_loss: f64,

    /// Per-position stop loss as a fraction of cost basis.
    pub stop_loss: Decimal,

    /// Per-position take profit as a fraction of cost basis.
    pub profit_target: Decimal,

    /// Starting balance assumed until the gateway reports a real one.
    pub account_balance: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            position_size_percent: dec!(0.1),
            min_trade_amount: dec!(10),
            max_position_size: dec!(1000),
            max_daily_trades: 50,
            max_concurrent_positions: 3,
            max_drawdown: 0.10,
            emergency_stop_loss: 0.15,
            stop_loss: dec!(0.05),
            profit_target: dec!(0.05),
            account_balance: dec!(10000),
        }
    }
}

/// Strategy selection and indicator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    /// One of `rsi_macd`, `bollinger`, `moving_average`.
    pub strategy: String,

    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,

    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,

    pub bollinger_period: usize,
    pub bollinger_std: f64,

    pub ma_short: usize,
    pub ma_long: usize,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            strategy: "rsi_macd".to_string(),
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std: 2.0,
            ma_short: 10,
            ma_long: 30,
        }
    }
}

/// Gateway selection and market-data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Display name used in logs and the gateway registry.
    pub name: String,

    /// Base URL of the public market-data REST endpoint.
    pub market_data_url: String,

    /// Starting cash ledger for the simulated gateway.
    pub paper_balance: Decimal,

    /// Currency the balance and PnL are denominated in.
    pub quote_currency: String,

    /// Kline interval requested for strategy history.
    pub kline_interval: String,

    /// Candles fetched per entry evaluation.
    pub kline_limit: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            name: "paper".to_string(),
            market_data_url: "https://api.binance.com".to_string(),
            paper_balance: dec!(10000),
            quote_currency: "USDT".to_string(),
            kline_interval: "1h".to_string(),
            kline_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.symbols, vec!["BTC/USDT"]);
        assert_eq!(config.trading.trading_frequency, 300);
        assert_eq!(config.risk_management.max_daily_trades, 50);
        assert_eq!(config.algorithm.strategy, "rsi_macd");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let raw = r#"
            symbols = ["ETH/USDT", "SOL/USDT"]

            [trading]
            trading_frequency = 60

            [risk_management]
            max_daily_trades = 5
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.trading.trading_frequency, 60);
        assert!(config.trading.enabled);
        assert_eq!(config.risk_management.max_daily_trades, 5);
        assert_eq!(config.risk_management.max_concurrent_positions, 3);
        assert_eq!(config.algorithm.rsi_period, 14);
    }
}

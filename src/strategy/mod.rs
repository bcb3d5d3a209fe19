//! Signal-generating strategies.
//!
//! A strategy consumes a [`PriceSeries`] and produces exactly one
//! [`TradingSignal`] per evaluation. Variants that cannot meet their history
//! precondition emit Hold with an "insufficient data" reason instead of
//! erroring, which keeps the orchestrator cycle uniform across symbols.

mod bollinger;
mod ma_cross;
mod rsi_macd;

pub use bollinger::BollingerStrategy;
pub use ma_cross::MaCrossStrategy;
pub use rsi_macd::RsiMacdStrategy;

use chrono::Utc;
use tracing::info;

use crate::config::AlgorithmConfig;
use crate::error::BotError;
use crate::models::{PriceSeries, TradingSignal};

/// Capability implemented by every strategy variant.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Evaluate the series and emit one signal. Never fails: degenerate
    /// inputs degrade to Hold.
    fn generate_signal(&self, series: &PriceSeries) -> TradingSignal;
}

/// Hold signal for a series that is too short for the variant's indicators.
pub(crate) fn insufficient_data(series: &PriceSeries) -> TradingSignal {
    let price = series.last().map(|c| c.close).unwrap_or(0.0);
    let timestamp = series.last().map(|c| c.timestamp).unwrap_or_else(Utc::now);
    TradingSignal::hold(series.symbol.clone(), price, timestamp, "insufficient data")
}

/// Names accepted by [`create_strategy`].
pub fn available_strategies() -> &'static [&'static str] {
    &["rsi_macd", "bollinger", "moving_average"]
}

/// Build a strategy variant from its configured name.
pub fn create_strategy(
    name: &str,
    config: &AlgorithmConfig,
) -> Result<Box<dyn Strategy>, BotError> {
    match name.to_lowercase().as_str() {
        "rsi_macd" => Ok(Box::new(RsiMacdStrategy::new(config))),
        "bollinger" => Ok(Box::new(BollingerStrategy::new(config))),
        "moving_average" => Ok(Box::new(MaCrossStrategy::new(config))),
        other => Err(BotError::UnknownStrategy(other.to_string())),
    }
}

/// Holds the active strategy chosen at initialization.
#[derive(Default)]
pub struct StrategyManager {
    active: Option<Box<dyn Strategy>>,
}

impl StrategyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate the configured strategy. Fails on unknown names, which is
    /// fatal to startup.
    pub fn initialize(&mut self, config: &AlgorithmConfig) -> Result<(), BotError> {
        let strategy = create_strategy(&config.strategy, config)?;
        info!(strategy = strategy.name(), "strategy initialized");
        self.active = Some(strategy);
        Ok(())
    }

    pub fn active(&self) -> Option<&dyn Strategy> {
        self.active.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_every_known_variant() {
        let config = AlgorithmConfig::default();
        for name in available_strategies() {
            let strategy = create_strategy(name, &config).unwrap();
            assert_eq!(strategy.name(), *name);
        }
    }

    #[test]
    fn factory_rejects_unknown_names() {
        let config = AlgorithmConfig::default();
        let err = create_strategy("momentum", &config).unwrap_err();
        assert!(matches!(err, BotError::UnknownStrategy(_)));
    }

    #[test]
    fn manager_initializes_configured_strategy() {
        let config = AlgorithmConfig {
            strategy: "bollinger".to_string(),
            ..Default::default()
        };
        let mut manager = StrategyManager::new();
        manager.initialize(&config).unwrap();
        assert_eq!(manager.active().unwrap().name(), "bollinger");
    }

    #[test]
    fn manager_initialize_fails_on_unknown_strategy() {
        let config = AlgorithmConfig {
            strategy: "nope".to_string(),
            ..Default::default()
        };
        let mut manager = StrategyManager::new();
        assert!(manager.initialize(&config).is_err());
        assert!(manager.active().is_none());
    }
}

//! Bollinger band mean-reversion strategy.

use crate::config::AlgorithmConfig;
use crate::indicators;
use crate::models::{PriceSeries, SignalAction, TradingSignal};

use super::{insufficient_data, Strategy};

/// Buys touches of the lower band, sells touches of the upper band, with
/// strength proportional to how far price broke through relative to the band
/// width.
#[derive(Debug)]
pub struct BollingerStrategy {
    period: usize,
    std_multiplier: f64,
}

impl BollingerStrategy {
    pub fn new(config: &AlgorithmConfig) -> Self {
        Self {
            period: config.bollinger_period,
            std_multiplier: config.bollinger_std,
        }
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &'static str {
        "bollinger"
    }

    fn generate_signal(&self, series: &PriceSeries) -> TradingSignal {
        if series.len() < self.period {
            return insufficient_data(series);
        }

        let closes = series.closes();
        let bands = indicators::bollinger(&closes, self.period, self.std_multiplier);

        let i = closes.len() - 1;
        let (upper, lower) = (bands.upper[i], bands.lower[i]);
        let width = upper - lower;

        let last = &series.candles()[i];
        let (price, timestamp) = (last.close, last.timestamp);

        if price <= lower {
            // A collapsed band (zero deviation) carries no displacement signal
            let strength = if width > 0.0 { (lower - price) / width } else { 0.0 };
            return TradingSignal::new(
                series.symbol.clone(),
                SignalAction::Buy,
                strength,
                price,
                timestamp,
                format!("close {price:.2} at or below lower band {lower:.2}"),
            );
        }

        if price >= upper {
            let strength = if width > 0.0 { (price - upper) / width } else { 0.0 };
            return TradingSignal::new(
                series.symbol.clone(),
                SignalAction::Sell,
                strength,
                price,
                timestamp,
                format!("close {price:.2} at or above upper band {upper:.2}"),
            );
        }

        TradingSignal::hold(
            series.symbol.clone(),
            price,
            timestamp,
            "price inside bands",
        )
    }
}

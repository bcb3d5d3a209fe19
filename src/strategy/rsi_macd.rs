//! RSI + MACD combination strategy.
//!
//! Entries need both an RSI extreme and an edge-triggered MACD cross in the
//! same step; either condition alone holds.

use crate::config::AlgorithmConfig;
use crate::indicators;
use crate::models::{PriceSeries, SignalAction, TradingSignal};

use super::{insufficient_data, Strategy};

/// Buys RSI-oversold bullish MACD crosses, sells RSI-overbought bearish ones.
#[derive(Debug)]
pub struct RsiMacdStrategy {
    rsi_period: usize,
    oversold: f64,
    overbought: f64,
    macd_fast: usize,
    macd_slow: usize,
    macd_signal: usize,
}

impl RsiMacdStrategy {
    pub fn new(config: &AlgorithmConfig) -> Self {
        Self {
            rsi_period: config.rsi_period,
            oversold: config.rsi_oversold,
            overbought: config.rsi_overbought,
            macd_fast: config.macd_fast,
            macd_slow: config.macd_slow,
            macd_signal: config.macd_signal,
        }
    }

    /// Candles needed before a signal can fire. The +1 covers the previous
    /// step the crossover comparison reads.
    fn required_history(&self) -> usize {
        self.macd_slow.max(self.rsi_period) + 1
    }
}

impl Strategy for RsiMacdStrategy {
    fn name(&self) -> &'static str {
        "rsi_macd"
    }

    fn generate_signal(&self, series: &PriceSeries) -> TradingSignal {
        if series.len() < self.required_history() {
            return insufficient_data(series);
        }

        let closes = series.closes();
        let rsi = indicators::rsi(&closes, self.rsi_period);
        let macd = indicators::macd(&closes, self.macd_fast, self.macd_slow, self.macd_signal);

        let i = closes.len() - 1;
        let current_rsi = rsi[i];
        let (macd_cur, signal_cur) = (macd.macd[i], macd.signal[i]);
        let (macd_prev, signal_prev) = (macd.macd[i - 1], macd.signal[i - 1]);

        let last = &series.candles()[i];
        let (price, timestamp) = (last.close, last.timestamp);

        // Bullish: oversold RSI plus MACD crossing above its signal line
        if current_rsi < self.oversold && macd_cur > signal_cur && macd_prev <= signal_prev {
            let strength = (self.oversold - current_rsi) / self.oversold;
            return TradingSignal::new(
                series.symbol.clone(),
                SignalAction::Buy,
                strength,
                price,
                timestamp,
                format!("RSI oversold ({current_rsi:.2}) with MACD bullish cross"),
            );
        }

        // Bearish mirror: overbought RSI plus MACD crossing below its signal line
        if current_rsi > self.overbought && macd_cur < signal_cur && macd_prev >= signal_prev {
            let strength = (current_rsi - self.overbought) / (100.0 - self.overbought);
            return TradingSignal::new(
                series.symbol.clone(),
                SignalAction::Sell,
                strength,
                price,
                timestamp,
                format!("RSI overbought ({current_rsi:.2}) with MACD bearish cross"),
            );
        }

        TradingSignal::hold(series.symbol.clone(), price, timestamp, "no crossover signal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use chrono::{Duration, Utc};

    fn make_series(closes: &[f64]) -> PriceSeries {
        let start = Utc::now() - Duration::hours(closes.len() as i64);
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start + Duration::hours(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 100.0,
            })
            .collect();
        PriceSeries::new("BTC/USDT", candles)
    }

    fn strategy() -> RsiMacdStrategy {
        RsiMacdStrategy::new(&AlgorithmConfig::default())
    }

    /// Rise, plateau, then a single sharp drop: RSI stays overbought while
    /// the MACD line crosses below its signal line on the final candle.
    fn sell_scenario_closes() -> Vec<f64> {
        let mut closes = vec![100.0];
        for _ in 0..22 {
            closes.push(closes.last().unwrap() + 1.0);
        }
        for _ in 0..6 {
            closes.push(closes.last().unwrap() + 0.2);
        }
        closes.push(closes.last().unwrap() - 2.0);
        closes
    }

    #[test]
    fn short_history_degrades_to_hold() {
        let series = make_series(&[100.0; 10]);
        let signal = strategy().generate_signal(&series);
        assert_eq!(signal.action, SignalAction::Hold);
        assert_eq!(signal.reason, "insufficient data");
    }

    #[test]
    fn steady_rise_without_cross_holds() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let signal = strategy().generate_signal(&make_series(&closes));
        // RSI is pinned at 100 but there is no bearish cross this step
        assert_eq!(signal.action, SignalAction::Hold);
    }

    #[test]
    fn overbought_drop_sells_citing_both_conditions() {
        let closes = sell_scenario_closes();
        assert_eq!(closes.len(), 30);

        let signal = strategy().generate_signal(&make_series(&closes));
        assert_eq!(signal.action, SignalAction::Sell);
        assert!(signal.reason.contains("RSI overbought"));
        assert!(signal.reason.contains("MACD bearish cross"));
        // RSI ~80.39: strength = (80.39 - 70) / 30
        assert!(signal.strength > 0.30 && signal.strength < 0.40);
        assert!((signal.price - 121.2).abs() < 1e-9);
    }

    #[test]
    fn oversold_pop_buys_citing_both_conditions() {
        // Mirror of the sell scenario: fall, flatten, then a bounce
        let mut closes = vec![200.0];
        for _ in 0..22 {
            closes.push(closes.last().unwrap() - 1.0);
        }
        for _ in 0..6 {
            closes.push(closes.last().unwrap() - 0.2);
        }
        closes.push(closes.last().unwrap() + 2.0);

        let signal = strategy().generate_signal(&make_series(&closes));
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(signal.reason.contains("RSI oversold"));
        assert!(signal.reason.contains("MACD bullish cross"));
        assert!(signal.strength > 0.30 && signal.strength < 0.40);
    }

    #[test]
    fn cross_is_edge_triggered_not_level_triggered() {
        // One extra flat candle after the drop: MACD is already below its
        // signal line, so the cross condition no longer fires.
        let mut closes = sell_scenario_closes();
        closes.push(*closes.last().unwrap());

        let signal = strategy().generate_signal(&make_series(&closes));
        assert_eq!(signal.action, SignalAction::Hold);
    }
}

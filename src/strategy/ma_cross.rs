//! Moving-average crossover strategy (golden cross / death cross).

use crate::config::AlgorithmConfig;
use crate::indicators;
use crate::models::{PriceSeries, SignalAction, TradingSignal};

use super::{insufficient_data, Strategy};

/// Buys when the short MA crosses above the long MA, sells on the mirror
/// cross. Strength scales with the relative separation of the averages.
#[derive(Debug)]
pub struct MaCrossStrategy {
    short_period: usize,
    long_period: usize,
}

impl MaCrossStrategy {
    pub fn new(config: &AlgorithmConfig) -> Self {
        Self {
            short_period: config.ma_short,
            long_period: config.ma_long,
        }
    }

    /// The +1 covers the previous step the crossover comparison reads.
    fn required_history(&self) -> usize {
        self.long_period + 1
    }
}

impl Strategy for MaCrossStrategy {
    fn name(&self) -> &'static str {
        "moving_average"
    }

    fn generate_signal(&self, series: &PriceSeries) -> TradingSignal {
        if series.len() < self.required_history() {
            return insufficient_data(series);
        }

        let closes = series.closes();
        let short_ma = indicators::sma(&closes, self.short_period);
        let long_ma = indicators::sma(&closes, self.long_period);

        let i = closes.len() - 1;
        let (short_cur, long_cur) = (short_ma[i], long_ma[i]);
        let (short_prev, long_prev) = (short_ma[i - 1], long_ma[i - 1]);

        let last = &series.candles()[i];
        let (price, timestamp) = (last.close, last.timestamp);

        let strength = if long_cur != 0.0 {
            (short_cur - long_cur).abs() / long_cur
        } else {
            0.0
        };

        // Golden cross: short moves above long on this step only
        if short_cur > long_cur && short_prev <= long_prev {
            return TradingSignal::new(
                series.symbol.clone(),
                SignalAction::Buy,
                strength,
                price,
                timestamp,
                format!("short MA {short_cur:.2} crossed above long MA {long_cur:.2}"),
            );
        }

        // Death cross: short moves below long on this step only
        if short_cur < long_cur && short_prev >= long_prev {
            return TradingSignal::new(
                series.symbol.clone(),
                SignalAction::Sell,
                strength,
                price,
                timestamp,
                format!("short MA {short_cur:.2} crossed below long MA {long_cur:.2}"),
            );
        }

        TradingSignal::hold(series.symbol.clone(), price, timestamp, "no crossover")
    }
}

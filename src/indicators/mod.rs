//! Technical indicators over close-price series.
//!
//! Pure functions, no shared state. Every function returns series aligned to
//! the input: positions inside the warm-up window hold NaN rather than an
//! extrapolated value, so callers must check their own length preconditions
//! before trusting the tail.

/// Simple moving average. NaN until `period` samples are available.
pub fn sma(closes: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "period must be >= 1");

    let mut out = vec![f64::NAN; closes.len()];
    let mut window_sum = 0.0;

    for (i, close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= period {
            window_sum -= closes[i - period];
        }
        if i + 1 >= period {
            out[i] = window_sum / period as f64;
        }
    }

    out
}

/// Exponential moving average, alpha = 2 / (period + 1), seeded with the
/// first close. Defined from the first sample onward.
pub fn ema(closes: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "period must be >= 1");

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out: Vec<f64> = Vec::with_capacity(closes.len());

    for (i, close) in closes.iter().enumerate() {
        let value = if i == 0 {
            *close
        } else {
            alpha * close + (1.0 - alpha) * out[i - 1]
        };
        out.push(value);
    }

    out
}

/// Relative strength index over rolling simple means of gains and losses.
///
/// Needs `period` price deltas, so the first `period` positions are NaN.
/// A window with zero average loss yields RSI = 100, never NaN or infinity.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "period must be >= 1");

    let mut out = vec![f64::NAN; closes.len()];
    if closes.len() <= period {
        return out;
    }

    for i in period..closes.len() {
        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for j in (i - period + 1)..=i {
            let delta = closes[j] - closes[j - 1];
            if delta > 0.0 {
                gain_sum += delta;
            } else {
                loss_sum -= delta;
            }
        }

        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;

        out[i] = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
    }

    out
}

/// MACD line, signal line, and histogram as aligned series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD: fast EMA minus slow EMA, with a signal EMA over the MACD line.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal);
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// Bollinger band series: middle SMA with bands at +/- k sample deviations.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bollinger bands over a rolling window of `period` closes.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> BollingerSeries {
    assert!(period >= 2, "period must be >= 2");

    let middle = sma(closes, period);
    let mut upper = vec![f64::NAN; closes.len()];
    let mut lower = vec![f64::NAN; closes.len()];

    for i in (period - 1)..closes.len() {
        let window = &closes[i + 1 - period..=i];
        let mean = middle[i];
        let variance =
            window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (period as f64 - 1.0);
        let std_dev = variance.sqrt();

        upper[i] = mean + k * std_dev;
        lower[i] = mean - k * std_dev;
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

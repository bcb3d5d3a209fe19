//! Trading signals emitted by strategies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directional decision produced by a strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

/// A single strategy evaluation result.
///
/// Produced fresh on every cycle; never persisted. `strength` is a normalized
/// confidence in [0, 1], clamped at construction.
#[derive(Debug, Clone)]
pub struct TradingSignal {
    pub symbol: String,
    pub action: SignalAction,
    pub strength: f64,
    /// Close price the signal was computed against.
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

impl TradingSignal {
    pub fn new(
        symbol: impl Into<String>,
        action: SignalAction,
        strength: f64,
        price: f64,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            strength: strength.clamp(0.0, 1.0),
            price,
            timestamp,
            reason: reason.into(),
        }
    }

    /// Hold with zero strength, used for no-signal and insufficient-data cases.
    pub fn hold(
        symbol: impl Into<String>,
        price: f64,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(symbol, SignalAction::Hold, 0.0, price, timestamp, reason)
    }

    pub fn is_actionable(&self) -> bool {
        self.action != SignalAction::Hold
    }
}

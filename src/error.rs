//! Typed errors shared across module seams.
//!
//! Risk-limit rejections are not errors: they are normal control decisions
//! carried as [`crate::risk::LimitDecision`] values with a reason string.

use thiserror::Error;

use crate::models::OrderStatus;

/// Errors raised by the bot core.
#[derive(Debug, Error)]
pub enum BotError {
    /// Exchange gateway was asked for data before `connect` succeeded.
    #[error("exchange `{0}` is not connected")]
    NotConnected(String),

    /// Order acknowledged with a status other than open/closed.
    #[error("order for {symbol} rejected with status {status:?}")]
    OrderRejected { symbol: String, status: OrderStatus },

    /// Attempt to open a second position on a symbol that already has one.
    #[error("position already open for {0}")]
    PositionExists(String),

    /// Close/mark requested for a symbol without an open position.
    #[error("no open position for {0}")]
    PositionNotFound(String),

    /// Strategy name not in the supported set.
    #[error("unknown strategy `{0}` (expected rsi_macd, bollinger or moving_average)")]
    UnknownStrategy(String),

    /// Malformed or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),
}

//! Domain data types: candles, signals, orders, positions, risk metrics.

mod candle;
mod metrics;
mod order;
mod position;
mod signal;

pub use candle::{Candle, PriceSeries};
pub use metrics::{RiskLevel, RiskMetrics};
pub use order::{Balance, Order, OrderSide, OrderStatus, OrderType, Ticker};
pub use position::{Position, PositionSide, TradeRecord};
pub use signal::{SignalAction, TradingSignal};

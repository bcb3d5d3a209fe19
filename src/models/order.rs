//! Exchange-facing order, ticker, and balance types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Order execution style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

/// Exchange-reported order lifecycle state.
///
/// Only `Open` and `Closed` count as an accepted acknowledgment; every other
/// state leaves the position book untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Open,
    Closed,
    Canceled,
    Expired,
    Rejected,
}

impl OrderStatus {
    /// Whether the exchange accepted the order.
    pub fn is_accepted(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Closed)
    }
}

/// An order as acknowledged by the exchange gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub status: OrderStatus,
    pub filled: Decimal,
    pub remaining: Decimal,
    pub timestamp: DateTime<Utc>,
    pub fee: Option<Decimal>,
}

/// Top-of-book quote snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Per-currency account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub free: Decimal,
    pub used: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_and_closed_are_accepted() {
        assert!(OrderStatus::Open.is_accepted());
        assert!(OrderStatus::Closed.is_accepted());
        assert!(!OrderStatus::Pending.is_accepted());
        assert!(!OrderStatus::Canceled.is_accepted());
        assert!(!OrderStatus::Expired.is_accepted());
        assert!(!OrderStatus::Rejected.is_accepted());
    }
}

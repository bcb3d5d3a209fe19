//! Live positions and the immutable records written when they close.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "long",
            PositionSide::Short => "short",
        }
    }
}

/// An open position. At most one exists per symbol at any time; the
/// [`crate::risk::RiskManager`] enforces that at the mutation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_pct: Decimal,
}

impl Position {
    pub fn new(
        symbol: impl Into<String>,
        side: PositionSide,
        quantity: Decimal,
        entry_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            entry_price,
            current_price: entry_price,
            entry_time: Utc::now(),
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_pct: Decimal::ZERO,
        }
    }

    /// Re-mark the position at `current_price`, recomputing unrealized PnL.
    pub fn mark(&mut self, current_price: Decimal) {
        self.current_price = current_price;
        self.unrealized_pnl = match self.side {
            PositionSide::Long => (current_price - self.entry_price) * self.quantity,
            PositionSide::Short => (self.entry_price - current_price) * self.quantity,
        };

        let cost_basis = self.entry_price * self.quantity;
        if !cost_basis.is_zero() {
            self.unrealized_pnl_pct = self.unrealized_pnl / cost_basis;
        }
    }

    /// Current market value of the position.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.current_price
    }
}

/// Immutable snapshot written when a position closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
}

impl TradeRecord {
    /// Seal an open position into its closing record.
    pub fn from_position(position: &Position, exit_time: DateTime<Utc>) -> Self {
        Self {
            symbol: position.symbol.clone(),
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price: position.current_price,
            entry_time: position.entry_time,
            exit_time,
            pnl: position.unrealized_pnl,
            pnl_pct: position.unrealized_pnl_pct,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}

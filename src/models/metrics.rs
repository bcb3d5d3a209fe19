//! Aggregate risk metrics derived from the position book and trade history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coarse account risk classification, worst triggered threshold wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Snapshot of account-level risk, recomputed on demand each cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub total_balance: Decimal,
    pub available_balance: Decimal,
    /// Sum of quantity x current price over open positions.
    pub total_exposure: Decimal,
    /// Running maximum fractional decline from the peak balance.
    pub max_drawdown: f64,
    pub daily_pnl: Decimal,
    pub daily_trades: u32,
    /// Winning closed trades / closed trades; 0 with no closed trades.
    pub win_rate: f64,
    /// Simplified per-trade Sharpe: mean / sample stdev of trade return
    /// percentages. 0 below two closed trades or at zero deviation.
    pub sharpe_ratio: f64,
    pub risk_level: RiskLevel,
}

//! Position bookkeeping, sizing, and risk limit enforcement.

mod manager;

pub use manager::{ExitDecision, LimitDecision, RiskManager};

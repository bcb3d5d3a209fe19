//! Exchange gateway boundary: the trait the orchestrator trades through,
//! plus the registry that tracks connected venues.

mod market_data;
mod paper;

pub use market_data::MarketDataClient;
pub use paper::PaperExchange;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::ExchangeConfig;
use crate::error::BotError;
use crate::models::{Balance, Order, OrderSide, OrderType, PriceSeries, Ticker};

/// Venue capability consumed by the orchestrator.
///
/// Implementations wrap a real or simulated exchange; the core never touches
/// wire protocols directly.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    fn name(&self) -> &str;

    fn is_connected(&self) -> bool;

    /// Establish connectivity. `Ok(false)` means the venue refused cleanly;
    /// the caller decides whether that is fatal.
    async fn connect(&mut self) -> Result<bool>;

    async fn disconnect(&mut self);

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker>;

    /// Balances keyed by currency; a specific currency narrows the map.
    async fn get_balance(&self, currency: Option<&str>) -> Result<HashMap<String, Balance>>;

    async fn create_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> Result<Order>;

    async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<bool>;

    async fn get_order(&self, order_id: &str, symbol: &str) -> Result<Order>;

    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>>;

    async fn get_order_history(&self, symbol: Option<&str>, limit: usize) -> Result<Vec<Order>>;

    /// Candle history, oldest first.
    async fn get_klines(&self, symbol: &str, interval: &str, limit: usize) -> Result<PriceSeries>;
}

/// Registry of gateways with one marked active for trading.
#[derive(Default)]
pub struct ExchangeManager {
    exchanges: HashMap<String, Box<dyn ExchangeGateway>>,
    active: Option<String>,
}

impl ExchangeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gateway to the registry. The first registered gateway becomes
    /// the active one.
    pub fn register(&mut self, gateway: Box<dyn ExchangeGateway>) {
        let name = gateway.name().to_string();
        if self.active.is_none() {
            self.active = Some(name.clone());
        }
        self.exchanges.insert(name, gateway);
    }

    /// Build the configured gateway (when none was registered) and connect
    /// everything. Fails when no gateway ends up connected, which is fatal
    /// to startup.
    pub async fn initialize(&mut self, config: &ExchangeConfig) -> Result<()> {
        if self.exchanges.is_empty() {
            let gateway = PaperExchange::new(config)?;
            self.register(Box::new(gateway));
        }
        self.connect_all().await
    }

    async fn connect_all(&mut self) -> Result<()> {
        let mut connected_any = false;

        for (name, gateway) in self.exchanges.iter_mut() {
            match gateway.connect().await {
                Ok(true) => {
                    info!(exchange = %name, "exchange connected");
                    connected_any = true;
                }
                Ok(false) => {
                    warn!(exchange = %name, "exchange refused connection");
                }
                Err(e) => {
                    warn!(exchange = %name, error = %e, "exchange connection failed");
                }
            }
        }

        if !connected_any {
            return Err(BotError::NotConnected("no exchange available".to_string()).into());
        }

        // Re-point the active slot when its gateway failed to come up
        let active_is_connected = self
            .active
            .as_ref()
            .and_then(|name| self.exchanges.get(name))
            .is_some_and(|gateway| gateway.is_connected());
        if !active_is_connected {
            self.active = self
                .exchanges
                .iter()
                .find(|(_, gateway)| gateway.is_connected())
                .map(|(name, _)| name.clone());
        }

        Ok(())
    }

    /// The gateway orders are routed to, if any is connected.
    pub fn active(&self) -> Option<&dyn ExchangeGateway> {
        self.active
            .as_ref()
            .and_then(|name| self.exchanges.get(name))
            .filter(|gateway| gateway.is_connected())
            .map(|boxed| boxed.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn ExchangeGateway> {
        self.exchanges.get(name).map(|boxed| boxed.as_ref())
    }

    pub async fn disconnect_all(&mut self) {
        for (name, gateway) in self.exchanges.iter_mut() {
            gateway.disconnect().await;
            info!(exchange = %name, "exchange disconnected");
        }
    }
}

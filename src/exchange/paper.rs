//! Simulated exchange gateway: live public market data, local order ledger.
//!
//! Orders are acknowledged immediately and treated as filled at their limit
//! price (market orders fill at the last traded price), mirroring how the
//! orchestrator books positions on acknowledgment. Short sales are allowed to
//! drive the base balance negative, a stand-in for margin.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ExchangeConfig;
use crate::error::BotError;
use crate::models::{Balance, Order, OrderSide, OrderStatus, OrderType, PriceSeries, Ticker};

use super::{ExchangeGateway, MarketDataClient};

/// Simulated taker fee charged on every fill.
const FEE_RATE: Decimal = dec!(0.001);

/// Paper-trading gateway over a public market-data endpoint.
pub struct PaperExchange {
    name: String,
    data: MarketDataClient,
    connected: bool,
    balances: RwLock<HashMap<String, Balance>>,
    orders: RwLock<Vec<Order>>,
}

impl PaperExchange {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let data = MarketDataClient::new(config.market_data_url.clone())?;

        let mut balances = HashMap::new();
        balances.insert(
            config.quote_currency.clone(),
            Balance {
                currency: config.quote_currency.clone(),
                free: config.paper_balance,
                used: Decimal::ZERO,
                total: config.paper_balance,
            },
        );

        Ok(Self {
            name: config.name.clone(),
            data,
            connected: false,
            balances: RwLock::new(balances),
            orders: RwLock::new(Vec::new()),
        })
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(BotError::NotConnected(self.name.clone()).into())
        }
    }

    fn split_symbol(symbol: &str) -> Result<(&str, &str)> {
        symbol
            .split_once('/')
            .with_context(|| format!("malformed symbol `{symbol}`, expected BASE/QUOTE"))
    }

    /// Apply a fill to the balance ledger. Returns false when a buy lacks
    /// quote funds; sells always settle.
    async fn settle(
        &self,
        base: &str,
        quote: &str,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
    ) -> bool {
        let notional = amount * price;
        let fee = notional * FEE_RATE;
        let mut balances = self.balances.write().await;

        match side {
            OrderSide::Buy => {
                let quote_balance = balances.entry(quote.to_string()).or_insert_with(|| {
                    Balance {
                        currency: quote.to_string(),
                        free: Decimal::ZERO,
                        used: Decimal::ZERO,
                        total: Decimal::ZERO,
                    }
                });
                if quote_balance.free < notional + fee {
                    return false;
                }
                quote_balance.free -= notional + fee;
                quote_balance.total -= notional + fee;

                let base_balance =
                    balances
                        .entry(base.to_string())
                        .or_insert_with(|| Balance {
                            currency: base.to_string(),
                            free: Decimal::ZERO,
                            used: Decimal::ZERO,
                            total: Decimal::ZERO,
                        });
                base_balance.free += amount;
                base_balance.total += amount;
            }
            OrderSide::Sell => {
                let base_balance =
                    balances
                        .entry(base.to_string())
                        .or_insert_with(|| Balance {
                            currency: base.to_string(),
                            free: Decimal::ZERO,
                            used: Decimal::ZERO,
                            total: Decimal::ZERO,
                        });
                base_balance.free -= amount;
                base_balance.total -= amount;

                let quote_balance = balances.entry(quote.to_string()).or_insert_with(|| {
                    Balance {
                        currency: quote.to_string(),
                        free: Decimal::ZERO,
                        used: Decimal::ZERO,
                        total: Decimal::ZERO,
                    }
                });
                quote_balance.free += notional - fee;
                quote_balance.total += notional - fee;
            }
        }

        true
    }
}

#[async_trait]
impl ExchangeGateway for PaperExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<bool> {
        match self.data.ping().await {
            Ok(()) => {
                self.connected = true;
                Ok(true)
            }
            Err(e) => {
                warn!(exchange = %self.name, error = %e, "market data endpoint unreachable");
                Ok(false)
            }
        }
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        self.ensure_connected()?;
        self.data.get_ticker(symbol).await
    }

    async fn get_balance(&self, currency: Option<&str>) -> Result<HashMap<String, Balance>> {
        let balances = self.balances.read().await;
        let filtered = balances
            .iter()
            .filter(|(name, _)| currency.map_or(true, |c| c == name.as_str()))
            .map(|(name, balance)| (name.clone(), balance.clone()))
            .collect();
        Ok(filtered)
    }

    async fn create_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> Result<Order> {
        self.ensure_connected()?;
        let (base, quote) = Self::split_symbol(symbol)?;

        let (fill_price, status) = match order_type {
            OrderType::Limit | OrderType::StopLimit => {
                let price = price.context("limit order requires a price")?;
                (price, OrderStatus::Open)
            }
            OrderType::Market | OrderType::Stop => {
                let ticker = self.data.get_ticker(symbol).await?;
                (ticker.last, OrderStatus::Closed)
            }
        };

        let settled = self.settle(base, quote, side, amount, fill_price).await;
        let status = if settled {
            status
        } else {
            warn!(symbol, side = side.as_str(), "insufficient funds, order rejected");
            OrderStatus::Rejected
        };

        let notional = amount * fill_price;
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side,
            order_type,
            amount,
            price: Some(fill_price),
            status,
            filled: if status.is_accepted() { amount } else { Decimal::ZERO },
            remaining: if status.is_accepted() { Decimal::ZERO } else { amount },
            timestamp: Utc::now(),
            fee: status.is_accepted().then(|| notional * FEE_RATE),
        };

        if status.is_accepted() {
            info!(
                symbol,
                side = side.as_str(),
                amount = %amount,
                price = %fill_price,
                order_id = %order.id,
                "paper order acknowledged"
            );
        }

        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<bool> {
        let mut orders = self.orders.write().await;
        for order in orders.iter_mut() {
            if order.id == order_id && order.symbol == symbol && order.status == OrderStatus::Open
            {
                order.status = OrderStatus::Canceled;
                debug!(order_id, symbol, "paper order canceled");
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn get_order(&self, order_id: &str, symbol: &str) -> Result<Order> {
        let orders = self.orders.read().await;
        orders
            .iter()
            .find(|o| o.id == order_id && o.symbol == symbol)
            .cloned()
            .with_context(|| format!("unknown order {order_id} for {symbol}"))
    }

    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.status == OrderStatus::Open)
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .cloned()
            .collect())
    }

    async fn get_order_history(&self, symbol: Option<&str>, limit: usize) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .iter()
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .cloned()
            .collect();
        let start = matching.len().saturating_sub(limit);
        Ok(matching[start..].to_vec())
    }

    async fn get_klines(&self, symbol: &str, interval: &str, limit: usize) -> Result<PriceSeries> {
        self.ensure_connected()?;
        self.data.get_klines(symbol, interval, limit).await
    }
}

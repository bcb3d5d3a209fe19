//! Bot runner: the periodic decision cycle and its state machine.
//!
//! Each cycle, in order: refresh prices of open positions, evaluate exits,
//! evaluate entries through the active strategy, then recompute and log risk
//! metrics. A failure in one symbol's step is logged and that symbol skipped;
//! it never aborts the remaining steps or symbols.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::BotError;
use crate::exchange::{ExchangeGateway, ExchangeManager};
use crate::models::{OrderSide, OrderType, PositionSide, SignalAction};
use crate::risk::RiskManager;
use crate::strategy::StrategyManager;

/// Orchestrator lifecycle. `Running` is only entered once exchange and
/// strategy initialization both succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Main bot runner.
pub struct TradingBot {
    config: AppConfig,
    exchanges: ExchangeManager,
    strategies: StrategyManager,
    risk: RiskManager,
    state: BotState,
    shutdown: Arc<AtomicBool>,
    /// Run-lock: at most one decision cycle in flight. A tick arriving while
    /// a cycle holds the lock is dropped, not queued.
    cycle_lock: Arc<Mutex<()>>,
}

impl TradingBot {
    pub fn new(config: AppConfig) -> Self {
        let risk = RiskManager::new(config.risk_management.clone());
        Self {
            config,
            exchanges: ExchangeManager::new(),
            strategies: StrategyManager::new(),
            risk,
            state: BotState::Idle,
            shutdown: Arc::new(AtomicBool::new(false)),
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Build a bot over a pre-registered gateway instead of the configured
    /// one.
    pub fn with_gateway(config: AppConfig, gateway: Box<dyn ExchangeGateway>) -> Self {
        let mut bot = Self::new(config);
        bot.exchanges.register(gateway);
        bot
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn risk(&self) -> &RiskManager {
        &self.risk
    }

    /// Connect the gateway, build the configured strategy, and sync the
    /// account balance. Any failure here leaves the bot in `Idle` and is
    /// fatal to startup.
    pub async fn initialize(&mut self) -> Result<()> {
        info!("initializing trading bot");

        self.exchanges
            .initialize(&self.config.exchange)
            .await
            .context("exchange initialization failed")?;

        self.strategies
            .initialize(&self.config.algorithm)
            .context("strategy initialization failed")?;

        self.sync_balance().await;

        info!(
            symbols = ?self.config.symbols,
            strategy = %self.config.algorithm.strategy,
            frequency_secs = self.config.trading.trading_frequency,
            trading_enabled = self.config.trading.enabled,
            "trading bot initialized"
        );
        Ok(())
    }

    /// Initialize and run until a shutdown signal arrives, then wind down.
    pub async fn start(&mut self) -> Result<()> {
        self.initialize().await?;
        self.state = BotState::Running;
        info!("trading bot started");

        self.run_loop().await;
        self.stop().await;
        Ok(())
    }

    async fn run_loop(&mut self) {
        let mut ticker = interval(Duration::from_secs(self.config.trading.trading_frequency));
        // Never burst queued ticks after a long cycle
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.shutdown.load(Ordering::SeqCst) {
            tokio::select! {
                _ = ticker.tick() => self.tick_cycle().await,
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    self.shutdown.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    /// Run one cycle under the run-lock; skip the tick when a prior cycle
    /// is still in flight.
    async fn tick_cycle(&mut self) {
        let lock = self.cycle_lock.clone();
        let Ok(_guard) = lock.try_lock() else {
            warn!("previous cycle still in flight, skipping tick");
            return;
        };

        if let Err(e) = self.decision_cycle().await {
            error!(error = %e, "decision cycle failed");
        }
    }

    /// One pass of the decision sequence. The shutdown flag is checked
    /// between steps; there is no forced interruption mid-step.
    async fn decision_cycle(&mut self) -> Result<()> {
        debug!("decision cycle started");

        self.refresh_positions().await;
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.evaluate_exits().await;
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }

        if self.config.trading.enabled {
            self.evaluate_entries().await;
        } else {
            debug!("trading disabled, skipping entry evaluation");
        }

        self.log_status();
        Ok(())
    }

    /// Step 1: re-mark every open position at the latest traded price.
    async fn refresh_positions(&mut self) {
        let symbols = self.risk.open_symbols();
        let Some(exchange) = self.exchanges.active() else {
            return;
        };

        for symbol in symbols {
            match exchange.get_ticker(&symbol).await {
                Ok(ticker) => {
                    if let Err(e) = self.risk.mark_price(&symbol, ticker.last) {
                        warn!(symbol = %symbol, error = %e, "failed to mark position");
                    }
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "failed to refresh price");
                }
            }
        }
    }

    /// Step 2: close positions whose stop loss or profit target triggered.
    async fn evaluate_exits(&mut self) {
        for symbol in self.risk.open_symbols() {
            let decision = self.risk.should_close(&symbol);
            if !decision.should_close {
                continue;
            }

            info!(symbol = %symbol, reason = %decision.reason, "exit signal");
            if let Err(e) = self.close_position(&symbol, &decision.reason).await {
                error!(symbol = %symbol, error = %e, "failed to close position");
            }
        }
    }

    /// Step 3: evaluate the strategy on every symbol without a position and
    /// dispatch entry orders for actionable signals that clear risk checks.
    async fn evaluate_entries(&mut self) {
        for symbol in self.config.symbols.clone() {
            if self.risk.position(&symbol).is_some() {
                continue;
            }

            if let Err(e) = self.evaluate_entry(&symbol).await {
                error!(symbol = %symbol, error = %e, "entry evaluation failed");
            }
        }
    }

    async fn evaluate_entry(&mut self, symbol: &str) -> Result<()> {
        let Some(strategy) = self.strategies.active() else {
            return Ok(());
        };
        let Some(exchange) = self.exchanges.active() else {
            return Ok(());
        };

        let series = exchange
            .get_klines(
                symbol,
                &self.config.exchange.kline_interval,
                self.config.exchange.kline_limit,
            )
            .await?;

        let signal = strategy.generate_signal(&series);
        if !signal.is_actionable() {
            debug!(symbol, reason = %signal.reason, "holding");
            return Ok(());
        }

        info!(
            symbol,
            action = ?signal.action,
            strength = signal.strength,
            reason = %signal.reason,
            "trading signal"
        );

        let side = if signal.action == SignalAction::Buy {
            PositionSide::Long
        } else {
            PositionSide::Short
        };
        let reference_price =
            Decimal::try_from(signal.price).context("signal price is not representable")?;

        let decision = self
            .risk
            .check_limits(symbol, side, Decimal::ZERO, reference_price);
        if !decision.allowed {
            warn!(symbol, reason = %decision.reason, "entry blocked by risk limits");
            return Ok(());
        }

        let quantity = self
            .risk
            .size_position(symbol, reference_price, signal.strength);
        if quantity <= Decimal::ZERO {
            warn!(symbol, "position size below minimum, skipping entry");
            return Ok(());
        }

        // Limit price 0.1% through the touch in the signal's direction
        let (order_side, order_price) = match side {
            PositionSide::Long => (OrderSide::Buy, reference_price * dec!(0.999)),
            PositionSide::Short => (OrderSide::Sell, reference_price * dec!(1.001)),
        };

        let order = exchange
            .create_order(symbol, order_side, OrderType::Limit, quantity, Some(order_price))
            .await?;

        if !order.status.is_accepted() {
            return Err(BotError::OrderRejected {
                symbol: symbol.to_string(),
                status: order.status,
            }
            .into());
        }

        self.risk.open_position(symbol, side, quantity, order_price)?;
        info!(
            symbol,
            side = side.as_str(),
            quantity = %quantity,
            price = %order_price,
            "entry order placed"
        );
        Ok(())
    }

    /// Submit a closing limit order priced to bias for a fill and, on
    /// acknowledgment, seal the position into the trade history.
    async fn close_position(&mut self, symbol: &str, reason: &str) -> Result<()> {
        let position = self
            .risk
            .position(symbol)
            .ok_or_else(|| BotError::PositionNotFound(symbol.to_string()))?
            .clone();

        let Some(exchange) = self.exchanges.active() else {
            return Err(BotError::NotConnected("no active exchange".to_string()).into());
        };

        let ticker = exchange.get_ticker(symbol).await?;
        let (order_side, order_price) = match position.side {
            PositionSide::Long => (OrderSide::Sell, ticker.ask * dec!(0.999)),
            PositionSide::Short => (OrderSide::Buy, ticker.bid * dec!(1.001)),
        };

        let order = exchange
            .create_order(
                symbol,
                order_side,
                OrderType::Limit,
                position.quantity,
                Some(order_price),
            )
            .await?;

        if !order.status.is_accepted() {
            return Err(BotError::OrderRejected {
                symbol: symbol.to_string(),
                status: order.status,
            }
            .into());
        }

        let record = self.risk.close_position(symbol)?;
        info!(
            symbol,
            reason,
            pnl = %record.pnl,
            pnl_pct = %(record.pnl_pct * Decimal::from(100)),
            "position closed"
        );
        Ok(())
    }

    /// Step 4: recompute metrics and log the cycle summary.
    fn log_status(&mut self) {
        let metrics = self.risk.compute_metrics();
        info!(
            risk_level = metrics.risk_level.as_str(),
            max_drawdown = format!("{:.2}%", metrics.max_drawdown * 100.0),
            daily_trades = metrics.daily_trades,
            daily_pnl = %metrics.daily_pnl,
            win_rate = format!("{:.1}%", metrics.win_rate * 100.0),
            total_exposure = %metrics.total_exposure,
            open_positions = self.risk.positions().len(),
            "cycle status"
        );

        for (symbol, position) in self.risk.positions() {
            info!(
                symbol = %symbol,
                side = position.side.as_str(),
                quantity = %position.quantity,
                entry = %position.entry_price,
                current = %position.current_price,
                pnl_pct = %(position.unrealized_pnl_pct * Decimal::from(100)),
                "open position"
            );
        }
    }

    /// Risk-checked manual entry. Market order when no price is given.
    /// Returns whether a position was opened.
    pub async fn manual_trade(
        &mut self,
        symbol: &str,
        side: PositionSide,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<bool> {
        let decision = self
            .risk
            .check_limits(symbol, side, quantity, price.unwrap_or_default());
        if !decision.allowed {
            warn!(symbol, reason = %decision.reason, "manual trade blocked by risk limits");
            return Ok(false);
        }

        let Some(exchange) = self.exchanges.active() else {
            return Err(BotError::NotConnected("no active exchange".to_string()).into());
        };

        let order_side = match side {
            PositionSide::Long => OrderSide::Buy,
            PositionSide::Short => OrderSide::Sell,
        };
        let order_type = if price.is_some() {
            OrderType::Limit
        } else {
            OrderType::Market
        };

        let order = exchange
            .create_order(symbol, order_side, order_type, quantity, price)
            .await?;

        if !order.status.is_accepted() {
            warn!(symbol, status = ?order.status, "manual trade order not accepted");
            return Ok(false);
        }

        let entry_price = price
            .or(order.price)
            .context("order acknowledged without a price")?;
        self.risk.open_position(symbol, side, quantity, entry_price)?;
        info!(symbol, side = side.as_str(), quantity = %quantity, "manual trade executed");
        Ok(true)
    }

    /// Shutdown sequence: force-close remaining positions best-effort, then
    /// release exchange connections.
    pub async fn stop(&mut self) {
        if self.state == BotState::Stopped {
            return;
        }
        self.state = BotState::Stopping;
        info!("stopping trading bot");

        self.close_all_positions().await;
        self.exchanges.disconnect_all().await;

        self.state = BotState::Stopped;
        info!("trading bot stopped");
    }

    async fn close_all_positions(&mut self) {
        for symbol in self.risk.open_symbols() {
            if let Err(e) = self.close_position(&symbol, "bot shutdown").await {
                error!(symbol = %symbol, error = %e, "forced close failed");
            }
        }
    }

    /// Connectivity self-test: fetch a ticker and the quote balance, then
    /// disconnect. Used by the `--test-connection` CLI mode.
    pub async fn test_connection(&mut self) -> Result<()> {
        self.exchanges
            .initialize(&self.config.exchange)
            .await
            .context("exchange initialization failed")?;

        let exchange = self
            .exchanges
            .active()
            .ok_or_else(|| BotError::NotConnected("no active exchange".to_string()))?;

        let symbol = self
            .config
            .symbols
            .first()
            .cloned()
            .unwrap_or_else(|| "BTC/USDT".to_string());

        let ticker = exchange.get_ticker(&symbol).await?;
        info!(symbol = %symbol, last = %ticker.last, "ticker fetched");

        let quote = &self.config.exchange.quote_currency;
        let balances = exchange.get_balance(Some(quote)).await?;
        match balances.get(quote.as_str()) {
            Some(balance) => info!(currency = %quote, free = %balance.free, "balance fetched"),
            None => info!(currency = %quote, "no balance entry"),
        }

        self.exchanges.disconnect_all().await;
        Ok(())
    }

    /// Seed the risk manager with the exchange-reported quote balance.
    /// Best-effort: on failure the configured starting balance stays in use.
    async fn sync_balance(&mut self) {
        let quote = self.config.exchange.quote_currency.clone();
        let Some(exchange) = self.exchanges.active() else {
            return;
        };

        match exchange.get_balance(Some(&quote)).await {
            Ok(balances) => {
                if let Some(balance) = balances.get(&quote) {
                    self.risk.set_account_balance(balance.total);
                    info!(currency = %quote, balance = %balance.total, "account balance synced");
                }
            }
            Err(e) => {
                warn!(error = %e, "balance sync failed, using configured balance");
            }
        }
    }
}

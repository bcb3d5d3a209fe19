//! Automated crypto trading bot.
//!
//! Generates buy/sell/hold signals from technical indicators, sizes positions
//! under risk constraints, and drives order lifecycle through an exchange
//! gateway on a periodic decision cycle.

mod bot;
mod config;
mod error;
mod exchange;
mod indicators;
mod models;
mod risk;
mod strategy;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bot::TradingBot;
use crate::config::AppConfig;
use crate::strategy::available_strategies;

/// Automated crypto trading bot CLI.
#[derive(Parser)]
#[command(name = "cryptobot")]
#[command(about = "Indicator-driven crypto trading with risk-managed position sizing", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Trade a single symbol, overriding the configured list (e.g. BTC/USDT)
    #[arg(long)]
    symbol: Option<String>,

    /// Strategy override (rsi_macd, bollinger, moving_average)
    #[arg(long)]
    strategy: Option<String>,

    /// Evaluate and log signals without submitting entry orders
    #[arg(long)]
    dry_run: bool,

    /// Test exchange connectivity and exit
    #[arg(long)]
    test_connection: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = AppConfig::load_or_default(&cli.config)?;

    if let Some(symbol) = cli.symbol {
        info!(symbol = %symbol, "symbol override");
        config.symbols = vec![symbol];
    }

    if let Some(strategy) = cli.strategy {
        if !available_strategies().contains(&strategy.as_str()) {
            anyhow::bail!(
                "unknown strategy `{strategy}` (expected one of {:?})",
                available_strategies()
            );
        }
        info!(strategy = %strategy, "strategy override");
        config.algorithm.strategy = strategy;
    }

    if cli.dry_run {
        info!("dry run mode: entry orders disabled");
        config.trading.enabled = false;
    }

    log_config_summary(&config);

    let mut bot = TradingBot::new(config);

    if cli.test_connection {
        bot.test_connection().await?;
        println!("Connection test passed.");
        return Ok(());
    }

    // Initialization failures propagate out of start() and exit non-zero
    bot.start().await?;

    info!(
        closed_trades = bot.risk().trade_history().len(),
        "session complete"
    );
    Ok(())
}

fn log_config_summary(config: &AppConfig) {
    info!(
        symbols = ?config.symbols,
        strategy = %config.algorithm.strategy,
        frequency_secs = config.trading.trading_frequency,
        trading_enabled = config.trading.enabled,
        profit_target = %(config.risk_management.profit_target * Decimal::from(100)),
        stop_loss = %(config.risk_management.stop_loss * Decimal::from(100)),
        max_position = %config.risk_management.max_position_size,
        "configuration loaded"
    );
}

//! Trade Executor Binary
//!
//! Places one order, quote lookup or balance query against Alpaca.
//!
//! # Usage
//!
//! ```bash
//! trade-executor buy AAPL 2
//! trade-executor sell AAPL 2
//! trade-executor quote AAPL [2024-03-01T15:30:00Z]
//! trade-executor balance
//! ```
//!
//! # Environment Variables
//!
//! ## Required (unless set in config.yaml)
//! - `ALPACA_KEY` / `API_KEY`: Broker API key
//! - `ALPACA_SECRET` / `SECRET_ALPACA_KEY`: Broker API secret
//!
//! ## Optional
//! - `TRADE_EXECUTOR_CONFIG`: Path to a YAML config file
//! - `TRADER_ENV`: paper | live (default: paper, or inferred from `BASE_URL`)
//! - `BASE_URL`: Trading API base URL
//! - `TRADE_STORE_PATH`: JSON trade store (default: ./data/trades.json)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::{Context, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use trade_executor::config::load_config_or_env;
use trade_executor::telemetry::init_tracing;
use trade_executor::{
    AlpacaBrokerAdapter, ExecuteSignalUseCase, JsonFileTradeStore, OrderExecutor, Symbol,
    Timestamp, TradeSignal,
};

/// One invocation of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Buy { symbol: Symbol, quantity: Decimal },
    Sell { symbol: Symbol, quantity: Decimal },
    Quote { symbol: Symbol, as_of: Option<Timestamp> },
    Balance,
}

impl Command {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let args: Vec<String> = args.into_iter().collect();
        let arg = |i: usize| args.get(i).map(String::as_str);

        match (arg(0), arg(1), arg(2)) {
            (Some(side @ ("buy" | "sell")), Some(symbol), Some(qty)) if args.len() == 3 => {
                let symbol = Symbol::new(symbol);
                let quantity: Decimal = qty
                    .parse()
                    .with_context(|| format!("invalid quantity '{qty}'"))?;
                Ok(if side == "buy" {
                    Self::Buy { symbol, quantity }
                } else {
                    Self::Sell { symbol, quantity }
                })
            }
            (Some("quote"), Some(symbol), as_of) if args.len() <= 3 => {
                let as_of = as_of
                    .map(|t| Timestamp::parse(t).with_context(|| format!("invalid time '{t}'")))
                    .transpose()?;
                Ok(Self::Quote {
                    symbol: Symbol::new(symbol),
                    as_of,
                })
            }
            (Some("balance"), None, None) => Ok(Self::Balance),
            _ => bail!("usage: trade-executor <buy|sell> SYMBOL QTY | quote SYMBOL [AS_OF] | balance"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_ancestors();

    let command = Command::parse(std::env::args().skip(1))?;
    let config_path = std::env::var("TRADE_EXECUTOR_CONFIG").ok();
    let config = load_config_or_env(config_path.as_deref())?;
    init_tracing(&config.observability.logging)?;

    let alpaca = config.broker.to_alpaca_config()?;
    tracing::info!(
        environment = %alpaca.environment,
        trading_url = alpaca.trading_base_url(),
        store = %config.persistence.store_path,
        "Starting trade executor"
    );

    let adapter = Arc::new(AlpacaBrokerAdapter::new(alpaca)?);
    let executor = OrderExecutor::new(Arc::clone(&adapter), adapter)
        .with_poll_policy(config.execution.poll_policy())?;
    let store = Arc::new(JsonFileTradeStore::new(&config.persistence.store_path));
    let use_case = ExecuteSignalUseCase::new(executor, store);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    match command {
        Command::Buy { symbol, quantity } => {
            let record = use_case
                .execute_with_cancel(&TradeSignal::buy(symbol, quantity), &cancel)
                .await?;
            print_json(&record)?;
        }
        Command::Sell { symbol, quantity } => {
            let record = use_case
                .execute_with_cancel(&TradeSignal::sell(symbol, quantity), &cancel)
                .await?;
            print_json(&record)?;
        }
        Command::Quote { symbol, as_of } => {
            let quote = until_cancelled(&cancel, use_case.refresh_quote(&symbol, as_of)).await??;
            print_json(&quote)?;
        }
        Command::Balance => {
            let cash = until_cancelled(&cancel, use_case.executor().balance().cash()).await??;
            println!("{cash}");
        }
    }

    Ok(())
}

/// Run a read-only request, abandoning it on shutdown.
///
/// Order commands do not go through here: an in-flight order POST is left to
/// finish and polling observes the token instead.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = T>,
) -> anyhow::Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => bail!("interrupted"),
        value = request => Ok(value),
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM. Read-only requests are abandoned and
/// nothing new is submitted; a submitted order stays at the broker.
async fn cancel_on_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    token.cancel();
}

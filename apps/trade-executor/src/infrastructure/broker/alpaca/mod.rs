//! Alpaca Markets adapter.
//!
//! - Trading API: market IOC orders, order status, positions, cash
//! - Data API: latest trade and one-minute bars
//! - Retry with exponential backoff, never re-sending an accepted order
//! - PAPER vs LIVE environment with a warning on live submissions

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::AlpacaBrokerAdapter;
pub use config::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
pub use error::AlpacaError;

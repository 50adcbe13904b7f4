//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! The broker and market data ports are implemented by the Alpaca adapter;
//! the trade store port by the JSON file and in-memory stores.

mod broker_port;
mod market_data_port;
mod trade_store_port;

pub use broker_port::{BrokerError, BrokerPort, OrderAck, SubmitOrderRequest};
pub use market_data_port::{Bar, LatestTrade, MarketDataError, MarketDataPort};
pub use trade_store_port::{PercentTimeframe, StoreError, StoredTrade, TradeStorePort};

// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Trade Executor - Order Execution Core
//!
//! Turns buy/sell signals into immediate-or-cancel market orders, waits for
//! the broker to settle them and reports a normalized settlement record.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Value objects and policies with no I/O
//!   - `order_execution`: order status phases, settlement records, poll policy
//!   - `shared`: symbols, timestamps, order identifiers
//!
//! - **Application**: Use cases and ports
//!   - `ports`: `BrokerPort`, `MarketDataPort`, `TradeStorePort`
//!   - `use_cases`: `QuoteGateway`, `AccountBalance`, `OrderExecutor`, `ExecuteSignal`
//!   - `errors`: `SettlementError`
//!
//! - **Infrastructure**: Adapters
//!   - `broker`: Alpaca trading and market data adapter
//!   - `persistence`: in-memory and JSON file trade stores

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::order_execution::{
    InsufficientFunds, OrderPhase, OrderSide, OrderStatus, PollPolicy, Quote, SettlementOutcome,
    SettlementRecord, TerminalState, TradeSignal,
};
pub use domain::shared::{BrokerOrderId, ClientOrderId, DomainError, Symbol, Timestamp};

// Application re-exports
pub use application::ports::{
    BrokerError, BrokerPort, MarketDataError, MarketDataPort, StoreError, TradeStorePort,
};
pub use application::use_cases::{
    AccountBalance, ExecuteSignalError, ExecuteSignalUseCase, OrderExecutor, QuoteGateway,
};
pub use application::{SettlementError, SymbolLocks};

// Infrastructure re-exports
pub use infrastructure::broker::alpaca::{
    AlpacaBrokerAdapter, AlpacaConfig, AlpacaEnvironment, AlpacaError,
};
pub use infrastructure::persistence::{InMemoryTradeStore, JsonFileTradeStore};

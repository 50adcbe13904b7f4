//! Broker Port (Driven Port)
//!
//! Interface for placing orders and reading account state at the brokerage.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus};
use crate::domain::shared::{BrokerOrderId, ClientOrderId, Symbol};

/// Request to submit an immediate-or-cancel market order.
///
/// Order type and time in force are fixed; the adapter renders them as
/// `market` / `ioc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Whole or fractional share quantity.
    pub quantity: Decimal,
}

impl SubmitOrderRequest {
    /// Create a market IOC order request with a fresh client order ID.
    #[must_use]
    pub fn market_ioc(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            client_order_id: ClientOrderId::generate(),
            symbol,
            side,
            quantity,
        }
    }
}

/// Order state as reported by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Broker-assigned order ID.
    pub broker_order_id: BrokerOrderId,
    /// Client order ID echoed back.
    pub client_order_id: ClientOrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Filled quantity so far.
    pub filled_qty: Decimal,
    /// Average fill price (if any).
    pub avg_fill_price: Option<Decimal>,
}

/// Broker port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// Connection error.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Credentials rejected.
    #[error("Broker authentication failed: {message}")]
    AuthenticationFailed {
        /// Error details.
        message: String,
    },

    /// Order rejected by broker.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The missing order ID.
        order_id: String,
    },

    /// Broker refused for lack of buying power.
    #[error("Insufficient buying power")]
    InsufficientFunds,

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

impl BrokerError {
    /// Returns true if the same call may succeed later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionError { .. } | Self::RateLimited)
    }
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Submit an order to the broker.
    async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, BrokerError>;

    /// Get order status.
    async fn get_order(&self, broker_order_id: &BrokerOrderId) -> Result<OrderAck, BrokerError>;

    /// Held quantity for a symbol; `None` when the broker reports no position.
    async fn get_position(&self, symbol: &Symbol) -> Result<Option<Decimal>, BrokerError>;

    /// Available cash on the account.
    async fn get_cash(&self) -> Result<Decimal, BrokerError>;
}

//! Settlement errors returned by the execution core.
//!
//! Canceled orders are not errors; they settle as `BuyFailed`/`SellFailed`.

use rust_decimal::Decimal;

use crate::application::ports::{BrokerError, MarketDataError};
use crate::domain::order_execution::value_objects::InsufficientFunds;
use crate::domain::shared::DomainError;

/// Why a buy, sell or quote did not produce a result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettlementError {
    /// Estimated cost exceeds available cash. Raised before submission.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(InsufficientFunds),

    /// No position held in the symbol. Raised before submission.
    #[error("No position in {symbol}")]
    PositionNotFound {
        /// Symbol to sell.
        symbol: String,
    },

    /// Position smaller than the sell quantity. Raised before submission.
    #[error("Insufficient shares of {symbol}: available {available}, requested {requested}")]
    InsufficientShares {
        /// Symbol to sell.
        symbol: String,
        /// Shares held.
        available: Decimal,
        /// Shares requested.
        requested: Decimal,
    },

    /// Malformed symbol or quantity.
    #[error("Invalid order request: {message}")]
    InvalidRequest {
        /// What was wrong.
        message: String,
    },

    /// No trade or bar available for the requested time.
    #[error("No market data for {symbol}")]
    NoData {
        /// Quoted symbol.
        symbol: String,
    },

    /// Broker or data API failure. Not retried by the core.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Order did not reach a terminal phase within the poll budget.
    #[error("Order {order_id} not terminal after {attempts} checks ({elapsed_ms} ms)")]
    Timeout {
        /// Broker order ID.
        order_id: String,
        /// Status checks made.
        attempts: u32,
        /// Time spent polling.
        elapsed_ms: u64,
    },

    /// Aborted by the caller before anything was submitted.
    #[error("Interrupted before the {symbol} order was submitted")]
    Interrupted {
        /// Symbol of the abandoned order.
        symbol: String,
    },

    /// Polling aborted by the caller. The order stays at the broker.
    #[error("Polling cancelled for order {order_id}")]
    Cancelled {
        /// Broker order ID.
        order_id: String,
    },
}

impl SettlementError {
    /// Returns true for errors raised before anything was submitted.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFunds(_)
                | Self::PositionNotFound { .. }
                | Self::InsufficientShares { .. }
                | Self::InvalidRequest { .. }
        )
    }

    /// Returns true if the caller may retry the whole operation.
    ///
    /// `Timeout` and `Cancelled` are excluded: the order may still fill.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Broker(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl From<InsufficientFunds> for SettlementError {
    fn from(value: InsufficientFunds) -> Self {
        Self::InsufficientFunds(value)
    }
}

impl From<DomainError> for SettlementError {
    fn from(err: DomainError) -> Self {
        Self::InvalidRequest {
            message: err.to_string(),
        }
    }
}

impl From<MarketDataError> for SettlementError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::SymbolNotFound { symbol } => Self::NoData { symbol },
            MarketDataError::ConnectionError { message } => {
                Self::Broker(BrokerError::ConnectionError { message })
            }
            MarketDataError::AuthenticationFailed => {
                Self::Broker(BrokerError::AuthenticationFailed {
                    message: "market data credentials rejected".to_string(),
                })
            }
            MarketDataError::RateLimited { .. } => Self::Broker(BrokerError::RateLimited),
            MarketDataError::DataUnavailable { message } | MarketDataError::ApiError { message } => {
                Self::Broker(BrokerError::Unknown { message })
            }
        }
    }
}

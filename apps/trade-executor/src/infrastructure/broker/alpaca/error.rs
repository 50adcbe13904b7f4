//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::{BrokerError, MarketDataError};

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone)]
pub enum AlpacaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Order was rejected (HTTP 422).
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Order refused for lack of buying power.
    #[error("Insufficient buying power: {0}")]
    InsufficientBuyingPower(String),

    /// Credentials missing or rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Network error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Well-formed JSON with an unusable field value.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Resource does not exist (HTTP 404).
    #[error("Not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },
}

impl From<AlpacaError> for BrokerError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(message)
            | AlpacaError::Network(message)
            | AlpacaError::JsonParse(message)
            | AlpacaError::InvalidResponse(message) => Self::ConnectionError { message },
            AlpacaError::Api { code, message } => Self::Unknown {
                message: format!("{code}: {message}"),
            },
            AlpacaError::OrderRejected(reason) => Self::OrderRejected { reason },
            AlpacaError::InsufficientBuyingPower(_) => Self::InsufficientFunds,
            AlpacaError::AuthenticationFailed(message) => Self::AuthenticationFailed { message },
            AlpacaError::RateLimited { .. } => Self::RateLimited,
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts"),
            },
            AlpacaError::NotFound { path } => Self::OrderNotFound { order_id: path },
        }
    }
}

impl From<AlpacaError> for MarketDataError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(message)
            | AlpacaError::Network(message)
            | AlpacaError::JsonParse(message) => Self::ConnectionError { message },
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts"),
            },
            AlpacaError::AuthenticationFailed(_) => Self::AuthenticationFailed,
            AlpacaError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            AlpacaError::NotFound { path } => Self::SymbolNotFound { symbol: path },
            AlpacaError::InvalidResponse(message) => Self::DataUnavailable { message },
            AlpacaError::Api { code, message } => Self::ApiError {
                message: format!("{code}: {message}"),
            },
            AlpacaError::OrderRejected(message) | AlpacaError::InsufficientBuyingPower(message) => {
                Self::ApiError { message }
            }
        }
    }
}

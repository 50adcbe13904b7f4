//! Trade Store Port (Driven Port)
//!
//! Interface for the flat, symbol-keyed store that keeps settled trades,
//! the last quote, stop-loss levels and rolling percent changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{SettlementOutcome, SettlementRecord};
use crate::domain::shared::Symbol;

/// One settled trade as kept by the store, keyed by its broker-format time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTrade {
    /// Fill or reference price.
    pub price: Decimal,
    /// Share quantity.
    pub amount: Decimal,
    /// Outcome wire name.
    #[serde(rename = "type")]
    pub outcome: SettlementOutcome,
}

impl From<&SettlementRecord> for StoredTrade {
    fn from(record: &SettlementRecord) -> Self {
        Self {
            price: record.price(),
            amount: record.quantity(),
            outcome: record.outcome(),
        }
    }
}

/// Window of a stored percent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PercentTimeframe {
    /// Last 24 hours.
    #[serde(rename = "24H")]
    Day,
    /// Last 7 days.
    #[serde(rename = "7D")]
    Week,
    /// Last 30 days.
    #[serde(rename = "30D")]
    Month,
}

impl PercentTimeframe {
    /// Store key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "24H",
            Self::Week => "7D",
            Self::Month => "30D",
        }
    }
}

impl fmt::Display for PercentTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PercentTimeframe {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "24H" => Ok(Self::Day),
            "7D" => Ok(Self::Week),
            "30D" => Ok(Self::Month),
            other => Err(StoreError::InvalidKey {
                key: other.to_string(),
            }),
        }
    }
}

/// Trade store error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Entry does not exist.
    #[error("{what} not found for {symbol}")]
    NotFound {
        /// Symbol looked up.
        symbol: String,
        /// Missing entry.
        what: String,
    },

    /// Unrecognized key.
    #[error("Invalid store key: {key}")]
    InvalidKey {
        /// The offending key.
        key: String,
    },

    /// Underlying file could not be read or written.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not valid.
    #[error("Store format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Port for trade persistence.
#[async_trait]
pub trait TradeStorePort: Send + Sync {
    /// Record a settled trade under its observation time.
    async fn store_trade(&self, record: &SettlementRecord) -> Result<(), StoreError>;

    /// Replace the last known price and volume, keeping percent changes.
    async fn store_quote(
        &self,
        symbol: &Symbol,
        price: Decimal,
        volume: Decimal,
    ) -> Result<(), StoreError>;

    /// Trades for a symbol ordered by time; empty when unknown.
    async fn get_trades(&self, symbol: &Symbol)
    -> Result<BTreeMap<String, StoredTrade>, StoreError>;

    /// Set a stop-loss level.
    async fn store_stop_loss(
        &self,
        symbol: &Symbol,
        price: Decimal,
        percentage: u32,
    ) -> Result<(), StoreError>;

    /// Remove a stop-loss level.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no level is stored at `price`.
    async fn remove_stop_loss(&self, symbol: &Symbol, price: Decimal) -> Result<(), StoreError>;

    /// Stop-loss levels keyed by price text; empty when unknown.
    async fn get_stop_loss(&self, symbol: &Symbol) -> Result<BTreeMap<String, u32>, StoreError>;

    /// Stored percent change for a window.
    async fn get_percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
    ) -> Result<Option<Decimal>, StoreError>;

    /// Set the percent change for a window.
    async fn update_percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
        percentage: Decimal,
    ) -> Result<(), StoreError>;
}

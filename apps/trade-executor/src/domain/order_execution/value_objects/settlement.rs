//! Settlement record: the normalized result of one buy or sell attempt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{Symbol, Timestamp};

use super::OrderSide;

/// Economic outcome of an order attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// Buy filled.
    #[serde(rename = "buy")]
    Bought,
    /// Sell filled.
    #[serde(rename = "sell")]
    Sold,
    /// Buy canceled by the broker.
    #[serde(rename = "failed_buy")]
    BuyFailed,
    /// Sell canceled by the broker.
    #[serde(rename = "failed_sell")]
    SellFailed,
}

impl SettlementOutcome {
    /// Side of the order this outcome belongs to.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        match self {
            Self::Bought | Self::BuyFailed => OrderSide::Buy,
            Self::Sold | Self::SellFailed => OrderSide::Sell,
        }
    }

    /// Returns true if the order executed.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        matches!(self, Self::Bought | Self::Sold)
    }

    /// Wire name used by the trade store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bought => "buy",
            Self::Sold => "sell",
            Self::BuyFailed => "failed_buy",
            Self::SellFailed => "failed_sell",
        }
    }
}

impl fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one order attempt, ready to hand to the trade store.
///
/// Only constructible through [`bought`](Self::bought),
/// [`buy_failed`](Self::buy_failed), [`sold`](Self::sold) and
/// [`sell_failed`](Self::sell_failed), so a record is never partial and
/// `cash` is present exactly for sell outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    symbol: Symbol,
    quantity: Decimal,
    price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cash: Option<Decimal>,
    #[serde(with = "broker_time")]
    timestamp: Timestamp,
    outcome: SettlementOutcome,
}

impl SettlementRecord {
    /// Buy filled at the broker's average fill price.
    #[must_use]
    pub fn bought(symbol: Symbol, quantity: Decimal, fill_price: Decimal) -> Self {
        Self::build(symbol, quantity, fill_price, SettlementOutcome::Bought)
    }

    /// Buy canceled; `reference_price` is the fallback quote.
    #[must_use]
    pub fn buy_failed(symbol: Symbol, quantity: Decimal, reference_price: Decimal) -> Self {
        Self::build(symbol, quantity, reference_price, SettlementOutcome::BuyFailed)
    }

    /// Sell filled; cash is `fill_price * quantity`.
    #[must_use]
    pub fn sold(symbol: Symbol, quantity: Decimal, fill_price: Decimal) -> Self {
        Self::build(symbol, quantity, fill_price, SettlementOutcome::Sold)
    }

    /// Sell canceled; cash is `reference_price * quantity`.
    #[must_use]
    pub fn sell_failed(symbol: Symbol, quantity: Decimal, reference_price: Decimal) -> Self {
        Self::build(symbol, quantity, reference_price, SettlementOutcome::SellFailed)
    }

    fn build(symbol: Symbol, quantity: Decimal, price: Decimal, outcome: SettlementOutcome) -> Self {
        let cash = match outcome.side() {
            OrderSide::Sell => Some(price * quantity),
            OrderSide::Buy => None,
        };

        Self {
            symbol,
            quantity,
            price,
            cash,
            timestamp: Timestamp::now(),
            outcome,
        }
    }

    /// Override the observation time.
    #[must_use]
    pub const fn observed_at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Traded symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Requested share quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Fill price, or the fallback quote for failed outcomes.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Proceeds of a sell (`price * quantity`); `None` for buys.
    #[must_use]
    pub const fn cash(&self) -> Option<Decimal> {
        self.cash
    }

    /// When the terminal status was observed (not the broker fill time).
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Outcome of the attempt.
    #[must_use]
    pub const fn outcome(&self) -> SettlementOutcome {
        self.outcome
    }
}

mod broker_time {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::domain::shared::Timestamp;

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_broker_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

//! Trade decision handed over by the prediction model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

use super::OrderSide;

/// "Buy/sell N shares of SYMBOL", with the model's score for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSignal {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Shares to trade.
    pub quantity: Decimal,
    /// Direction.
    pub side: OrderSide,
    /// Model confidence or predicted move, opaque to the executor.
    #[serde(default)]
    pub score: Option<Decimal>,
}

impl TradeSignal {
    /// Signal to buy `quantity` shares.
    #[must_use]
    pub fn buy(symbol: impl Into<Symbol>, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side: OrderSide::Buy,
            score: None,
        }
    }

    /// Signal to sell `quantity` shares.
    #[must_use]
    pub fn sell(symbol: impl Into<Symbol>, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side: OrderSide::Sell,
            score: None,
        }
    }

    /// Attach the model score.
    #[must_use]
    pub const fn with_score(mut self, score: Decimal) -> Self {
        self.score = Some(score);
        self
    }
}

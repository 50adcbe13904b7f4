//! Tradable price snapshot for a symbol.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Symbol, Timestamp};

/// Price and volume of a symbol at a point in time.
///
/// Built either from the latest trade (price, trade size, trade time) or
/// from a one-minute bar (close, bar volume, bar start time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted symbol.
    pub symbol: Symbol,
    /// Trade price or bar close.
    pub price: Decimal,
    /// Trade size or bar volume.
    pub volume: Decimal,
    /// Trade time or bar timestamp.
    pub timestamp: Timestamp,
}

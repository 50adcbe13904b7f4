//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.

mod identifiers;
mod symbol;
mod timestamp;

pub use identifiers::{BrokerOrderId, ClientOrderId};
pub use symbol::Symbol;
pub use timestamp::{BROKER_TIME_FORMAT, Timestamp};

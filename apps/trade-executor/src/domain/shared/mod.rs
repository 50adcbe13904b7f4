//! Shared Domain Types
//!
//! Value objects and errors shared across the domain.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{BROKER_TIME_FORMAT, BrokerOrderId, ClientOrderId, Symbol, Timestamp};

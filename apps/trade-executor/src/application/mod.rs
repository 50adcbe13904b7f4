//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for the broker, market data and trade store
//! - **Use Cases**: Quote lookup, balance, order execution, signal flow
//! - **Errors**: The settlement error taxonomy returned to callers

pub mod errors;
pub mod ports;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::SettlementError;
pub use ports::*;
pub use services::SymbolLocks;
pub use use_cases::*;

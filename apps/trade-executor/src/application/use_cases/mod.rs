//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod account_balance;
mod execute_signal;
mod order_executor;
mod quote_gateway;

pub use account_balance::AccountBalance;
pub use execute_signal::{ExecuteSignalError, ExecuteSignalUseCase};
pub use order_executor::OrderExecutor;
pub use quote_gateway::QuoteGateway;

//! Order Execution Value Objects

mod insufficient_funds;
mod order_side;
mod order_status;
mod quote;
mod settlement;
mod trade_signal;

pub use insufficient_funds::InsufficientFunds;
pub use order_side::OrderSide;
pub use order_status::{OrderPhase, OrderStatus, TerminalState};
pub use quote::Quote;
pub use settlement::{SettlementOutcome, SettlementRecord};
pub use trade_signal::TradeSignal;

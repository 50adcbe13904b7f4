//! Order Execution Bounded Context
//!
//! Turns a buy/sell decision into a settled outcome.
//!
//! # Key Concepts
//!
//! - **Order phase**: broker statuses collapse into `Terminal(Filled | Canceled)` or `Pending`
//! - **Poll policy**: bounded attempts and deadline for waiting on a terminal phase
//! - **Settlement record**: the normalized, always-complete result of an attempt

pub mod services;
pub mod value_objects;

pub use services::{PollPolicy, PollSchedule};
pub use value_objects::{
    InsufficientFunds, OrderPhase, OrderSide, OrderStatus, Quote, SettlementOutcome,
    SettlementRecord, TerminalState, TradeSignal,
};

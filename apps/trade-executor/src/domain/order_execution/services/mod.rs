//! Order Execution Domain Services
//!
//! Stateless business logic that doesn't fit in value objects.

mod poll_policy;

pub use poll_policy::{PollPolicy, PollSchedule};

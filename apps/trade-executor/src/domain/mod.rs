//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless business logic
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Order phases, settlement records, poll policy
//! - [`shared`]: Symbols, timestamps, identifiers, domain errors

pub mod order_execution;
pub mod shared;

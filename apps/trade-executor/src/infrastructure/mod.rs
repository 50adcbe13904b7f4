//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - `broker/`: Alpaca REST adapter for the broker and market data ports
//! - `persistence/`: Trade store adapters (JSON file, in-memory)

pub mod broker;
pub mod persistence;

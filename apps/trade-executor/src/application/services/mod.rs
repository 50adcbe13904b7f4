//! Application Services
//!
//! Shared coordination state used by the use cases.

mod symbol_locks;

pub use symbol_locks::SymbolLocks;

//! Persistence Adapters
//!
//! Implementations of the trade store port. Both keep the same keyed
//! document layout; the file store persists it as JSON.

mod document;
pub mod in_memory;
pub mod json_file;

pub use document::StoreDocument;
pub use in_memory::InMemoryTradeStore;
pub use json_file::JsonFileTradeStore;

//! Per-symbol serialization of the precheck-to-settlement sequence.
//!
//! Two buys of the same symbol must not both pass the funds precheck
//! against one balance, so each symbol gets its own async mutex. Different
//! symbols never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::shared::Symbol;

/// Lock table keyed by symbol. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct SymbolLocks {
    locks: Arc<Mutex<HashMap<Symbol, Arc<AsyncMutex<()>>>>>,
}

impl SymbolLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `symbol`. Released when the guard drops.
    pub async fn acquire(&self, symbol: &Symbol) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(symbol.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of symbols seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no symbol has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

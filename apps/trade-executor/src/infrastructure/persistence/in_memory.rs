//! In-memory trade store for testing.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::document::StoreDocument;
use crate::application::ports::{PercentTimeframe, StoreError, StoredTrade, TradeStorePort};
use crate::domain::order_execution::value_objects::SettlementRecord;
use crate::domain::shared::Symbol;

/// In-memory implementation of `TradeStorePort`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryTradeStore {
    document: RwLock<StoreDocument>,
}

impl InMemoryTradeStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored price and volume for a symbol.
    #[must_use]
    pub fn info(&self, symbol: &Symbol) -> Option<(Decimal, Decimal)> {
        self.read(|doc| doc.quote(symbol))
    }

    /// Clear the store.
    pub fn clear(&self) {
        self.write(|doc| *doc = StoreDocument::default());
    }

    /// Copy of the whole document.
    #[must_use]
    pub fn snapshot(&self) -> StoreDocument {
        self.read(Clone::clone)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> T {
        let doc = self.document.read().unwrap_or_else(PoisonError::into_inner);
        f(&doc)
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> T {
        let mut doc = self
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut doc)
    }
}

#[async_trait]
impl TradeStorePort for InMemoryTradeStore {
    async fn store_trade(&self, record: &SettlementRecord) -> Result<(), StoreError> {
        self.write(|doc| doc.insert_trade(record));
        Ok(())
    }

    async fn store_quote(
        &self,
        symbol: &Symbol,
        price: Decimal,
        volume: Decimal,
    ) -> Result<(), StoreError> {
        self.write(|doc| doc.set_quote(symbol, price, volume));
        Ok(())
    }

    async fn get_trades(
        &self,
        symbol: &Symbol,
    ) -> Result<BTreeMap<String, StoredTrade>, StoreError> {
        Ok(self.read(|doc| doc.trades(symbol)))
    }

    async fn store_stop_loss(
        &self,
        symbol: &Symbol,
        price: Decimal,
        percentage: u32,
    ) -> Result<(), StoreError> {
        self.write(|doc| doc.insert_stop_loss(symbol, price, percentage));
        Ok(())
    }

    async fn remove_stop_loss(&self, symbol: &Symbol, price: Decimal) -> Result<(), StoreError> {
        self.write(|doc| doc.remove_stop_loss(symbol, price))
    }

    async fn get_stop_loss(&self, symbol: &Symbol) -> Result<BTreeMap<String, u32>, StoreError> {
        Ok(self.read(|doc| doc.stop_losses(symbol)))
    }

    async fn get_percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
    ) -> Result<Option<Decimal>, StoreError> {
        Ok(self.read(|doc| doc.percent_increase(symbol, timeframe)))
    }

    async fn update_percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
        percentage: Decimal,
    ) -> Result<(), StoreError> {
        self.write(|doc| doc.set_percent_increase(symbol, timeframe, percentage));
        Ok(())
    }
}

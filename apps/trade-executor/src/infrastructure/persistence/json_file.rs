//! JSON file trade store.
//!
//! Every call reads the whole file, applies one change and writes it back.
//! Calls are serialized by an async mutex so concurrent settlements cannot
//! lose each other's writes. A missing file reads as an empty store.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::document::StoreDocument;
use crate::application::ports::{PercentTimeframe, StoreError, StoredTrade, TradeStorePort};
use crate::domain::order_execution::value_objects::SettlementRecord;
use crate::domain::shared::Symbol;

/// File-backed implementation of `TradeStorePort`.
#[derive(Debug)]
pub struct JsonFileTradeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileTradeStore {
    /// Store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreDocument, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreDocument::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a sibling temp file and rename, so readers never see a
    /// truncated document.
    async fn save(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> T + Send) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let doc = self.load().await?;
        Ok(f(&doc))
    }

    async fn modify<T>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Result<T, StoreError> + Send,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let value = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(value)
    }
}

#[async_trait]
impl TradeStorePort for JsonFileTradeStore {
    async fn store_trade(&self, record: &SettlementRecord) -> Result<(), StoreError> {
        self.modify(|doc| {
            doc.insert_trade(record);
            Ok(())
        })
        .await?;

        tracing::debug!(
            symbol = %record.symbol(),
            outcome = %record.outcome(),
            path = %self.path.display(),
            "Trade stored"
        );
        Ok(())
    }

    async fn store_quote(
        &self,
        symbol: &Symbol,
        price: Decimal,
        volume: Decimal,
    ) -> Result<(), StoreError> {
        self.modify(|doc| {
            doc.set_quote(symbol, price, volume);
            Ok(())
        })
        .await
    }

    async fn get_trades(
        &self,
        symbol: &Symbol,
    ) -> Result<BTreeMap<String, StoredTrade>, StoreError> {
        self.read(|doc| doc.trades(symbol)).await
    }

    async fn store_stop_loss(
        &self,
        symbol: &Symbol,
        price: Decimal,
        percentage: u32,
    ) -> Result<(), StoreError> {
        self.modify(|doc| {
            doc.insert_stop_loss(symbol, price, percentage);
            Ok(())
        })
        .await
    }

    async fn remove_stop_loss(&self, symbol: &Symbol, price: Decimal) -> Result<(), StoreError> {
        self.modify(|doc| doc.remove_stop_loss(symbol, price)).await
    }

    async fn get_stop_loss(&self, symbol: &Symbol) -> Result<BTreeMap<String, u32>, StoreError> {
        self.read(|doc| doc.stop_losses(symbol)).await
    }

    async fn get_percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
    ) -> Result<Option<Decimal>, StoreError> {
        self.read(|doc| doc.percent_increase(symbol, timeframe)).await
    }

    async fn update_percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
        percentage: Decimal,
    ) -> Result<(), StoreError> {
        self.modify(|doc| {
            doc.set_percent_increase(symbol, timeframe, percentage);
            Ok(())
        })
        .await
    }
}

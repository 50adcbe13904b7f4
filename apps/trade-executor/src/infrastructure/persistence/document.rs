//! In-memory shape of the keyed trade store.
//!
//! ```json
//! {
//!   "AAPL": {
//!     "info": { "price": "189.5", "volume": "100", "perc increase": { "24H": "1.2" } },
//!     "trades": { "2024-01-02T15:04:05Z": { "price": "59.8", "amount": "2", "type": "buy" } },
//!     "sell-at": { "55.5": 10 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{PercentTimeframe, StoreError, StoredTrade};
use crate::domain::order_execution::value_objects::SettlementRecord;
use crate::domain::shared::Symbol;

/// Whole store, keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreDocument {
    symbols: BTreeMap<String, SymbolEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SymbolEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    info: Option<SymbolInfo>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    trades: BTreeMap<String, StoredTrade>,
    #[serde(rename = "sell-at", default, skip_serializing_if = "BTreeMap::is_empty")]
    sell_at: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SymbolInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume: Option<Decimal>,
    #[serde(rename = "perc increase", default, skip_serializing_if = "BTreeMap::is_empty")]
    perc_increase: BTreeMap<String, Decimal>,
}

/// Stop-loss map key for a price.
fn price_key(price: Decimal) -> String {
    price.normalize().to_string()
}

/// Older files key whole-number prices as `"100.0"`.
fn legacy_price_key(price: Decimal) -> Option<String> {
    let price = price.normalize();
    (price.scale() == 0).then(|| format!("{price}.0"))
}

impl StoreDocument {
    fn entry(&mut self, symbol: &Symbol) -> &mut SymbolEntry {
        self.symbols.entry(symbol.to_string()).or_default()
    }

    fn get(&self, symbol: &Symbol) -> Option<&SymbolEntry> {
        self.symbols.get(symbol.as_str())
    }

    /// Record a settlement under its broker-format timestamp.
    pub fn insert_trade(&mut self, record: &SettlementRecord) {
        self.entry(record.symbol()).trades.insert(
            record.timestamp().to_broker_string(),
            StoredTrade::from(record),
        );
    }

    /// Replace price and volume, keeping stored percent changes.
    pub fn set_quote(&mut self, symbol: &Symbol, price: Decimal, volume: Decimal) {
        let info = self.entry(symbol).info.get_or_insert_with(SymbolInfo::default);
        info.price = Some(price);
        info.volume = Some(volume);
    }

    /// Last stored `(price, volume)`.
    pub fn quote(&self, symbol: &Symbol) -> Option<(Decimal, Decimal)> {
        let info = self.get(symbol)?.info.as_ref()?;
        Some((info.price?, info.volume?))
    }

    /// Trades for `symbol`, oldest first.
    pub fn trades(&self, symbol: &Symbol) -> BTreeMap<String, StoredTrade> {
        self.get(symbol)
            .map(|entry| entry.trades.clone())
            .unwrap_or_default()
    }

    /// Sell `percentage` of the position once `price` is reached.
    pub fn insert_stop_loss(&mut self, symbol: &Symbol, price: Decimal, percentage: u32) {
        let sell_at = &mut self.entry(symbol).sell_at;
        if let Some(legacy) = legacy_price_key(price) {
            sell_at.remove(&legacy);
        }
        sell_at.insert(price_key(price), percentage);
    }

    /// Remove the level at `price`; `NotFound` when absent.
    pub fn remove_stop_loss(&mut self, symbol: &Symbol, price: Decimal) -> Result<(), StoreError> {
        let key = price_key(price);
        let removed = self.symbols.get_mut(symbol.as_str()).and_then(|entry| {
            entry.sell_at.remove(&key).or_else(|| {
                legacy_price_key(price).and_then(|legacy| entry.sell_at.remove(&legacy))
            })
        });

        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                symbol: symbol.to_string(),
                what: format!("stop-loss at {key}"),
            }),
        }
    }

    /// Stop-loss levels as stored, including legacy `"100.0"` keys.
    pub fn stop_losses(&self, symbol: &Symbol) -> BTreeMap<String, u32> {
        self.get(symbol)
            .map(|entry| entry.sell_at.clone())
            .unwrap_or_default()
    }

    /// Stored percent change for one window.
    pub fn percent_increase(
        &self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
    ) -> Option<Decimal> {
        self.get(symbol)?
            .info
            .as_ref()?
            .perc_increase
            .get(timeframe.as_str())
            .copied()
    }

    /// Overwrite the percent change for one window.
    pub fn set_percent_increase(
        &mut self,
        symbol: &Symbol,
        timeframe: PercentTimeframe,
        percentage: Decimal,
    ) {
        self.entry(symbol)
            .info
            .get_or_insert_with(SymbolInfo::default)
            .perc_increase
            .insert(timeframe.as_str().to_string(), percentage);
    }
}

//! JSON trade store: on-disk layout and compatibility with existing files.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use trade_executor::application::ports::PercentTimeframe;
use trade_executor::{
    JsonFileTradeStore, SettlementOutcome, SettlementRecord, StoreError, Symbol, Timestamp,
    TradeStorePort,
};

fn existing_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("data.json");
    let legacy = json!({
        "AAPL": {
            "info": { "price": 189.5, "volume": 100, "perc increase": { "24H": 1.2 } },
            "trades": {
                "2024-01-02T15:04:05Z": { "price": 59.8, "amount": 2, "type": "buy" }
            },
            "sell-at": { "55.5": 10 }
        }
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&legacy).unwrap()).unwrap();
    path
}

fn read_raw(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn reads_numeric_values_from_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileTradeStore::new(existing_file(&dir));
    let aapl = Symbol::new("AAPL");

    let trades = assert_ok!(store.get_trades(&aapl).await);
    let trade = &trades["2024-01-02T15:04:05Z"];
    assert_eq!(trade.price, dec!(59.8));
    assert_eq!(trade.amount, dec!(2));
    assert_eq!(trade.outcome, SettlementOutcome::Bought);

    assert_eq!(
        assert_ok!(store.get_percent_increase(&aapl, PercentTimeframe::Day).await),
        Some(dec!(1.2))
    );
    assert_eq!(
        assert_ok!(store.get_percent_increase(&aapl, PercentTimeframe::Month).await),
        None
    );
    assert_eq!(assert_ok!(store.get_stop_loss(&aapl).await)["55.5"], 10);
}

#[tokio::test]
async fn updates_keep_the_rest_of_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = existing_file(&dir);
    let store = JsonFileTradeStore::new(&path);
    let aapl = Symbol::new("AAPL");

    let week: PercentTimeframe = "7d".parse().unwrap();
    assert_ok!(store.update_percent_increase(&aapl, week, dec!(3.5)).await);
    assert_ok!(store.store_quote(&aapl, dec!(190), dec!(250)).await);

    let raw = read_raw(&path);
    let info = &raw["AAPL"]["info"];
    assert_eq!(info["price"], "190");
    assert_eq!(info["volume"], "250");
    assert_eq!(info["perc increase"]["24H"], "1.2");
    assert_eq!(info["perc increase"]["7D"], "3.5");
    assert_eq!(raw["AAPL"]["trades"]["2024-01-02T15:04:05Z"]["type"], "buy");
    assert_eq!(raw["AAPL"]["sell-at"]["55.5"], 10);
}

#[tokio::test]
async fn stop_loss_keys_are_normalized_prices() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileTradeStore::new(existing_file(&dir));
    let aapl = Symbol::new("AAPL");

    assert_ok!(store.store_stop_loss(&aapl, dec!(50.00), 25).await);
    let levels = assert_ok!(store.get_stop_loss(&aapl).await);
    assert_eq!(levels["50"], 25);

    assert_ok!(store.remove_stop_loss(&aapl, dec!(55.50)).await);
    let err = assert_err!(store.remove_stop_loss(&aapl, dec!(55.5)).await);
    assert!(matches!(err, StoreError::NotFound { .. }));

    let levels = assert_ok!(store.get_stop_loss(&aapl).await);
    assert_eq!(levels.len(), 1);
}

#[tokio::test]
async fn whole_number_stop_loss_from_legacy_file_can_be_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, r#"{ "AAPL": { "sell-at": { "100.0": 5 } } }"#).unwrap();
    let store = JsonFileTradeStore::new(&path);
    let aapl = Symbol::new("AAPL");

    assert_ok!(store.remove_stop_loss(&aapl, dec!(100)).await);

    assert!(assert_ok!(store.get_stop_loss(&aapl).await).is_empty());
    assert!(read_raw(&path)["AAPL"].get("sell-at").is_none());
}

#[tokio::test]
async fn trades_are_keyed_by_broker_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = JsonFileTradeStore::new(&path);
    let at = Timestamp::parse("2024-03-01T15:30:00.750Z").unwrap();

    let record = SettlementRecord::sold(Symbol::new("msft"), dec!(3), dec!(410.1)).observed_at(at);
    assert_ok!(store.store_trade(&record).await);

    let raw = read_raw(&path);
    assert_eq!(
        raw["MSFT"]["trades"]["2024-03-01T15:30:00Z"],
        json!({ "price": "410.1", "amount": "3", "type": "sell" })
    );
}

#[tokio::test]
async fn concurrent_writes_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileTradeStore::new(dir.path().join("data.json")));

    let handles: Vec<_> = ["AAPL", "MSFT", "NVDA", "TSLA"]
        .into_iter()
        .enumerate()
        .map(|(i, symbol)| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .store_stop_loss(&Symbol::new(symbol), dec!(100), u32::try_from(i).unwrap())
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    for symbol in ["AAPL", "MSFT", "NVDA", "TSLA"] {
        let levels = assert_ok!(store.get_stop_loss(&Symbol::new(symbol)).await);
        assert!(levels.contains_key("100"), "{symbol} lost its stop-loss");
    }
}

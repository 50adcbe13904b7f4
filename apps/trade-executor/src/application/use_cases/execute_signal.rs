//! Execute Signal Use Case
//!
//! Routes a model's trade signal through the execution core and records the
//! settlement in the trade store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::errors::SettlementError;
use crate::application::ports::{BrokerPort, MarketDataPort, StoreError, TradeStorePort};
use crate::application::use_cases::OrderExecutor;
use crate::domain::order_execution::value_objects::{
    OrderSide, Quote, SettlementRecord, TradeSignal,
};
use crate::domain::shared::{Symbol, Timestamp};

/// Failure of the signal flow.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteSignalError {
    /// The order could not be placed or settled.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// The order settled but the record was not stored.
    #[error("Settled {symbol} but failed to store the trade: {source}")]
    Store {
        /// Traded symbol.
        symbol: String,
        /// Store failure.
        source: StoreError,
    },

    /// Quote lookup succeeded but could not be stored.
    #[error("Failed to store quote: {0}")]
    QuoteStore(StoreError),
}

/// Use case for acting on trade signals.
pub struct ExecuteSignalUseCase<B, M, S>
where
    B: BrokerPort,
    M: MarketDataPort,
    S: TradeStorePort,
{
    executor: OrderExecutor<B, M>,
    store: Arc<S>,
}

impl<B, M, S> ExecuteSignalUseCase<B, M, S>
where
    B: BrokerPort,
    M: MarketDataPort,
    S: TradeStorePort,
{
    /// Create a new ExecuteSignalUseCase.
    pub const fn new(executor: OrderExecutor<B, M>, store: Arc<S>) -> Self {
        Self { executor, store }
    }

    /// The underlying executor.
    pub const fn executor(&self) -> &OrderExecutor<B, M> {
        &self.executor
    }

    /// Execute a signal to completion.
    pub async fn execute(
        &self,
        signal: &TradeSignal,
    ) -> Result<SettlementRecord, ExecuteSignalError> {
        self.execute_with_cancel(signal, &CancellationToken::new())
            .await
    }

    /// Execute a signal; `cancel` aborts order polling.
    ///
    /// Canceled orders are stored like fills, with their failed outcome.
    pub async fn execute_with_cancel(
        &self,
        signal: &TradeSignal,
        cancel: &CancellationToken,
    ) -> Result<SettlementRecord, ExecuteSignalError> {
        tracing::info!(
            symbol = %signal.symbol,
            side = %signal.side,
            quantity = %signal.quantity,
            score = ?signal.score,
            "Executing trade signal"
        );

        let result = match signal.side {
            OrderSide::Buy => {
                self.executor
                    .buy_with_cancel(&signal.symbol, signal.quantity, cancel)
                    .await
            }
            OrderSide::Sell => {
                self.executor
                    .sell_with_cancel(&signal.symbol, signal.quantity, cancel)
                    .await
            }
        };

        let record = result.inspect_err(|e| log_failure(signal, e))?;

        self.store
            .store_trade(&record)
            .await
            .map_err(|source| {
                tracing::error!(
                    symbol = %signal.symbol,
                    outcome = %record.outcome(),
                    error = %source,
                    "Failed to store settled trade"
                );
                ExecuteSignalError::Store {
                    symbol: signal.symbol.to_string(),
                    source,
                }
            })?;

        Ok(record)
    }

    /// Quote `symbol` and keep the price and volume in the store.
    pub async fn refresh_quote(
        &self,
        symbol: &Symbol,
        as_of: Option<Timestamp>,
    ) -> Result<Quote, ExecuteSignalError> {
        let quote = self.executor.quotes().get_quote(symbol, as_of).await?;

        self.store
            .store_quote(symbol, quote.price, quote.volume)
            .await
            .map_err(ExecuteSignalError::QuoteStore)?;

        Ok(quote)
    }
}

fn log_failure(signal: &TradeSignal, error: &SettlementError) {
    match error {
        e if e.is_precondition() => tracing::warn!(
            symbol = %signal.symbol,
            side = %signal.side,
            error = %e,
            "Signal rejected before submission"
        ),
        SettlementError::NoData { .. } => tracing::warn!(
            symbol = %signal.symbol,
            side = %signal.side,
            error = %error,
            "No market data for signal"
        ),
        e => tracing::error!(
            symbol = %signal.symbol,
            side = %signal.side,
            error = %e,
            retryable = e.is_retryable(),
            "Signal execution failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{ScriptedBroker, StaticMarketData};
    use crate::domain::order_execution::value_objects::{OrderStatus, SettlementOutcome};
    use crate::infrastructure::persistence::InMemoryTradeStore;
    use rust_decimal_macros::dec;

    fn use_case(
        broker: ScriptedBroker,
    ) -> (
        ExecuteSignalUseCase<ScriptedBroker, StaticMarketData, InMemoryTradeStore>,
        Arc<InMemoryTradeStore>,
    ) {
        let executor = OrderExecutor::new(
            Arc::new(broker),
            Arc::new(StaticMarketData::new(dec!(60))),
        );
        let store = Arc::new(InMemoryTradeStore::new());
        (ExecuteSignalUseCase::new(executor, Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn buy_signal_is_settled_and_stored() {
        let broker = ScriptedBroker::new(dec!(1000)).with_fill_price(dec!(59.8));
        let (use_case, store) = use_case(broker);

        let record = use_case
            .execute(&TradeSignal::buy("AAPL", dec!(2)).with_score(dec!(0.82)))
            .await
            .unwrap();

        assert_eq!(record.outcome(), SettlementOutcome::Bought);
        let trades = store.get_trades(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(trades.len(), 1);
        let stored = trades.values().next().unwrap();
        assert_eq!(stored.price, dec!(59.8));
        assert_eq!(stored.amount, dec!(2));
    }

    #[tokio::test]
    async fn canceled_sell_is_stored_as_failed() {
        let broker = ScriptedBroker::new(dec!(0))
            .with_position("TSLA", dec!(2))
            .with_statuses(&[OrderStatus::Canceled]);
        let (use_case, store) = use_case(broker);

        let record = use_case
            .execute(&TradeSignal::sell("TSLA", dec!(2)))
            .await
            .unwrap();

        assert_eq!(record.outcome(), SettlementOutcome::SellFailed);
        let trades = store.get_trades(&Symbol::new("TSLA")).await.unwrap();
        assert_eq!(
            trades.values().next().unwrap().outcome,
            SettlementOutcome::SellFailed
        );
    }

    #[tokio::test]
    async fn precondition_failure_stores_nothing() {
        let (use_case, store) = use_case(ScriptedBroker::new(dec!(100)));

        let result = use_case.execute(&TradeSignal::buy("AAPL", dec!(2))).await;

        let Err(ExecuteSignalError::Settlement(err)) = result else {
            panic!("expected settlement error, got {result:?}");
        };
        assert!(err.is_precondition());
        assert!(store.get_trades(&Symbol::new("AAPL")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refresh_quote_stores_price_and_volume() {
        let (use_case, store) = use_case(ScriptedBroker::new(dec!(0)));

        let quote = use_case
            .refresh_quote(&Symbol::new("AAPL"), None)
            .await
            .unwrap();

        assert_eq!(quote.price, dec!(60));
        assert_eq!(
            store.info(&Symbol::new("AAPL")),
            Some((dec!(60), dec!(100)))
        );
    }
}

//! Order Execution Core
//!
//! Turns "buy/sell N shares of SYMBOL" into a settlement record:
//!
//! 1. Validate the request
//! 2. Precheck (cash for buys, position for sells) under the symbol lock
//! 3. Submit an immediate-or-cancel market order
//! 4. Poll until the order is filled or canceled, within the poll policy
//! 5. Normalize the outcome into a [`SettlementRecord`]
//!
//! Nothing is retried here. Broker errors, timeouts and cancellation are
//! returned to the caller as [`SettlementError`]s.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::errors::SettlementError;
use crate::application::ports::{BrokerPort, MarketDataPort, OrderAck, SubmitOrderRequest};
use crate::application::services::SymbolLocks;
use crate::application::use_cases::{AccountBalance, QuoteGateway};
use crate::domain::order_execution::services::PollPolicy;
use crate::domain::order_execution::value_objects::{
    InsufficientFunds, OrderPhase, OrderSide, SettlementRecord, TerminalState,
};
use crate::domain::shared::{DomainError, Symbol};

/// Executes market IOC orders and settles them.
///
/// Cloning is cheap; clones share the broker handle and the symbol locks.
pub struct OrderExecutor<B: BrokerPort, M: MarketDataPort> {
    broker: Arc<B>,
    quotes: QuoteGateway<M>,
    balance: AccountBalance<B>,
    poll_policy: PollPolicy,
    locks: SymbolLocks,
}

impl<B: BrokerPort, M: MarketDataPort> Clone for OrderExecutor<B, M> {
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
            quotes: self.quotes.clone(),
            balance: self.balance.clone(),
            poll_policy: self.poll_policy,
            locks: self.locks.clone(),
        }
    }
}

impl<B: BrokerPort, M: MarketDataPort> OrderExecutor<B, M> {
    /// Create an executor with the default poll policy.
    pub fn new(broker: Arc<B>, market_data: Arc<M>) -> Self {
        Self {
            balance: AccountBalance::new(Arc::clone(&broker)),
            quotes: QuoteGateway::new(market_data),
            broker,
            poll_policy: PollPolicy::default(),
            locks: SymbolLocks::new(),
        }
    }

    /// Replace the poll policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` if the policy cannot terminate.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Result<Self, DomainError> {
        policy.validate()?;
        self.poll_policy = policy;
        Ok(self)
    }

    /// Share a lock table with other executors.
    #[must_use]
    pub fn with_locks(mut self, locks: SymbolLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Active poll policy.
    pub const fn poll_policy(&self) -> &PollPolicy {
        &self.poll_policy
    }

    /// Quote gateway backed by the same market data port.
    pub const fn quotes(&self) -> &QuoteGateway<M> {
        &self.quotes
    }

    /// Balance accessor backed by the same broker.
    pub const fn balance(&self) -> &AccountBalance<B> {
        &self.balance
    }

    /// Buy `quantity` shares of `symbol` at market, immediate-or-cancel.
    pub async fn buy(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<SettlementRecord, SettlementError> {
        self.buy_with_cancel(symbol, quantity, &CancellationToken::new())
            .await
    }

    /// [`buy`](Self::buy) with a token that aborts polling.
    ///
    /// # Errors
    ///
    /// Precondition errors (`InvalidRequest`, `InsufficientFunds`) are raised
    /// before submission, as is `Interrupted` if the token fires first.
    /// After submission: `Broker`, `Timeout`, `Cancelled`.
    pub async fn buy_with_cancel(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        cancel: &CancellationToken,
    ) -> Result<SettlementRecord, SettlementError> {
        validate_request(symbol, quantity)?;
        let _guard = self.locks.acquire(symbol).await;

        let quote = self.quotes.get_quote(symbol, None).await?;
        let estimated_cost = quote.price * quantity;
        let available = self.balance.cash().await?;

        if estimated_cost > available {
            let shortfall = InsufficientFunds::new(available, estimated_cost)?;
            tracing::warn!(
                symbol = %symbol,
                quantity = %quantity,
                available = %available,
                required = %estimated_cost,
                "Buy rejected before submission: insufficient funds"
            );
            return Err(shortfall.into());
        }

        interrupted(symbol, cancel)?;
        let ack = self.submit(symbol, OrderSide::Buy, quantity).await?;
        let (terminal, order) = self.await_terminal(&ack, cancel).await?;

        let record = match terminal {
            TerminalState::Filled => {
                let price = fill_price(&order, quote.price, symbol);
                SettlementRecord::bought(symbol.clone(), quantity, price)
            }
            TerminalState::Canceled => {
                let reference = self.quotes.get_quote(symbol, None).await?;
                SettlementRecord::buy_failed(symbol.clone(), quantity, reference.price)
            }
        };

        Ok(settled(record, &order))
    }

    /// Sell `quantity` shares of `symbol` at market, immediate-or-cancel.
    pub async fn sell(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<SettlementRecord, SettlementError> {
        self.sell_with_cancel(symbol, quantity, &CancellationToken::new())
            .await
    }

    /// [`sell`](Self::sell) with a token that aborts polling.
    ///
    /// # Errors
    ///
    /// Precondition errors (`InvalidRequest`, `PositionNotFound`,
    /// `InsufficientShares`) are raised before submission, as is
    /// `Interrupted` if the token fires first. After submission: `Broker`,
    /// `Timeout`, `Cancelled`.
    pub async fn sell_with_cancel(
        &self,
        symbol: &Symbol,
        quantity: Decimal,
        cancel: &CancellationToken,
    ) -> Result<SettlementRecord, SettlementError> {
        validate_request(symbol, quantity)?;
        let _guard = self.locks.acquire(symbol).await;

        let Some(held) = self.broker.get_position(symbol).await? else {
            tracing::warn!(symbol = %symbol, "Sell rejected before submission: no position");
            return Err(SettlementError::PositionNotFound {
                symbol: symbol.to_string(),
            });
        };

        if held < quantity {
            tracing::warn!(
                symbol = %symbol,
                available = %held,
                requested = %quantity,
                "Sell rejected before submission: insufficient shares"
            );
            return Err(SettlementError::InsufficientShares {
                symbol: symbol.to_string(),
                available: held,
                requested: quantity,
            });
        }

        interrupted(symbol, cancel)?;
        let ack = self.submit(symbol, OrderSide::Sell, quantity).await?;
        let (terminal, order) = self.await_terminal(&ack, cancel).await?;

        let record = match terminal {
            TerminalState::Filled => {
                let price = match order.avg_fill_price {
                    Some(price) => price,
                    None => {
                        let reference = self.quotes.get_quote(symbol, None).await?;
                        fill_price(&order, reference.price, symbol)
                    }
                };
                SettlementRecord::sold(symbol.clone(), quantity, price)
            }
            TerminalState::Canceled => {
                let reference = self.quotes.get_quote(symbol, None).await?;
                SettlementRecord::sell_failed(symbol.clone(), quantity, reference.price)
            }
        };

        Ok(settled(record, &order))
    }

    async fn submit(
        &self,
        symbol: &Symbol,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderAck, SettlementError> {
        let request = SubmitOrderRequest::market_ioc(symbol.clone(), side, quantity);
        let client_order_id = request.client_order_id.clone();

        let ack = self.broker.submit_order(request).await.map_err(|e| {
            tracing::error!(
                symbol = %symbol,
                side = %side,
                client_order_id = %client_order_id,
                error = %e,
                "Order submission failed"
            );
            e
        })?;

        metrics::counter!("orders_submitted_total", "side" => side.as_str()).increment(1);
        tracing::info!(
            symbol = %symbol,
            side = %side,
            quantity = %quantity,
            order_id = %ack.broker_order_id,
            client_order_id = %ack.client_order_id,
            "Order submitted"
        );

        Ok(ack)
    }

    /// Poll `get_order` until the order reaches a terminal phase.
    async fn await_terminal(
        &self,
        ack: &OrderAck,
        cancel: &CancellationToken,
    ) -> Result<(TerminalState, OrderAck), SettlementError> {
        let order_id = &ack.broker_order_id;
        let started = Instant::now();
        let mut schedule = self.poll_policy.schedule();

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(order_id.as_str(), schedule.attempts()));
            }

            let order = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(cancelled(order_id.as_str(), schedule.attempts()));
                }
                order = self.broker.get_order(order_id) => order?,
            };
            schedule.record_attempt();

            if let OrderPhase::Terminal(state) = order.status.phase() {
                metrics::histogram!("order_poll_attempts").record(f64::from(schedule.attempts()));
                return Ok((state, order));
            }

            tracing::debug!(
                order_id = %order_id,
                status = %order.status,
                attempt = schedule.attempts(),
                "Order not terminal yet"
            );

            let elapsed = started.elapsed();
            let Some(delay) = schedule.next_delay(elapsed) else {
                let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                tracing::error!(
                    order_id = %order_id,
                    attempts = schedule.attempts(),
                    elapsed_ms,
                    last_status = %order.status,
                    "Order did not reach a terminal status"
                );
                return Err(SettlementError::Timeout {
                    order_id: order_id.to_string(),
                    attempts: schedule.attempts(),
                    elapsed_ms,
                });
            };

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(cancelled(order_id.as_str(), schedule.attempts()));
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn validate_request(symbol: &Symbol, quantity: Decimal) -> Result<(), SettlementError> {
    symbol.validate()?;
    if quantity <= Decimal::ZERO {
        return Err(SettlementError::InvalidRequest {
            message: format!("quantity must be positive, got {quantity}"),
        });
    }
    Ok(())
}

/// Broker average fill price, or `fallback` if a filled order lacks one.
fn fill_price(order: &OrderAck, fallback: Decimal, symbol: &Symbol) -> Decimal {
    order.avg_fill_price.unwrap_or_else(|| {
        tracing::warn!(
            symbol = %symbol,
            order_id = %order.broker_order_id,
            fallback = %fallback,
            "Filled order has no average fill price, using quote"
        );
        fallback
    })
}

fn interrupted(symbol: &Symbol, cancel: &CancellationToken) -> Result<(), SettlementError> {
    if !cancel.is_cancelled() {
        return Ok(());
    }
    tracing::warn!(symbol = %symbol, "Interrupted before submission; nothing was sent");
    Err(SettlementError::Interrupted {
        symbol: symbol.to_string(),
    })
}

fn cancelled(order_id: &str, attempts: u32) -> SettlementError {
    tracing::warn!(
        order_id = %order_id,
        attempts,
        "Polling cancelled; order remains at the broker"
    );
    SettlementError::Cancelled {
        order_id: order_id.to_string(),
    }
}

fn settled(record: SettlementRecord, order: &OrderAck) -> SettlementRecord {
    metrics::counter!("orders_settled_total", "outcome" => record.outcome().as_str()).increment(1);
    tracing::info!(
        symbol = %record.symbol(),
        order_id = %order.broker_order_id,
        outcome = %record.outcome(),
        price = %record.price(),
        quantity = %record.quantity(),
        "Order settled"
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::BrokerError;
    use crate::application::testing::{ScriptedBroker, StaticMarketData};
    use crate::domain::order_execution::value_objects::{OrderStatus, SettlementOutcome};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn executor(
        broker: ScriptedBroker,
        price: Decimal,
    ) -> (
        OrderExecutor<ScriptedBroker, StaticMarketData>,
        Arc<ScriptedBroker>,
        Arc<StaticMarketData>,
    ) {
        let broker = Arc::new(broker);
        let market = Arc::new(StaticMarketData::new(price));
        let executor = OrderExecutor::new(Arc::clone(&broker), Arc::clone(&market))
            .with_poll_policy(PollPolicy::fixed(
                Duration::from_millis(10),
                5,
                Duration::from_secs(1),
            ))
            .unwrap();
        (executor, broker, market)
    }

    fn aapl() -> Symbol {
        Symbol::new("AAPL")
    }

    #[tokio::test]
    async fn buy_rejected_when_cost_exceeds_cash() {
        let (executor, broker, _) = executor(ScriptedBroker::new(dec!(100)), dec!(60));

        let result = executor.buy(&aapl(), dec!(2)).await;

        let Err(SettlementError::InsufficientFunds(funds)) = result else {
            panic!("expected InsufficientFunds, got {result:?}");
        };
        assert_eq!(funds.available(), dec!(100));
        assert_eq!(funds.required(), dec!(120));
        assert_eq!(funds.deficit(), dec!(20));
        assert_eq!(broker.submission_count(), 0);
    }

    #[tokio::test]
    async fn buy_allowed_when_cost_equals_cash() {
        let broker = ScriptedBroker::new(dec!(120)).with_fill_price(dec!(60));
        let (executor, broker, _) = executor(broker, dec!(60));

        let record = executor.buy(&aapl(), dec!(2)).await.unwrap();

        assert_eq!(record.outcome(), SettlementOutcome::Bought);
        assert_eq!(broker.submission_count(), 1);
    }

    #[tokio::test]
    async fn filled_buy_settles_at_average_fill_price() {
        let broker = ScriptedBroker::new(dec!(1000))
            .with_statuses(&[OrderStatus::New, OrderStatus::Filled])
            .with_fill_price(dec!(59.8));
        let (executor, broker, _) = executor(broker, dec!(60));

        let record = executor.buy(&aapl(), dec!(2)).await.unwrap();

        assert_eq!(record.symbol().as_str(), "AAPL");
        assert_eq!(record.quantity(), dec!(2));
        assert_eq!(record.price(), dec!(59.8));
        assert_eq!(record.outcome(), SettlementOutcome::Bought);
        assert!(record.cash().is_none());
        assert_eq!(broker.status_checks(), 2);

        let submissions = broker.submissions.lock().unwrap();
        assert_eq!(submissions[0].side, OrderSide::Buy);
        assert_eq!(submissions[0].quantity, dec!(2));
    }

    #[tokio::test]
    async fn canceled_buy_uses_current_latest_trade() {
        let broker = ScriptedBroker::new(dec!(1000)).with_statuses(&[OrderStatus::Canceled]);
        let (executor, _, market) = executor(broker, dec!(60));
        market.set_price(dec!(61));

        let record = executor.buy(&aapl(), dec!(2)).await.unwrap();

        assert_eq!(record.price(), dec!(61));
        assert_eq!(record.outcome(), SettlementOutcome::BuyFailed);
    }

    #[tokio::test]
    async fn filled_buy_without_fill_price_falls_back_to_quote() {
        let broker = ScriptedBroker::new(dec!(1000));
        let (executor, _, _) = executor(broker, dec!(60));

        let record = executor.buy(&aapl(), dec!(2)).await.unwrap();

        assert_eq!(record.price(), dec!(60));
        assert_eq!(record.outcome(), SettlementOutcome::Bought);
    }

    #[tokio::test]
    async fn sell_without_position_is_rejected() {
        let (executor, broker, _) = executor(ScriptedBroker::new(dec!(0)), dec!(60));

        let result = executor.sell(&aapl(), dec!(1)).await;

        assert!(matches!(result, Err(SettlementError::PositionNotFound { symbol }) if symbol == "AAPL"));
        assert_eq!(broker.submission_count(), 0);
    }

    #[tokio::test]
    async fn sell_more_than_held_is_rejected() {
        let broker = ScriptedBroker::new(dec!(0)).with_position("AAPL", dec!(1));
        let (executor, broker, _) = executor(broker, dec!(60));

        let result = executor.sell(&aapl(), dec!(2)).await;

        let Err(SettlementError::InsufficientShares {
            available,
            requested,
            ..
        }) = result
        else {
            panic!("expected InsufficientShares, got {result:?}");
        };
        assert_eq!(available, dec!(1));
        assert_eq!(requested, dec!(2));
        assert_eq!(broker.submission_count(), 0);
    }

    #[tokio::test]
    async fn filled_sell_reports_proceeds() {
        let broker = ScriptedBroker::new(dec!(0))
            .with_position("AAPL", dec!(5))
            .with_fill_price(dec!(61.25));
        let (executor, broker, _) = executor(broker, dec!(60));

        let record = executor.sell(&aapl(), dec!(3)).await.unwrap();

        assert_eq!(record.outcome(), SettlementOutcome::Sold);
        assert_eq!(record.price(), dec!(61.25));
        assert_eq!(record.cash(), Some(dec!(183.75)));
        assert_eq!(broker.submissions.lock().unwrap()[0].side, OrderSide::Sell);
    }

    #[tokio::test]
    async fn canceled_sell_values_at_latest_trade() {
        let broker = ScriptedBroker::new(dec!(0))
            .with_position("AAPL", dec!(5))
            .with_statuses(&[OrderStatus::PendingNew, OrderStatus::Canceled]);
        let (executor, _, _) = executor(broker, dec!(61));

        let record = executor.sell(&aapl(), dec!(3)).await.unwrap();

        assert_eq!(record.outcome(), SettlementOutcome::SellFailed);
        assert_eq!(record.price(), dec!(61));
        assert_eq!(record.cash(), Some(dec!(183)));
    }

    #[tokio::test]
    async fn non_terminal_statuses_keep_polling() {
        let broker = ScriptedBroker::new(dec!(1000))
            .with_statuses(&[
                OrderStatus::PartiallyFilled,
                OrderStatus::Rejected,
                OrderStatus::Expired,
                OrderStatus::Filled,
            ])
            .with_fill_price(dec!(60));
        let (executor, broker, _) = executor(broker, dec!(60));

        let record = executor.buy(&aapl(), dec!(1)).await.unwrap();

        assert_eq!(record.outcome(), SettlementOutcome::Bought);
        assert_eq!(broker.status_checks(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_times_out_after_max_attempts() {
        let broker = ScriptedBroker::new(dec!(1000)).with_statuses(&[OrderStatus::New]);
        let (executor, broker, _) = executor(broker, dec!(60));

        let result = executor.buy(&aapl(), dec!(1)).await;

        let Err(SettlementError::Timeout {
            order_id, attempts, ..
        }) = result
        else {
            panic!("expected Timeout, got {result:?}");
        };
        assert_eq!(order_id, "broker-1");
        assert_eq!(attempts, 5);
        assert_eq!(broker.status_checks(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_times_out_at_deadline() {
        let broker = Arc::new(ScriptedBroker::new(dec!(1000)).with_statuses(&[OrderStatus::New]));
        let market = Arc::new(StaticMarketData::new(dec!(60)));
        let executor = OrderExecutor::new(Arc::clone(&broker), market)
            .with_poll_policy(PollPolicy::fixed(
                Duration::from_secs(1),
                1_000,
                Duration::from_secs(3),
            ))
            .unwrap();

        let result = executor.buy(&aapl(), dec!(1)).await;

        assert!(matches!(result, Err(SettlementError::Timeout { .. })));
        assert_eq!(broker.status_checks(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_polling() {
        let broker = ScriptedBroker::new(dec!(1000)).with_statuses(&[OrderStatus::New]);
        let broker = Arc::new(broker);
        let market = Arc::new(StaticMarketData::new(dec!(60)));
        let executor = OrderExecutor::new(Arc::clone(&broker), market);
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(2_500)).await;
                token.cancel();
            })
        };

        let result = executor.buy_with_cancel(&aapl(), dec!(1), &token).await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(SettlementError::Cancelled { order_id }) if order_id == "broker-1"));
        assert_eq!(broker.submission_count(), 1);
        assert_eq!(broker.status_checks(), 3);
    }

    #[tokio::test]
    async fn cancelled_before_submission_sends_nothing() {
        let broker = Arc::new(ScriptedBroker::new(dec!(1000)).with_position("AAPL", dec!(5)));
        let market = Arc::new(StaticMarketData::new(dec!(60)));
        let executor = OrderExecutor::new(Arc::clone(&broker), market);
        let token = CancellationToken::new();
        token.cancel();

        let buy = executor.buy_with_cancel(&aapl(), dec!(1), &token).await;
        let sell = executor.sell_with_cancel(&aapl(), dec!(1), &token).await;

        assert!(matches!(buy, Err(SettlementError::Interrupted { symbol }) if symbol == "AAPL"));
        assert!(matches!(sell, Err(SettlementError::Interrupted { .. })));
        assert_eq!(broker.submission_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_slow_status_check() {
        let broker = ScriptedBroker::new(dec!(1000))
            .with_statuses(&[OrderStatus::Filled])
            .with_status_delay(Duration::from_secs(30));
        let broker = Arc::new(broker);
        let market = Arc::new(StaticMarketData::new(dec!(60)));
        let executor = OrderExecutor::new(Arc::clone(&broker), market);
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                token.cancel();
            })
        };

        let result = executor.buy_with_cancel(&aapl(), dec!(1), &token).await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(SettlementError::Cancelled { .. })));
        assert_eq!(broker.submission_count(), 1);
    }

    #[tokio::test]
    async fn broker_error_while_polling_is_surfaced() {
        let broker = ScriptedBroker::new(dec!(1000)).with_get_order_error(
            BrokerError::ConnectionError {
                message: "connection reset".to_string(),
            },
        );
        let (executor, broker, _) = executor(broker, dec!(60));

        let result = executor.buy(&aapl(), dec!(1)).await;

        assert!(matches!(result, Err(SettlementError::Broker(_))));
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(broker.submission_count(), 1);
        assert_eq!(broker.status_checks(), 1);
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_the_broker() {
        let (executor, broker, _) = executor(ScriptedBroker::new(dec!(1000)), dec!(60));

        let zero = executor.buy(&aapl(), dec!(0)).await;
        let negative = executor.sell(&aapl(), dec!(-1)).await;
        let blank = executor.buy(&Symbol::new("  "), dec!(1)).await;

        assert!(matches!(zero, Err(SettlementError::InvalidRequest { .. })));
        assert!(matches!(negative, Err(SettlementError::InvalidRequest { .. })));
        assert!(matches!(blank, Err(SettlementError::InvalidRequest { .. })));
        assert_eq!(broker.submission_count(), 0);
    }

    #[tokio::test]
    async fn same_symbol_buys_cannot_both_spend_one_balance() {
        let broker = ScriptedBroker::new(dec!(150)).with_fill_price(dec!(60));
        let (executor, broker, _) = executor(broker, dec!(60));

        let a = executor.clone();
        let b = executor.clone();
        let first = tokio::spawn(async move { a.buy(&Symbol::new("AAPL"), dec!(2)).await });
        let second = tokio::spawn(async move { b.buy(&Symbol::new("AAPL"), dec!(2)).await });
        let results = [first.await.unwrap(), second.await.unwrap()];

        let bought = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(SettlementError::InsufficientFunds(_))))
            .count();
        assert_eq!((bought, rejected), (1, 1));
        assert_eq!(broker.submission_count(), 1);
        assert_eq!(*broker.cash.lock().unwrap(), dec!(30));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_same_symbol_orders_are_serialized() {
        let broker = ScriptedBroker::new(dec!(1000))
            .with_statuses(&[OrderStatus::New, OrderStatus::New, OrderStatus::Filled])
            .with_fill_price(dec!(60));
        let broker = Arc::new(broker);
        let market = Arc::new(StaticMarketData::new(dec!(60)));
        let executor = OrderExecutor::new(Arc::clone(&broker), market);

        let a = executor.clone();
        let b = executor.clone();
        let first = tokio::spawn(async move { a.buy(&Symbol::new("AAPL"), dec!(1)).await });
        tokio::task::yield_now().await;
        let second = tokio::spawn(async move { b.buy(&Symbol::new("AAPL"), dec!(1)).await });

        // While the first order is still polling the second cannot submit.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(broker.submission_count(), 1);

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(broker.submission_count(), 2);
    }

    #[test]
    fn rejects_policy_that_never_polls() {
        let broker = Arc::new(ScriptedBroker::new(dec!(0)));
        let market = Arc::new(StaticMarketData::new(dec!(1)));
        let result = OrderExecutor::new(broker, market).with_poll_policy(PollPolicy::fixed(
            Duration::from_secs(1),
            0,
            Duration::from_secs(1),
        ));
        assert!(result.is_err());
    }
}

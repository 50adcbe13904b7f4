//! Scripted port doubles shared by the use case tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    Bar, BrokerError, BrokerPort, LatestTrade, MarketDataError, MarketDataPort, OrderAck,
    SubmitOrderRequest,
};
use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus};
use crate::domain::shared::{BrokerOrderId, Symbol, Timestamp};

/// Broker that replays a fixed status sequence for every order.
///
/// Once the script runs out the last status repeats. Fills move cash like
/// a real account: buys debit, sells credit.
pub struct ScriptedBroker {
    pub cash: Mutex<Decimal>,
    pub positions: Mutex<HashMap<Symbol, Decimal>>,
    pub statuses: Mutex<VecDeque<OrderStatus>>,
    pub fill_price: Option<Decimal>,
    pub get_order_error: Option<BrokerError>,
    pub status_delay: Option<Duration>,
    pub submissions: Mutex<Vec<SubmitOrderRequest>>,
    pub status_checks: AtomicU32,
}

impl ScriptedBroker {
    pub fn new(cash: Decimal) -> Self {
        Self {
            cash: Mutex::new(cash),
            positions: Mutex::new(HashMap::new()),
            statuses: Mutex::new(VecDeque::from([OrderStatus::Filled])),
            fill_price: None,
            get_order_error: None,
            status_delay: None,
            submissions: Mutex::new(Vec::new()),
            status_checks: AtomicU32::new(0),
        }
    }

    pub fn with_statuses(self, statuses: &[OrderStatus]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub const fn with_fill_price(mut self, price: Decimal) -> Self {
        self.fill_price = Some(price);
        self
    }

    pub fn with_position(self, symbol: &str, quantity: Decimal) -> Self {
        self.positions
            .lock()
            .unwrap()
            .insert(Symbol::new(symbol), quantity);
        self
    }

    pub fn with_get_order_error(mut self, error: BrokerError) -> Self {
        self.get_order_error = Some(error);
        self
    }

    pub const fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn status_checks(&self) -> u32 {
        self.status_checks.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> OrderStatus {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap_or(OrderStatus::New)
        } else {
            statuses.front().copied().unwrap_or(OrderStatus::New)
        }
    }
}

#[async_trait]
impl BrokerPort for ScriptedBroker {
    async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, BrokerError> {
        let mut submissions = self.submissions.lock().unwrap();
        let ack = OrderAck {
            broker_order_id: BrokerOrderId::new(format!("broker-{}", submissions.len() + 1)),
            client_order_id: request.client_order_id.clone(),
            status: OrderStatus::Accepted,
            filled_qty: Decimal::ZERO,
            avg_fill_price: None,
        };
        submissions.push(request);
        Ok(ack)
    }

    async fn get_order(&self, broker_order_id: &BrokerOrderId) -> Result<OrderAck, BrokerError> {
        self.status_checks.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.get_order_error {
            return Err(err.clone());
        }

        let status = self.next_status();
        let submitted = self
            .submissions
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("get_order before submit");

        let filled = status == OrderStatus::Filled;
        if let (true, Some(price)) = (filled, self.fill_price) {
            let notional = price * submitted.quantity;
            let mut cash = self.cash.lock().unwrap();
            match submitted.side {
                OrderSide::Buy => *cash -= notional,
                OrderSide::Sell => *cash += notional,
            }
        }

        Ok(OrderAck {
            broker_order_id: broker_order_id.clone(),
            client_order_id: submitted.client_order_id,
            status,
            filled_qty: if filled { submitted.quantity } else { Decimal::ZERO },
            avg_fill_price: if filled { self.fill_price } else { None },
        })
    }

    async fn get_position(&self, symbol: &Symbol) -> Result<Option<Decimal>, BrokerError> {
        Ok(self.positions.lock().unwrap().get(symbol).copied())
    }

    async fn get_cash(&self) -> Result<Decimal, BrokerError> {
        Ok(*self.cash.lock().unwrap())
    }
}

/// Market data with a settable latest price and fixed bars.
pub struct StaticMarketData {
    pub price: Mutex<Decimal>,
    pub bars: Vec<Bar>,
}

impl StaticMarketData {
    pub fn new(price: Decimal) -> Self {
        Self {
            price: Mutex::new(price),
            bars: Vec::new(),
        }
    }

    pub fn set_price(&self, price: Decimal) {
        *self.price.lock().unwrap() = price;
    }
}

#[async_trait]
impl MarketDataPort for StaticMarketData {
    async fn latest_trade(&self, _symbol: &Symbol) -> Result<LatestTrade, MarketDataError> {
        Ok(LatestTrade {
            price: *self.price.lock().unwrap(),
            size: Decimal::ONE_HUNDRED,
            timestamp: Timestamp::now(),
        })
    }

    async fn minute_bars(
        &self,
        _symbol: &Symbol,
        _start: Timestamp,
        _end: Timestamp,
    ) -> Result<Vec<Bar>, MarketDataError> {
        Ok(self.bars.clone())
    }
}

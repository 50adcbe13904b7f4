//! Alpaca API request and response types.
//!
//! These types map directly to Alpaca's REST API format. Trading API
//! amounts arrive as strings; data API prices arrive as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AlpacaError;
use crate::application::ports::{Bar, LatestTrade, OrderAck, SubmitOrderRequest};
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::shared::{BrokerOrderId, ClientOrderId, Timestamp};

// ============================================================================
// Trading API
// ============================================================================

/// Order request body for `POST /v2/orders`.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaOrderRequest {
    /// Stock symbol.
    pub symbol: String,
    /// Quantity (shares).
    pub qty: String,
    /// Order side.
    pub side: &'static str,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: &'static str,
    /// Time in force.
    pub time_in_force: &'static str,
    /// Client order ID.
    pub client_order_id: String,
}

impl From<&SubmitOrderRequest> for AlpacaOrderRequest {
    fn from(request: &SubmitOrderRequest) -> Self {
        Self {
            symbol: request.symbol.to_string(),
            qty: request.quantity.normalize().to_string(),
            side: request.side.as_str(),
            order_type: "market",
            time_in_force: "ioc",
            client_order_id: request.client_order_id.to_string(),
        }
    }
}

/// Order response from Alpaca API. Unused fields are not mapped.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrderResponse {
    /// Broker order ID.
    pub id: String,
    /// Client order ID.
    pub client_order_id: String,
    /// Filled quantity (as string).
    #[serde(default)]
    pub filled_qty: Option<String>,
    /// Average fill price (as string).
    #[serde(default)]
    pub filled_avg_price: Option<String>,
    /// Order status.
    pub status: String,
}

impl AlpacaOrderResponse {
    /// Convert to `OrderAck`.
    pub fn to_order_ack(&self) -> Result<OrderAck, AlpacaError> {
        Ok(OrderAck {
            broker_order_id: BrokerOrderId::new(&self.id),
            client_order_id: ClientOrderId::new(&self.client_order_id),
            status: OrderStatus::parse(&self.status),
            filled_qty: self
                .filled_qty
                .as_deref()
                .map(|q| parse_decimal("filled_qty", q))
                .transpose()?
                .unwrap_or(Decimal::ZERO),
            avg_fill_price: self
                .filled_avg_price
                .as_deref()
                .map(|p| parse_decimal("filled_avg_price", p))
                .transpose()?,
        })
    }
}

/// Account response from `GET /v2/account`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccountResponse {
    /// Cash balance.
    pub cash: String,
}

/// Position response from `GET /v2/positions/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPositionResponse {
    /// Quantity.
    pub qty: String,
}

// ============================================================================
// Data API
// ============================================================================

/// Response of `GET /v2/stocks/{symbol}/trades/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaLatestTradeResponse {
    /// The trade.
    pub trade: AlpacaTrade,
}

/// Single trade print.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaTrade {
    /// Price.
    #[serde(rename = "p")]
    pub price: Decimal,
    /// Size.
    #[serde(rename = "s")]
    pub size: Decimal,
    /// Timestamp (RFC3339).
    #[serde(rename = "t")]
    pub timestamp: String,
}

impl AlpacaTrade {
    /// Convert to the port type.
    pub fn to_latest_trade(&self) -> Result<LatestTrade, AlpacaError> {
        Ok(LatestTrade {
            price: self.price,
            size: self.size,
            timestamp: parse_time(&self.timestamp)?,
        })
    }
}

/// Response of `GET /v2/stocks/{symbol}/bars`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBarsResponse {
    /// Bars; `null` when the window is empty.
    #[serde(default)]
    pub bars: Option<Vec<AlpacaBar>>,
    /// Pagination token.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// OHLCV bar.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBar {
    /// Open.
    #[serde(rename = "o")]
    pub open: Decimal,
    /// High.
    #[serde(rename = "h")]
    pub high: Decimal,
    /// Low.
    #[serde(rename = "l")]
    pub low: Decimal,
    /// Close.
    #[serde(rename = "c")]
    pub close: Decimal,
    /// Volume.
    #[serde(rename = "v")]
    pub volume: Decimal,
    /// Bar start (RFC3339).
    #[serde(rename = "t")]
    pub timestamp: String,
}

impl AlpacaBar {
    /// Convert to the port type.
    pub fn to_bar(&self) -> Result<Bar, AlpacaError> {
        Ok(Bar {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            timestamp: parse_time(&self.timestamp)?,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
///
/// `code` is numeric on the trading API and absent on some data errors.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Error message.
    pub message: String,
}

impl AlpacaErrorResponse {
    /// Error code as text.
    pub fn code_string(&self) -> Option<String> {
        self.code.as_ref().map(|code| match code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a decimal field sent as text.
pub fn parse_decimal(field: &str, value: &str) -> Result<Decimal, AlpacaError> {
    value
        .parse()
        .map_err(|e| AlpacaError::InvalidResponse(format!("{field}: '{value}' ({e})")))
}

fn parse_time(value: &str) -> Result<Timestamp, AlpacaError> {
    Timestamp::parse(value)
        .map_err(|e| AlpacaError::InvalidResponse(format!("timestamp '{value}' ({e})")))
}

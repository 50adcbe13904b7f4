//! Alpaca adapter implementing `BrokerPort` and `MarketDataPort`.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    Bar, BrokerError, BrokerPort, LatestTrade, MarketDataError, MarketDataPort, OrderAck,
    SubmitOrderRequest,
};
use crate::domain::shared::{BrokerOrderId, Symbol, Timestamp};

use super::api_types::{
    AlpacaAccountResponse, AlpacaBarsResponse, AlpacaLatestTradeResponse, AlpacaOrderRequest,
    AlpacaOrderResponse, AlpacaPositionResponse, parse_decimal,
};
use super::config::{AlpacaConfig, AlpacaEnvironment};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;

/// Alpaca Markets adapter.
///
/// One client serves both the trading API (orders, positions, account)
/// and the market data API (latest trade, minute bars).
#[derive(Debug, Clone)]
pub struct AlpacaBrokerAdapter {
    client: AlpacaHttpClient,
    environment: AlpacaEnvironment,
}

impl AlpacaBrokerAdapter {
    /// Create a new Alpaca adapter.
    pub fn new(config: AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = AlpacaHttpClient::new(&config)?;
        Ok(Self {
            client,
            environment: config.environment,
        })
    }

    /// Check if we're in live trading mode.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }

    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Bar>, AlpacaError> {
        let path = format!("/v2/stocks/{symbol}/bars");
        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeframe", "1Min".to_string()),
                ("start", start.to_broker_string()),
                ("end", end.to_broker_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("page_token", token));
            }

            let page: AlpacaBarsResponse = self.client.data_get(&path, &query).await?;
            for bar in page.bars.unwrap_or_default() {
                bars.push(bar.to_bar()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(bars),
            }
        }
    }
}

#[async_trait]
impl BrokerPort for AlpacaBrokerAdapter {
    async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, BrokerError> {
        if self.is_live() {
            tracing::warn!(
                client_order_id = %request.client_order_id,
                symbol = %request.symbol,
                "Submitting LIVE order - this will execute real trades"
            );
        }

        let alpaca_request = AlpacaOrderRequest::from(&request);

        tracing::info!(
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            side = alpaca_request.side,
            qty = %alpaca_request.qty,
            "Submitting order to Alpaca"
        );

        let response: AlpacaOrderResponse = self
            .client
            .post("/v2/orders", &alpaca_request)
            .await
            .map_err(BrokerError::from)?;

        tracing::info!(
            client_order_id = %request.client_order_id,
            broker_order_id = %response.id,
            status = %response.status,
            "Order submitted"
        );

        response.to_order_ack().map_err(BrokerError::from)
    }

    async fn get_order(&self, broker_order_id: &BrokerOrderId) -> Result<OrderAck, BrokerError> {
        let response: AlpacaOrderResponse = self
            .client
            .get(&format!("/v2/orders/{broker_order_id}"))
            .await
            .map_err(|e| match e {
                AlpacaError::NotFound { .. } => BrokerError::OrderNotFound {
                    order_id: broker_order_id.to_string(),
                },
                other => other.into(),
            })?;

        tracing::debug!(
            broker_order_id = %broker_order_id,
            status = %response.status,
            "Order status"
        );

        response.to_order_ack().map_err(BrokerError::from)
    }

    async fn get_position(&self, symbol: &Symbol) -> Result<Option<Decimal>, BrokerError> {
        let result: Result<AlpacaPositionResponse, AlpacaError> =
            self.client.get(&format!("/v2/positions/{symbol}")).await;

        match result {
            Ok(position) => Ok(Some(
                parse_decimal("qty", &position.qty).map_err(BrokerError::from)?,
            )),
            Err(AlpacaError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_cash(&self) -> Result<Decimal, BrokerError> {
        let account: AlpacaAccountResponse = self
            .client
            .get("/v2/account")
            .await
            .map_err(BrokerError::from)?;

        parse_decimal("cash", &account.cash).map_err(BrokerError::from)
    }
}

#[async_trait]
impl MarketDataPort for AlpacaBrokerAdapter {
    async fn latest_trade(&self, symbol: &Symbol) -> Result<LatestTrade, MarketDataError> {
        let response: AlpacaLatestTradeResponse = self
            .client
            .data_get(&format!("/v2/stocks/{symbol}/trades/latest"), &[])
            .await
            .map_err(|e| match e {
                AlpacaError::NotFound { .. } => MarketDataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                },
                other => other.into(),
            })?;

        response.trade.to_latest_trade().map_err(MarketDataError::from)
    }

    async fn minute_bars(
        &self,
        symbol: &Symbol,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Bar>, MarketDataError> {
        let bars = self
            .fetch_bars(symbol, start, end)
            .await
            .map_err(|e| match e {
                AlpacaError::NotFound { .. } => MarketDataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                },
                other => other.into(),
            })?;

        tracing::debug!(symbol = %symbol, count = bars.len(), "Fetched minute bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_credentials() {
        let config = AlpacaConfig::new(String::new(), "secret".to_string(), AlpacaEnvironment::Paper);
        assert!(matches!(
            AlpacaBrokerAdapter::new(config),
            Err(AlpacaError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn reports_environment() {
        let paper = AlpacaBrokerAdapter::new(AlpacaConfig::new(
            "key".to_string(),
            "secret".to_string(),
            AlpacaEnvironment::Paper,
        ))
        .unwrap();
        assert!(!paper.is_live());

        let live = AlpacaBrokerAdapter::new(AlpacaConfig::new(
            "key".to_string(),
            "secret".to_string(),
            AlpacaEnvironment::Live,
        ))
        .unwrap();
        assert!(live.is_live());
    }
}

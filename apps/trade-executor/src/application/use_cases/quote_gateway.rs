//! Quote Gateway
//!
//! Resolves the tradable price of a symbol, either now or as of an instant.

use std::sync::Arc;

use crate::application::errors::SettlementError;
use crate::application::ports::MarketDataPort;
use crate::domain::order_execution::value_objects::Quote;
use crate::domain::shared::{Symbol, Timestamp};

/// Look-back window for historical quotes, in seconds. Also the bar length.
const BAR_WINDOW_SECS: i64 = 60;

/// Read-only price lookup. No caching.
pub struct QuoteGateway<M: MarketDataPort> {
    market_data: Arc<M>,
}

impl<M: MarketDataPort> Clone for QuoteGateway<M> {
    fn clone(&self) -> Self {
        Self {
            market_data: Arc::clone(&self.market_data),
        }
    }
}

impl<M: MarketDataPort> QuoteGateway<M> {
    /// Create a gateway over a market data port.
    pub const fn new(market_data: Arc<M>) -> Self {
        Self { market_data }
    }

    /// Quote `symbol`.
    ///
    /// Without `as_of` this is the latest trade. With `as_of = T` it is the
    /// most recent one-minute bar closing at or before `T`, taken from the
    /// bars in `[T - 1min, T]`.
    ///
    /// # Errors
    ///
    /// `SettlementError::InvalidRequest` for a malformed symbol;
    /// `SettlementError::NoData` if the window holds no bar or the symbol is
    /// unknown; `SettlementError::Broker` on API failure.
    pub async fn get_quote(
        &self,
        symbol: &Symbol,
        as_of: Option<Timestamp>,
    ) -> Result<Quote, SettlementError> {
        symbol.validate()?;

        match as_of {
            None => self.latest(symbol).await,
            Some(at) => self.historical(symbol, at).await,
        }
    }

    async fn latest(&self, symbol: &Symbol) -> Result<Quote, SettlementError> {
        let trade = self.market_data.latest_trade(symbol).await?;

        tracing::debug!(
            symbol = %symbol,
            price = %trade.price,
            "Latest trade quote"
        );

        Ok(Quote {
            symbol: symbol.clone(),
            price: trade.price,
            volume: trade.size,
            timestamp: trade.timestamp,
        })
    }

    async fn historical(&self, symbol: &Symbol, at: Timestamp) -> Result<Quote, SettlementError> {
        let bar_len = chrono::Duration::seconds(BAR_WINDOW_SECS);
        let start = at.minus(bar_len);
        let bars = self.market_data.minute_bars(symbol, start, at).await?;

        // Bars are stamped with their open; one opening at T closes after T.
        let closed = bars
            .iter()
            .filter(|bar| bar.timestamp.plus(bar_len) <= at)
            .max_by_key(|bar| bar.timestamp);
        let Some(bar) = closed.or_else(|| bars.iter().min_by_key(|bar| bar.timestamp)) else {
            tracing::warn!(symbol = %symbol, as_of = %at, "No bars in quote window");
            return Err(SettlementError::NoData {
                symbol: symbol.to_string(),
            });
        };

        Ok(Quote {
            symbol: symbol.clone(),
            price: bar.close,
            volume: bar.volume,
            timestamp: bar.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{Bar, LatestTrade, MarketDataError};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct MockMarketData {
        trade: Option<LatestTrade>,
        bars: Vec<Bar>,
        windows: Mutex<Vec<(Timestamp, Timestamp)>>,
    }

    impl MockMarketData {
        fn new(trade: Option<LatestTrade>, bars: Vec<Bar>) -> Self {
            Self {
                trade,
                bars,
                windows: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketDataPort for MockMarketData {
        async fn latest_trade(&self, symbol: &Symbol) -> Result<LatestTrade, MarketDataError> {
            self.trade
                .clone()
                .ok_or_else(|| MarketDataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
        }

        async fn minute_bars(
            &self,
            _symbol: &Symbol,
            start: Timestamp,
            end: Timestamp,
        ) -> Result<Vec<Bar>, MarketDataError> {
            self.windows.lock().unwrap().push((start, end));
            Ok(self.bars.clone())
        }
    }

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    fn bar(close: Decimal, volume: Decimal, at: &str) -> Bar {
        Bar {
            open: close,
            high: close,
            low: close,
            close,
            volume,
            timestamp: ts(at),
        }
    }

    #[tokio::test]
    async fn latest_trade_without_as_of() {
        let market = MockMarketData::new(
            Some(LatestTrade {
                price: dec!(189.5),
                size: dec!(100),
                timestamp: ts("2024-03-01T15:30:00Z"),
            }),
            vec![],
        );
        let gateway = QuoteGateway::new(Arc::new(market));

        let quote = gateway.get_quote(&Symbol::new("AAPL"), None).await.unwrap();

        assert_eq!(quote.price, dec!(189.5));
        assert_eq!(quote.volume, dec!(100));
        assert_eq!(quote.symbol.as_str(), "AAPL");
    }

    #[tokio::test]
    async fn as_of_on_minute_boundary_uses_bar_closing_at_as_of() {
        let market = Arc::new(MockMarketData::new(
            None,
            vec![
                bar(dec!(10.0), dec!(500), "2024-03-01T15:29:00Z"),
                bar(dec!(99.0), dec!(300), "2024-03-01T15:30:00Z"),
            ],
        ));
        let gateway = QuoteGateway::new(Arc::clone(&market));
        let at = ts("2024-03-01T15:30:00Z");

        let quote = gateway.get_quote(&Symbol::new("AAPL"), Some(at)).await.unwrap();

        assert_eq!(quote.price, dec!(10.0));
        assert_eq!(quote.volume, dec!(500));
        assert_eq!(quote.timestamp, ts("2024-03-01T15:29:00Z"));

        let windows = market.windows.lock().unwrap();
        assert_eq!(windows[0], (ts("2024-03-01T15:29:00Z"), at));
    }

    #[tokio::test]
    async fn as_of_mid_minute_uses_last_closed_bar() {
        let market = Arc::new(MockMarketData::new(
            None,
            vec![
                bar(dec!(10.0), dec!(500), "2024-03-01T15:29:00Z"),
                bar(dec!(10.4), dec!(200), "2024-03-01T15:30:00Z"),
            ],
        ));
        let gateway = QuoteGateway::new(market);

        let quote = gateway
            .get_quote(&Symbol::new("AAPL"), Some(ts("2024-03-01T15:30:30Z")))
            .await
            .unwrap();

        assert_eq!(quote.price, dec!(10.0));
        assert_eq!(quote.timestamp, ts("2024-03-01T15:29:00Z"));
    }

    #[tokio::test]
    async fn as_of_with_only_open_bar_falls_back_to_it() {
        let market = Arc::new(MockMarketData::new(
            None,
            vec![bar(dec!(10.4), dec!(200), "2024-03-01T15:30:00Z")],
        ));
        let gateway = QuoteGateway::new(market);

        let quote = gateway
            .get_quote(&Symbol::new("AAPL"), Some(ts("2024-03-01T15:30:30Z")))
            .await
            .unwrap();

        assert_eq!(quote.price, dec!(10.4));
    }

    #[tokio::test]
    async fn malformed_symbol_is_rejected_before_lookup() {
        let market = Arc::new(MockMarketData::new(None, vec![]));
        let gateway = QuoteGateway::new(Arc::clone(&market));

        let result = gateway
            .get_quote(&Symbol::new("AAPL/../v2"), Some(ts("2024-03-01T15:30:00Z")))
            .await;

        assert!(matches!(result, Err(SettlementError::InvalidRequest { .. })));
        assert!(market.windows.lock().unwrap().is_empty());
        assert!(matches!(
            gateway.get_quote(&Symbol::new("AA?PL"), None).await,
            Err(SettlementError::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn empty_window_is_no_data() {
        let gateway = QuoteGateway::new(Arc::new(MockMarketData::new(None, vec![])));

        let result = gateway
            .get_quote(&Symbol::new("AAPL"), Some(ts("2024-03-02T03:00:00Z")))
            .await;

        assert!(matches!(result, Err(SettlementError::NoData { symbol }) if symbol == "AAPL"));
    }

    #[tokio::test]
    async fn unknown_symbol_is_no_data() {
        let gateway = QuoteGateway::new(Arc::new(MockMarketData::new(None, vec![])));

        let result = gateway.get_quote(&Symbol::new("ZZZZ"), None).await;

        assert!(matches!(result, Err(SettlementError::NoData { .. })));
    }
}

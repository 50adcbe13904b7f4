//! Account Balance Accessor

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::errors::SettlementError;
use crate::application::ports::BrokerPort;

/// Reads available cash. Every call goes to the broker.
pub struct AccountBalance<B: BrokerPort> {
    broker: Arc<B>,
}

impl<B: BrokerPort> Clone for AccountBalance<B> {
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
        }
    }
}

impl<B: BrokerPort> AccountBalance<B> {
    /// Create an accessor over a broker port.
    pub const fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Available cash on the account.
    pub async fn cash(&self) -> Result<Decimal, SettlementError> {
        let cash = self.broker.get_cash().await?;
        tracing::debug!(cash = %cash, "Account cash");
        Ok(cash)
    }
}

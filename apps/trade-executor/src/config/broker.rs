//! Broker connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::infrastructure::broker::{AlpacaConfig, AlpacaEnvironment, RetryConfig};

/// Alpaca connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// `paper` or `live`. When blank, inferred from `trading_url`.
    #[serde(default)]
    pub environment: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
    /// Trading API base URL override.
    #[serde(default)]
    pub trading_url: Option<String>,
    /// Data API base URL override.
    #[serde(default)]
    pub data_url: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// HTTP retry settings.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            environment: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            trading_url: None,
            data_url: None,
            timeout_secs: default_timeout_secs(),
            retry: RetrySettings::default(),
        }
    }
}

impl BrokerConfig {
    /// Resolve the trading environment.
    pub fn environment(&self) -> Result<AlpacaEnvironment, ConfigError> {
        if self.environment.trim().is_empty() {
            return Ok(self
                .trading_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .map_or(AlpacaEnvironment::Paper, AlpacaEnvironment::from_trading_url));
        }
        self.environment
            .parse()
            .map_err(|e: String| ConfigError::ValidationError(format!("broker.environment: {e}")))
    }

    /// Build the adapter configuration. Fails when credentials are missing.
    pub fn to_alpaca_config(&self) -> Result<AlpacaConfig, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("ALPACA_KEY".to_string()));
        }
        if self.api_secret.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("ALPACA_SECRET".to_string()));
        }

        let mut config = AlpacaConfig::new(
            self.api_key.trim().to_string(),
            self.api_secret.trim().to_string(),
            self.environment()?,
        )
        .with_timeout(Duration::from_secs(self.timeout_secs))
        .with_retry(self.retry.to_retry_config());

        config.trading_url = non_blank(self.trading_url.as_deref());
        config.data_url = non_blank(self.data_url.as_deref());
        Ok(config)
    }
}

/// HTTP retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per request, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetrySettings {
    /// Convert to the adapter's retry configuration.
    #[must_use]
    pub const fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_multiplier() -> f64 {
    2.0
}

//! HTTP client wrapper with retry logic.
//!
//! GETs are retried on network errors, 408/5xx and 429. An order POST is
//! retried only when the request provably never reached the broker
//! (connect failure or 429), so a submission is never sent twice.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::{AlpacaConfig, RetryConfig};
use super::error::AlpacaError;

/// HTTP client for Alpaca API with retry logic.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    trading_base_url: String,
    data_base_url: String,
    retry_config: RetryConfig,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(AlpacaError::AuthenticationFailed(
                "API key and secret are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            trading_base_url: config.trading_base_url().to_string(),
            data_base_url: config.data_base_url().to_string(),
            retry_config: config.retry.clone(),
        })
    }

    /// Make a GET request to the trading API.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        self.request(Method::GET, &self.trading_base_url, path, &[], None::<&()>)
            .await
    }

    /// Make a POST request to the trading API.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.request(Method::POST, &self.trading_base_url, path, &[], Some(body))
            .await
    }

    /// Make a GET request to the data API.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AlpacaError> {
        self.request(Method::GET, &self.data_base_url, path, query, None::<&()>)
            .await
    }

    fn build(
        &self,
        method: &Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&(impl Serialize + Sync)>,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .request(method.clone(), url)
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(b) = body {
            request = request.json(b);
        }
        request
    }

    /// Internal request implementation with retry logic.
    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, AlpacaError> {
        let url = format!("{base_url}{path}");
        let idempotent = method != Method::POST;
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let response = match self.build(&method, &url, query, body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let retryable = idempotent || e.is_connect();
                    if let Some(delay) = retryable.then(|| backoff.next_backoff()).flatten() {
                        tracing::warn!(
                            method = %method,
                            path,
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if retryable {
                        return Err(AlpacaError::MaxRetriesExceeded {
                            attempts: backoff.attempt,
                        });
                    }
                    return Err(AlpacaError::Network(e.to_string()));
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| AlpacaError::Network(e.to_string()))?;
                let text = if text.trim().is_empty() { "null" } else { &text };
                return serde_json::from_str(text).map_err(|e| AlpacaError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();

            let (error_code, error_message) =
                match serde_json::from_str::<AlpacaErrorResponse>(&error_body) {
                    Ok(err) => (
                        err.code_string()
                            .unwrap_or_else(|| status.as_u16().to_string()),
                        err.message,
                    ),
                    Err(_) => (status.as_u16().to_string(), error_body),
                };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = backoff
                        .next_backoff()
                        .map(|computed| retry_after.map_or(computed, Duration::from_secs));
                    if let Some(delay) = delay {
                        tracing::warn!(
                            method = %method,
                            path,
                            code = %error_code,
                            delay_ms = delay.as_millis(),
                            "Rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AlpacaError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable if idempotent => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            method = %method,
                            path,
                            code = %error_code,
                            message = %error_message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AlpacaError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                ErrorCategory::Retryable | ErrorCategory::NonRetryable => {
                    return Err(classify_failure(status, path, error_code, error_message));
                }
            }
        }
    }
}

/// Map a final HTTP failure to an adapter error.
fn classify_failure(status: StatusCode, path: &str, code: String, message: String) -> AlpacaError {
    match status {
        StatusCode::FORBIDDEN if message.to_lowercase().contains("buying power") => {
            AlpacaError::InsufficientBuyingPower(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AlpacaError::AuthenticationFailed(format!("{code}: {message}"))
        }
        StatusCode::NOT_FOUND => AlpacaError::NotFound {
            path: path.to_string(),
        },
        StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::OrderRejected(message),
        _ => AlpacaError::Api { code, message },
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}

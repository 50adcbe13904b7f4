//! Order polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::order_execution::PollPolicy;

/// How the executor waits for an order to settle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Wait between status checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Cap on the wait when backing off. Defaults to `poll_interval_ms`.
    #[serde(default)]
    pub max_poll_interval_ms: Option<u64>,
    /// Growth factor for the wait (1.0 keeps it fixed).
    #[serde(default = "default_poll_multiplier")]
    pub poll_multiplier: f64,
    /// Maximum status checks per order.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Maximum time spent polling one order, in seconds.
    #[serde(default = "default_poll_deadline_secs")]
    pub poll_deadline_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_interval_ms: None,
            poll_multiplier: default_poll_multiplier(),
            max_poll_attempts: default_max_poll_attempts(),
            poll_deadline_secs: default_poll_deadline_secs(),
        }
    }
}

impl ExecutionConfig {
    /// Build the poll policy. Not validated.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        let interval = Duration::from_millis(self.poll_interval_ms);
        let max_interval = self
            .max_poll_interval_ms
            .map_or(interval, Duration::from_millis);

        PollPolicy::fixed(
            interval,
            self.max_poll_attempts,
            Duration::from_secs(self.poll_deadline_secs),
        )
        .with_backoff(self.poll_multiplier, max_interval)
    }
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

const fn default_poll_multiplier() -> f64 {
    1.0
}

const fn default_max_poll_attempts() -> u32 {
    120
}

const fn default_poll_deadline_secs() -> u64 {
    120
}

//! Bounded polling policy for waiting on a terminal order phase.
//!
//! IOC orders normally settle within a second or two, so the defaults poll
//! once per second for at most two minutes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::shared::DomainError;

/// How long and how often to poll an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Wait before the second status check.
    pub interval: Duration,
    /// Upper bound on a single wait when backing off.
    pub max_interval: Duration,
    /// Growth factor applied to the wait after each check (1.0 = fixed).
    pub multiplier: f64,
    /// Maximum number of status checks.
    pub max_attempts: u32,
    /// Maximum wall-clock time spent polling.
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(1), 120, Duration::from_secs(120))
    }
}

impl PollPolicy {
    /// Fixed-interval policy.
    #[must_use]
    pub const fn fixed(interval: Duration, max_attempts: u32, deadline: Duration) -> Self {
        Self {
            interval,
            max_interval: interval,
            multiplier: 1.0,
            max_attempts,
            deadline,
        }
    }

    /// Grow the wait by `multiplier` after each check, capped at `max_interval`.
    #[must_use]
    pub const fn with_backoff(mut self, multiplier: f64, max_interval: Duration) -> Self {
        self.multiplier = multiplier;
        self.max_interval = max_interval;
        self
    }

    /// Check the policy can terminate and makes progress.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |field: &str, message: &str| DomainError::InvalidValue {
            field: format!("poll_policy.{field}"),
            message: message.to_string(),
        };

        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        if self.deadline.is_zero() {
            return Err(invalid("deadline", "must be positive"));
        }
        if self.interval.is_zero() {
            return Err(invalid("interval", "must be positive"));
        }
        if self.max_interval < self.interval {
            return Err(invalid("max_interval", "must not be below interval"));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(invalid("multiplier", "must be a finite value >= 1.0"));
        }

        Ok(())
    }

    /// Start a fresh schedule for one order.
    #[must_use]
    pub const fn schedule(&self) -> PollSchedule {
        PollSchedule {
            policy: *self,
            attempts: 0,
            current: self.interval,
        }
    }
}

/// Per-order polling state derived from a [`PollPolicy`].
#[derive(Debug, Clone)]
pub struct PollSchedule {
    policy: PollPolicy,
    attempts: u32,
    current: Duration,
}

impl PollSchedule {
    /// Count one status check.
    pub const fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Status checks made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait before the next check, or `None` once the budget is spent.
    ///
    /// The wait never runs past the deadline.
    pub fn next_delay(&mut self, elapsed: Duration) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts || elapsed >= self.policy.deadline {
            return None;
        }

        let remaining = self.policy.deadline - elapsed;
        let delay = self.current.min(remaining);

        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.policy.multiplier)
                .min(self.policy.max_interval.as_secs_f64()),
        );

        Some(delay)
    }
}

//! Insufficient funds precondition failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Cash on hand does not cover the estimated cost of a buy.
///
/// Invariant: `deficit = required - available > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientFunds {
    available: Decimal,
    required: Decimal,
    deficit: Decimal,
}

impl InsufficientFunds {
    /// Build the failure for a balance that cannot cover `required`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` if `available >= required`;
    /// a buy that can be afforded must never produce this value.
    pub fn new(available: Decimal, required: Decimal) -> Result<Self, DomainError> {
        if available >= required {
            return Err(DomainError::InvariantViolation {
                aggregate: "InsufficientFunds".to_string(),
                invariant: "available < required".to_string(),
                state: format!("available={available}, required={required}"),
            });
        }

        Ok(Self {
            available,
            required,
            deficit: required - available,
        })
    }

    /// Cash that was available.
    #[must_use]
    pub const fn available(&self) -> Decimal {
        self.available
    }

    /// Estimated cost of the order.
    #[must_use]
    pub const fn required(&self) -> Decimal {
        self.required
    }

    /// Missing amount, always positive.
    #[must_use]
    pub const fn deficit(&self) -> Decimal {
        self.deficit
    }
}

impl fmt::Display for InsufficientFunds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing {} (available {}, required {})",
            self.deficit, self.available, self.required
        )
    }
}

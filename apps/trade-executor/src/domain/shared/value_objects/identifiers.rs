//! Order identifiers.
//!
//! Client IDs are ours, broker IDs are Alpaca's; keeping them as separate
//! types stops one being polled with the other.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! order_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

order_id_type!(ClientOrderId, "Identifier we attach to an order at submission.");
order_id_type!(BrokerOrderId, "Identifier the broker assigns to an accepted order.");

impl ClientOrderId {
    /// Generate a fresh client order ID (`te-<uuid v4>`).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("te-{}", uuid::Uuid::new_v4()))
    }
}

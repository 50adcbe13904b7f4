//! Symbol value object for equity tickers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Longest ticker the broker accepts for equities.
const MAX_SYMBOL_LEN: usize = 12;

/// A trading symbol (equity ticker such as "AAPL" or "BRK.B").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Validate the symbol for order submission.
    ///
    /// # Errors
    ///
    /// Returns error if symbol is empty, too long, or contains invalid characters.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol cannot be empty".to_string(),
            });
        }

        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol exceeds maximum length".to_string(),
            });
        }

        // Share classes use a dot (BRK.B)
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.')
        {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol contains invalid characters".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_new_normalizes_case() {
        let s = Symbol::new(" aapl ");
        assert_eq!(s.as_str(), "AAPL");
    }

    #[test]
    fn symbol_display() {
        let s = Symbol::new("TSLA");
        assert_eq!(format!("{s}"), "TSLA");
    }

    #[test]
    fn symbol_validate_empty() {
        assert!(Symbol::new("").validate().is_err());
        assert!(Symbol::new("   ").validate().is_err());
    }

    #[test]
    fn symbol_validate_too_long() {
        let s = Symbol::new("A".repeat(20));
        assert!(s.validate().is_err());
    }

    #[test]
    fn symbol_validate_invalid_chars() {
        assert!(Symbol::new("AAPL!").validate().is_err());
        assert!(Symbol::new("AA PL").validate().is_err());
        assert!(Symbol::new("AAPL/USD").validate().is_err());
    }

    #[test]
    fn symbol_validate_valid() {
        assert!(Symbol::new("AAPL").validate().is_ok());
        assert!(Symbol::new("brk.b").validate().is_ok());
    }

    #[test]
    fn symbol_serde_is_transparent() {
        let s = Symbol::new("AAPL");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"AAPL\"");

        let parsed: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn symbol_hash_ignores_case() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Symbol::new("AAPL"));
        set.insert(Symbol::new("TSLA"));
        set.insert(Symbol::new("aapl"));

        assert_eq!(set.len(), 2);
    }
}

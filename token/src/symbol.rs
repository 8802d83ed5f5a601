//! Asset class symbols.

use crate::error::TokenError;
use fungible_types::params::MAX_SYMBOL_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short asset-class name such as `"USD"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TokenError::InvalidSymbol("symbol is empty".into()));
        }
        if s.len() > MAX_SYMBOL_LEN {
            return Err(TokenError::InvalidSymbol(format!(
                "'{s}' is longer than {MAX_SYMBOL_LEN} characters"
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TokenError::InvalidSymbol(format!("'{s}' contains whitespace")));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_codes() {
        assert_eq!(Symbol::new("USD").unwrap().as_str(), "USD");
    }

    #[test]
    fn rejects_empty_long_or_spaced() {
        assert!(Symbol::new("").is_err());
        assert!(Symbol::new("X".repeat(MAX_SYMBOL_LEN + 1)).is_err());
        assert!(Symbol::new("US D").is_err());
    }
}

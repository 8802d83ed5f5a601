//! Token construction errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),
}

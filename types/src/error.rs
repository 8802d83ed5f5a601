//! Errors raised while constructing fundamental values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("scale {0} exceeds the maximum supported scale")]
    ScaleTooLarge(u8),

    #[error("invalid party name: {0}")]
    InvalidPartyName(String),
}

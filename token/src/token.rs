//! Token representation.

use crate::error::TokenError;
use crate::symbol::Symbol;
use fungible_types::{Amount, IdentityHash};
use serde::{Deserialize, Serialize};

/// A token: an amount of `(issuer, symbol)` held by `owner`.
///
/// Immutable once built. The constructor enforces a strictly positive amount at
/// the expected scale; tokens that arrive over the wire skip the constructor,
/// which is why the rule engine re-checks positivity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    issuer: IdentityHash,
    owner: IdentityHash,
    amount: Amount,
    symbol: Symbol,
    /// Free-form label carried through transitions; ignored for fungibility.
    tag: String,
}

/// The fungibility class of a token.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetKey {
    pub issuer: IdentityHash,
    pub symbol: Symbol,
}

impl Token {
    pub fn new(
        issuer: IdentityHash,
        owner: IdentityHash,
        amount: Amount,
        symbol: Symbol,
        tag: impl Into<String>,
        scale: u8,
    ) -> Result<Self, TokenError> {
        if amount.scale() != scale {
            return Err(TokenError::InvalidAmount(format!(
                "{amount} has scale {}, expected {scale}",
                amount.scale()
            )));
        }
        if amount.is_zero() {
            return Err(TokenError::InvalidAmount("amount must be positive".into()));
        }
        Ok(Self {
            issuer,
            owner,
            amount,
            symbol,
            tag: tag.into(),
        })
    }

    /// A fresh token of the same asset and tag for a new owner and amount.
    pub fn reissue_to(&self, owner: IdentityHash, amount: Amount) -> Result<Self, TokenError> {
        Self::new(
            self.issuer,
            owner,
            amount,
            self.symbol.clone(),
            self.tag.clone(),
            self.amount.scale(),
        )
    }

    /// Two tokens are fungible iff issuer and symbol match.
    pub fn is_fungible_with(&self, other: &Token) -> bool {
        self.issuer == other.issuer && self.symbol == other.symbol
    }

    pub fn asset(&self) -> AssetKey {
        AssetKey {
            issuer: self.issuer,
            symbol: self.symbol.clone(),
        }
    }

    pub fn issuer(&self) -> &IdentityHash {
        &self.issuer
    }

    pub fn owner(&self) -> &IdentityHash {
        &self.owner
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

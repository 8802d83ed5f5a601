//! Party identities.
//!
//! A [`PartyName`] is the human-readable name a party is known by in the
//! membership directory (e.g. `"CN=Alice, O=Bank, C=GB"`). Tokens never embed
//! names; they embed an [`IdentityHash`], the SHA-256 fingerprint of the party's
//! ledger key.

use crate::error::TypesError;
use crate::hash::hex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable party name as registered in the member directory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyName(String);

impl PartyName {
    /// Parse a party name, trimming surrounding whitespace.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::InvalidPartyName("name is empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-length identity fingerprint of a party's ledger key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityHash([u8; 32]);

impl IdentityHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

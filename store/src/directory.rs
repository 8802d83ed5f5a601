//! Member directory contract.

use crate::StoreError;
use fungible_crypto::identity_hash;
use fungible_types::{IdentityHash, PartyName, PublicKey};
use serde::{Deserialize, Serialize};

/// A network member as the directory knows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: PartyName,
    /// SHA-256 fingerprint of the first ledger key.
    pub identity: IdentityHash,
    pub ledger_keys: Vec<PublicKey>,
    pub is_notary: bool,
}

impl Member {
    pub fn new(
        name: PartyName,
        ledger_keys: Vec<PublicKey>,
        is_notary: bool,
    ) -> Result<Self, StoreError> {
        let first = ledger_keys
            .first()
            .ok_or_else(|| StoreError::InvalidMember(format!("{name} has no ledger keys")))?;
        Ok(Self {
            identity: identity_hash(first),
            name,
            ledger_keys,
            is_notary,
        })
    }
}

/// Resolves human-readable party names to identities and keys.
pub trait MemberDirectory: Send + Sync {
    fn lookup(&self, name: &PartyName) -> Result<Option<Member>, StoreError>;

    fn lookup_identity(&self, identity: &IdentityHash) -> Result<Option<Member>, StoreError>;

    /// Names of every member acting as a notary.
    fn notaries(&self) -> Result<Vec<PartyName>, StoreError>;
}

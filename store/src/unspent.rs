//! Unspent-output index contract.

use crate::{StoreError, TokenFilter};
use fungible_token::{Token, UnspentToken};
use fungible_types::{PartyName, StateRef, TxHash};
use serde::{Deserialize, Serialize};

/// The effect of one notarised transaction on a party's vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub tx_id: TxHash,
    pub notary: PartyName,
    /// Refs consumed by the transaction. Refs the vault never held are ignored.
    pub spent: Vec<StateRef>,
    /// Outputs to record, already filtered to the ones this vault tracks.
    pub produced: Vec<(StateRef, Token)>,
}

/// Trait for a party's index of unspent outputs.
///
/// Keys are [`StateRef`]s. The index assigns each recorded output a commit
/// sequence number, strictly increasing per index, which defines "oldest".
pub trait UnspentIndex: Send + Sync {
    /// All unspent outputs matching `filter`, ordered oldest first
    /// (by sequence, then by `StateRef`).
    fn query(&self, filter: &TokenFilter) -> Result<Vec<UnspentToken>, StoreError>;

    /// Look up a single output. `None` once spent or if never recorded.
    fn get(&self, state_ref: &StateRef) -> Result<Option<UnspentToken>, StoreError>;

    /// Atomically remove the spent refs and insert the produced outputs.
    ///
    /// Fails with `Duplicate` without changing anything if a produced ref is
    /// already present. Applying the same record twice fails the same way.
    fn apply(&self, commit: &CommitRecord) -> Result<(), StoreError>;

    /// Number of unspent outputs currently held.
    fn unspent_count(&self) -> Result<usize, StoreError>;

    fn contains(&self, state_ref: &StateRef) -> Result<bool, StoreError> {
        Ok(self.get(state_ref)?.is_some())
    }
}

/// Sort into the canonical candidate order used by every index.
pub fn sort_oldest_first(tokens: &mut [UnspentToken]) {
    tokens.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.state_ref.cmp(&b.state_ref))
    });
}

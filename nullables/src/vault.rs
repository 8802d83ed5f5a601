//! Nullable vault: in-memory unspent-output index.

use fungible_store::{sort_oldest_first, CommitRecord, StoreError, TokenFilter, UnspentIndex};
use fungible_token::UnspentToken;
use fungible_types::StateRef;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct VaultState {
    unspent: HashMap<StateRef, UnspentToken>,
    next_sequence: u64,
}

/// An in-memory vault for one party.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct MemoryVault {
    state: Mutex<VaultState>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnspentIndex for MemoryVault {
    fn query(&self, filter: &TokenFilter) -> Result<Vec<UnspentToken>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<UnspentToken> = state
            .unspent
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_oldest_first(&mut found);
        Ok(found)
    }

    fn get(&self, state_ref: &StateRef) -> Result<Option<UnspentToken>, StoreError> {
        Ok(self.state.lock().unwrap().unspent.get(state_ref).cloned())
    }

    fn apply(&self, commit: &CommitRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some((dup, _)) = commit
            .produced
            .iter()
            .find(|(r, _)| state.unspent.contains_key(r))
        {
            return Err(StoreError::Duplicate(dup.to_string()));
        }

        for r in &commit.spent {
            state.unspent.remove(r);
        }
        for (r, token) in &commit.produced {
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.unspent.insert(
                *r,
                UnspentToken {
                    state_ref: *r,
                    token: token.clone(),
                    notary: commit.notary.clone(),
                    sequence,
                },
            );
        }
        Ok(())
    }

    fn unspent_count(&self) -> Result<usize, StoreError> {
        Ok(self.state.lock().unwrap().unspent.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fungible_token::{AssetKey, Symbol, Token};
    use fungible_types::{Amount, IdentityHash, PartyName, TxHash};

    fn usd(owner: u8, raw: u128) -> Token {
        Token::new(
            IdentityHash::new([1; 32]),
            IdentityHash::new([owner; 32]),
            Amount::new(raw, 2),
            Symbol::new("USD").unwrap(),
            "",
            2,
        )
        .unwrap()
    }

    fn record(seed: u8, spent: Vec<StateRef>, produced: Vec<Token>) -> CommitRecord {
        let tx_id = TxHash::new([seed; 32]);
        CommitRecord {
            tx_id,
            notary: PartyName::parse("Notary").unwrap(),
            spent,
            produced: produced
                .into_iter()
                .enumerate()
                .map(|(i, t)| (StateRef::new(tx_id, i as u32), t))
                .collect(),
        }
    }

    fn all_usd() -> TokenFilter {
        TokenFilter::for_asset(AssetKey {
            issuer: IdentityHash::new([1; 32]),
            symbol: Symbol::new("USD").unwrap(),
        })
    }

    #[test]
    fn query_returns_oldest_first() {
        let vault = MemoryVault::new();
        vault.apply(&record(9, vec![], vec![usd(2, 100)])).unwrap();
        vault.apply(&record(1, vec![], vec![usd(2, 200)])).unwrap();

        let found = vault.query(&all_usd()).unwrap();
        let amounts: Vec<u128> = found.iter().map(|t| t.token.amount().raw()).collect();
        assert_eq!(amounts, vec![100, 200]);
        assert!(found[0].sequence < found[1].sequence);
    }

    #[test]
    fn apply_spends_and_produces() {
        let vault = MemoryVault::new();
        let first = record(1, vec![], vec![usd(2, 100)]);
        vault.apply(&first).unwrap();
        let spent = first.produced[0].0;

        vault.apply(&record(2, vec![spent], vec![usd(3, 100)])).unwrap();
        assert!(!vault.contains(&spent).unwrap());
        assert_eq!(vault.unspent_count().unwrap(), 1);
    }

    #[test]
    fn duplicate_output_changes_nothing() {
        let vault = MemoryVault::new();
        let first = record(1, vec![], vec![usd(2, 100)]);
        vault.apply(&first).unwrap();

        let replay = CommitRecord {
            spent: vec![StateRef::new(TxHash::new([7; 32]), 0)],
            ..first.clone()
        };
        assert!(matches!(vault.apply(&replay), Err(StoreError::Duplicate(_))));
        assert_eq!(vault.unspent_count().unwrap(), 1);
    }

    #[test]
    fn unknown_spent_refs_are_ignored() {
        let vault = MemoryVault::new();
        let stranger = StateRef::new(TxHash::new([5; 32]), 3);
        vault.apply(&record(1, vec![stranger], vec![usd(2, 100)])).unwrap();
        assert_eq!(vault.unspent_count().unwrap(), 1);
    }
}

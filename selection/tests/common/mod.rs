#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use fungible_selection::{ClaimConfig, ClaimCriteria, ClaimManager};
use fungible_store::{sort_oldest_first, CommitRecord, StoreError, TokenFilter, UnspentIndex};
use fungible_token::{AssetKey, Symbol, Token, UnspentToken};
use fungible_types::{Amount, Clock, IdentityHash, PartyName, StateRef, Timestamp, TxHash};

/// Minimal vault for exercising the claim manager.
#[derive(Default)]
pub struct TestIndex {
    tokens: Mutex<HashMap<StateRef, UnspentToken>>,
    sequence: AtomicU64,
}

impl TestIndex {
    pub fn insert(&self, seed: u8, owner: u8, raw: u128) -> StateRef {
        self.insert_output(seed, 0, owner, raw)
    }

    /// Insert output `index` of the transaction derived from `seed`.
    pub fn insert_output(&self, seed: u8, index: u32, owner: u8, raw: u128) -> StateRef {
        let state_ref = StateRef::new(TxHash::new([seed; 32]), index);
        let token = usd(owner, raw);
        self.tokens.lock().unwrap().insert(
            state_ref,
            UnspentToken {
                state_ref,
                token,
                notary: notary(),
                sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            },
        );
        state_ref
    }

    pub fn remove(&self, state_ref: &StateRef) {
        self.tokens.lock().unwrap().remove(state_ref);
    }
}

impl UnspentIndex for TestIndex {
    fn query(&self, filter: &TokenFilter) -> Result<Vec<UnspentToken>, StoreError> {
        let mut found: Vec<UnspentToken> = self
            .tokens
            .lock()
            .unwrap()
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_oldest_first(&mut found);
        Ok(found)
    }

    fn get(&self, state_ref: &StateRef) -> Result<Option<UnspentToken>, StoreError> {
        Ok(self.tokens.lock().unwrap().get(state_ref).cloned())
    }

    fn apply(&self, commit: &CommitRecord) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        for r in &commit.spent {
            tokens.remove(r);
        }
        for (r, token) in &commit.produced {
            tokens.insert(
                *r,
                UnspentToken {
                    state_ref: *r,
                    token: token.clone(),
                    notary: commit.notary.clone(),
                    sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
                },
            );
        }
        Ok(())
    }

    fn unspent_count(&self) -> Result<usize, StoreError> {
        Ok(self.tokens.lock().unwrap().len())
    }
}

pub struct TestClock(AtomicU64);

impl TestClock {
    pub fn new(secs: u64) -> Self {
        Self(AtomicU64::new(secs))
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.0.load(Ordering::SeqCst))
    }
}

pub fn id(n: u8) -> IdentityHash {
    IdentityHash::new([n; 32])
}

pub fn notary() -> PartyName {
    PartyName::parse("Notary").unwrap()
}

pub fn usd(owner: u8, raw: u128) -> Token {
    Token::new(id(1), id(owner), Amount::new(raw, 2), Symbol::new("USD").unwrap(), "", 2).unwrap()
}

pub fn asset() -> AssetKey {
    AssetKey {
        issuer: id(1),
        symbol: Symbol::new("USD").unwrap(),
    }
}

pub fn criteria(owner: u8, raw: u128) -> ClaimCriteria {
    ClaimCriteria {
        filter: TokenFilter::for_asset(asset()).owned_by(id(owner)).at_notary(notary()),
        target: Amount::new(raw, 2),
        label: "test".into(),
    }
}

pub fn manager(index: Arc<TestIndex>, clock: Arc<TestClock>) -> Arc<ClaimManager> {
    Arc::new(ClaimManager::new(index, clock, ClaimConfig {
        scale: 2,
        lease_secs: 60,
        max_retries: 4,
    }))
}

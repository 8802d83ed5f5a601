//! The claim manager.

use crate::claim::{Claim, ClaimCriteria, ClaimId, ClaimOutcome, ClaimState};
use crate::error::SelectionError;
use fungible_store::{CommitRecord, TokenFilter, UnspentIndex};
use fungible_token::{AssetKey, UnspentToken};
use fungible_types::params::{DEFAULT_CLAIM_LEASE_SECS, DEFAULT_MAX_CLAIM_RETRIES, MAX_CLAIM_INPUTS};
use fungible_types::{Amount, Clock, StateRef, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct ClaimConfig {
    /// Fixed-point scale of every amount this manager handles.
    pub scale: u8,
    /// How long an open claim is honoured before its refs become selectable again.
    pub lease_secs: u64,
    /// Fresh-snapshot retries when the index changes under a claim attempt.
    pub max_retries: u32,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            scale: fungible_types::params::DEFAULT_TOKEN_SCALE,
            lease_secs: DEFAULT_CLAIM_LEASE_SECS,
            max_retries: DEFAULT_MAX_CLAIM_RETRIES,
        }
    }
}

/// Which tokens a balance query counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BalanceView {
    /// Unspent and not held by any open claim.
    #[default]
    Spendable,
    /// Unspent, whether claimed or not.
    IncludingPending,
}

struct OpenClaim {
    refs: Vec<StateRef>,
    expires_at: Timestamp,
    label: String,
}

/// Claim table for one asset.
#[derive(Default)]
struct ClaimShard {
    holders: HashMap<StateRef, ClaimId>,
    open: HashMap<ClaimId, OpenClaim>,
}

impl ClaimShard {
    /// Drop claims whose lease has run out.
    fn sweep_expired(&mut self, now: Timestamp) {
        let expired: Vec<ClaimId> = self
            .open
            .iter()
            .filter(|(_, c)| c.expires_at.is_past(now))
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            if let Some(claim) = self.remove(id) {
                warn!(claim = %id, label = %claim.label, refs = claim.refs.len(), "claim lease expired, releasing");
            }
        }
    }

    fn remove(&mut self, id: ClaimId) -> Option<OpenClaim> {
        let claim = self.open.remove(&id)?;
        for r in &claim.refs {
            if self.holders.get(r) == Some(&id) {
                self.holders.remove(r);
            }
        }
        Some(claim)
    }
}

/// Reserves unspent outputs for in-flight transactions.
///
/// All mutation of the claim table (mark, release, commit) happens under the
/// mutex of the asset's shard, and the index is re-checked under that mutex, so
/// two attempts can never both hold the same ref.
pub struct ClaimManager {
    index: Arc<dyn UnspentIndex>,
    clock: Arc<dyn Clock>,
    config: ClaimConfig,
    shards: Mutex<HashMap<AssetKey, Arc<Mutex<ClaimShard>>>>,
    next_claim: AtomicU64,
}

impl ClaimManager {
    pub fn new(index: Arc<dyn UnspentIndex>, clock: Arc<dyn Clock>, config: ClaimConfig) -> Self {
        Self {
            index,
            clock,
            config,
            shards: Mutex::new(HashMap::new()),
            next_claim: AtomicU64::new(1),
        }
    }

    pub fn index(&self) -> &Arc<dyn UnspentIndex> {
        &self.index
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    fn shard(&self, asset: &AssetKey) -> Arc<Mutex<ClaimShard>> {
        let mut shards = self.shards.lock().unwrap();
        shards.entry(asset.clone()).or_default().clone()
    }

    /// Select and reserve tokens matching `criteria.filter` worth at least
    /// `criteria.target`.
    ///
    /// Candidates are taken oldest first. Refs held by another open claim are
    /// skipped. Refs that vanished from the index since the snapshot trigger a
    /// fresh snapshot, at most `max_retries` times, after which the attempt
    /// gives up with `InsufficientFunds`. Nothing is marked unless the whole
    /// target is covered, so a failed attempt leaves no partial claim behind.
    ///
    /// At most `MAX_CLAIM_INPUTS` tokens go into one claim. A shortfall still
    /// reports everything selectable as `available` and sets
    /// `input_limit_reached` when the cap, not the balance, was the problem.
    pub fn try_claim(&self, criteria: ClaimCriteria) -> Result<ClaimOutcome, SelectionError> {
        let target = criteria.target;
        if target.scale() != self.config.scale {
            return Err(SelectionError::InvalidTarget(format!(
                "{target} has scale {}, expected {}",
                target.scale(),
                self.config.scale
            )));
        }
        if target.is_zero() {
            return Err(SelectionError::InvalidTarget("target must be positive".into()));
        }

        let shard = self.shard(&criteria.filter.asset);
        let mut best = Amount::zero(self.config.scale);
        let mut capped = false;

        for attempt in 0..=self.config.max_retries {
            let candidates = self.index.query(&criteria.filter)?;

            let mut table = shard.lock().unwrap();
            table.sweep_expired(self.clock.now());

            let mut picked: Vec<UnspentToken> = Vec::new();
            let mut total = Amount::zero(self.config.scale);
            // Everything selectable, including tokens left out by the input cap.
            let mut selectable = Amount::zero(self.config.scale);
            let mut stale = 0usize;

            for candidate in candidates {
                if total >= target {
                    break;
                }
                if table.holders.contains_key(&candidate.state_ref) {
                    continue;
                }
                if !self.index.contains(&candidate.state_ref)? {
                    stale += 1;
                    continue;
                }
                let amount = candidate.token.amount();
                if let Some(sum) = selectable.checked_add(amount) {
                    selectable = sum;
                }
                if picked.len() >= MAX_CLAIM_INPUTS {
                    capped = true;
                    continue;
                }
                let Some(sum) = total.checked_add(amount) else {
                    break;
                };
                total = sum;
                picked.push(candidate);
            }

            if total >= target {
                let id = ClaimId(self.next_claim.fetch_add(1, Ordering::Relaxed));
                let expires_at = self.clock.now().plus_secs(self.config.lease_secs);
                let refs: Vec<StateRef> = picked.iter().map(|t| t.state_ref).collect();
                for r in &refs {
                    table.holders.insert(*r, id);
                }
                table.open.insert(
                    id,
                    OpenClaim {
                        refs,
                        expires_at,
                        label: criteria.label.clone(),
                    },
                );
                debug!(
                    claim = %id,
                    label = %criteria.label,
                    inputs = picked.len(),
                    %total,
                    %target,
                    attempt,
                    "claimed tokens"
                );
                return Ok(ClaimOutcome::Claimed(Claim {
                    id,
                    criteria,
                    tokens: picked,
                    total,
                    expires_at,
                    state: ClaimState::Open,
                }));
            }

            if selectable > best {
                best = selectable;
            }
            if stale == 0 {
                break;
            }
            debug!(label = %criteria.label, stale, attempt, "index changed during claim, retrying");
        }

        debug!(
            label = %criteria.label,
            %target,
            available = %best,
            input_limit_reached = capped,
            "insufficient funds"
        );
        Ok(ClaimOutcome::InsufficientFunds {
            requested: target,
            available: best,
            input_limit_reached: capped,
        })
    }

    /// Release an open claim so its refs become selectable again.
    ///
    /// Releasing a claim that is already released, committed or expired is a no-op.
    pub fn release(&self, claim: &mut Claim) {
        if claim.state != ClaimState::Open {
            return;
        }
        let shard = self.shard(&claim.criteria.filter.asset);
        let mut table = shard.lock().unwrap();
        if table.remove(claim.id).is_some() {
            debug!(claim = %claim.id, label = %claim.criteria.label, "released claim");
        }
        claim.state = ClaimState::Released;
    }

    /// Convert an open claim into a permanent spend by applying the notarised
    /// transaction's effect to the index.
    ///
    /// The record must spend every claimed ref. The index is updated even if
    /// the lease ran out in the meantime, since the notary has already
    /// consumed the inputs.
    pub fn commit(&self, claim: &mut Claim, record: &CommitRecord) -> Result<(), SelectionError> {
        if claim.state != ClaimState::Open {
            return Err(SelectionError::NotOpen(claim.id.to_string()));
        }
        if let Some(missing) = claim.refs().find(|r| !record.spent.contains(r)) {
            return Err(SelectionError::CommitMismatch(missing.to_string()));
        }

        let shard = self.shard(&claim.criteria.filter.asset);
        let mut table = shard.lock().unwrap();
        table.sweep_expired(self.clock.now());
        if !table.open.contains_key(&claim.id) {
            warn!(claim = %claim.id, tx = %record.tx_id, "committing a claim whose lease already expired");
        }
        self.index.apply(record)?;
        table.remove(claim.id);
        claim.state = ClaimState::Committed;
        debug!(claim = %claim.id, tx = %record.tx_id, "committed claim");
        Ok(())
    }

    /// Apply a notarised transaction that consumed no claim of ours, such as an
    /// issuance or a transaction we only co-signed or received outputs from.
    pub fn record_unclaimed(&self, asset: &AssetKey, record: &CommitRecord) -> Result<(), SelectionError> {
        let shard = self.shard(asset);
        let _table = shard.lock().unwrap();
        self.index.apply(record)?;
        debug!(tx = %record.tx_id, produced = record.produced.len(), "recorded transaction");
        Ok(())
    }

    /// Sum of unspent tokens matching `filter`.
    pub fn balance(&self, filter: &TokenFilter, view: BalanceView) -> Result<Amount, SelectionError> {
        let tokens = self.index.query(filter)?;
        let shard = self.shard(&filter.asset);
        let mut table = shard.lock().unwrap();
        table.sweep_expired(self.clock.now());

        let counted: Vec<Amount> = tokens
            .iter()
            .filter(|t| view == BalanceView::IncludingPending || !table.holders.contains_key(&t.state_ref))
            .map(|t| t.token.amount())
            .collect();
        Amount::checked_sum(&counted, self.config.scale).ok_or(SelectionError::Overflow)
    }

    /// Number of open claims across all assets.
    pub fn open_claims(&self) -> usize {
        let now = self.clock.now();
        let shards: Vec<Arc<Mutex<ClaimShard>>> = self.shards.lock().unwrap().values().cloned().collect();
        shards
            .iter()
            .map(|s| {
                let mut table = s.lock().unwrap();
                table.sweep_expired(now);
                table.open.len()
            })
            .sum()
    }
}

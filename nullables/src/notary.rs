//! Nullable notary: a single in-memory arbiter of output consumption.

use async_trait::async_trait;
use fungible_finality::{FinalityError, Notary, NotaryAttestation, NotaryVerdict};
use fungible_token::Token;
use fungible_transactions::{validate, SignedTransaction};
use fungible_types::{Clock, KeyPair, PartyName, StateRef, TxHash};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Default)]
struct Ledger {
    unspent: HashMap<StateRef, Token>,
    consumed: HashMap<StateRef, TxHash>,
    notarised: HashSet<TxHash>,
}

/// Notary that keeps the network's full unspent set in memory.
///
/// It resolves input refs against its own ledger, so a transaction can only
/// spend outputs this notary previously confirmed, and each of them only once.
/// Rule validation is repeated here with the verified signer set. Every
/// confirmation is signed with `keys`, which the directory must list for `name`.
pub struct MemoryNotary {
    name: PartyName,
    keys: Arc<KeyPair>,
    clock: Arc<dyn Clock>,
    ledger: Mutex<Ledger>,
    forced_rejection: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
}

impl MemoryNotary {
    pub fn new(name: PartyName, keys: Arc<KeyPair>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            keys,
            clock,
            ledger: Mutex::new(Ledger::default()),
            forced_rejection: Mutex::new(None),
            delay: Mutex::new(None),
        }
    }

    /// Reject every submission with `reason` until cleared with `None`.
    pub fn force_rejection(&self, reason: Option<String>) {
        *self.forced_rejection.lock().unwrap() = reason;
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn is_unspent(&self, state_ref: &StateRef) -> bool {
        self.ledger.lock().unwrap().unspent.contains_key(state_ref)
    }

    pub fn notarised_count(&self) -> usize {
        self.ledger.lock().unwrap().notarised.len()
    }

    fn arbitrate(&self, stx: &SignedTransaction) -> Result<NotaryVerdict, FinalityError> {
        let tx = &stx.tx;
        tx.verify_id()?;
        if tx.notary != self.name {
            return Ok(NotaryVerdict::Rejected(format!("transaction is assigned to notary {}", tx.notary)));
        }
        if tx.valid_until.is_past(self.clock.now()) {
            return Ok(NotaryVerdict::Rejected(format!("validity window closed at {}", tx.valid_until)));
        }

        let mut ledger = self.ledger.lock().unwrap();
        if ledger.notarised.contains(&tx.id) {
            return Ok(NotaryVerdict::Rejected(format!("transaction {} already notarised", tx.id)));
        }

        let mut inputs = Vec::with_capacity(tx.inputs.len());
        for r in &tx.inputs {
            match ledger.unspent.get(r) {
                Some(token) => inputs.push(token.clone()),
                None => {
                    let reason = match ledger.consumed.get(r) {
                        Some(by) => format!("input {r} already consumed by {by}"),
                        None => format!("input {r} is unknown"),
                    };
                    return Ok(NotaryVerdict::Rejected(reason));
                }
            }
        }

        let signers = match stx.verified_signers() {
            Ok(signers) => signers,
            Err(e) => return Ok(NotaryVerdict::Rejected(e.to_string())),
        };
        if let Err(violation) = validate(tx.action, &inputs, &tx.outputs, &signers) {
            return Ok(NotaryVerdict::Rejected(violation.to_string()));
        }
        if let Some(missing) = stx.missing_signers().first() {
            return Ok(NotaryVerdict::Rejected(format!("missing signature from {missing}")));
        }

        for r in &tx.inputs {
            ledger.unspent.remove(r);
            ledger.consumed.insert(*r, tx.id);
        }
        for (r, token) in tx.output_refs() {
            ledger.unspent.insert(r, token.clone());
        }
        ledger.notarised.insert(tx.id);
        Ok(NotaryVerdict::Confirmed(NotaryAttestation::create(
            &tx.id,
            self.name.clone(),
            &self.keys,
        )))
    }
}

#[async_trait]
impl Notary for MemoryNotary {
    fn name(&self) -> &PartyName {
        &self.name
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<NotaryVerdict, FinalityError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let forced = self.forced_rejection.lock().unwrap().clone();
        if let Some(reason) = forced {
            warn!(tx = %tx.tx.id, %reason, "notary rejecting by request");
            return Ok(NotaryVerdict::Rejected(reason));
        }

        let verdict = self.arbitrate(tx)?;
        match &verdict {
            NotaryVerdict::Confirmed(_) => debug!(tx = %tx.tx.id, "notarised"),
            NotaryVerdict::Rejected(reason) => warn!(tx = %tx.tx.id, %reason, "notary rejected transaction"),
        }
        Ok(verdict)
    }
}

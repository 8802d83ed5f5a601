//! Initiator side of the finality handshake.

use crate::error::FinalityError;
use crate::message::FinalityMessage;
use crate::notary::{Notary, NotaryAttestation, NotaryVerdict};
use crate::record::{asset_of, commit_record_for};
use crate::session::{Session, SessionOpener};
use fungible_selection::{ClaimGuard, ClaimManager};
use fungible_store::MemberDirectory;
use fungible_token::Token;
use fungible_transactions::{validate, ProposedTransaction, SignedTransaction};
use fungible_types::{Clock, IdentityHash, KeyPair, PartyName, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug)]
pub struct FinalityTimeouts {
    /// Budget for opening sessions and collecting every counterparty reply.
    pub session: Duration,
    /// Budget for the notary round trip.
    pub notary: Duration,
}

impl Default for FinalityTimeouts {
    fn default() -> Self {
        Self {
            session: Duration::from_secs(30),
            notary: Duration::from_secs(30),
        }
    }
}

/// One transaction to drive to finality.
pub struct FinalityRequest {
    pub tx: ProposedTransaction,
    /// Tokens behind `tx.inputs`, in the same order.
    pub input_tokens: Vec<Token>,
    /// Parties to open sessions to. The initiator itself is skipped.
    pub counterparties: Vec<PartyName>,
    /// Reservation over `tx.inputs`; `None` for issuance.
    pub claim: Option<ClaimGuard>,
}

pub struct FinalityCoordinator {
    name: PartyName,
    identity: IdentityHash,
    keys: Arc<KeyPair>,
    directory: Arc<dyn MemberDirectory>,
    sessions: Arc<dyn SessionOpener>,
    notary: Arc<dyn Notary>,
    claims: Arc<ClaimManager>,
    clock: Arc<dyn Clock>,
    timeouts: FinalityTimeouts,
}

impl FinalityCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: PartyName,
        identity: IdentityHash,
        keys: Arc<KeyPair>,
        directory: Arc<dyn MemberDirectory>,
        sessions: Arc<dyn SessionOpener>,
        notary: Arc<dyn Notary>,
        claims: Arc<ClaimManager>,
        clock: Arc<dyn Clock>,
        timeouts: FinalityTimeouts,
    ) -> Self {
        Self {
            name,
            identity,
            keys,
            directory,
            sessions,
            notary,
            claims,
            clock,
            timeouts,
        }
    }

    /// Run the handshake.
    ///
    /// On success the transaction is notarised, committed to our vault and
    /// every counterparty has been told. On failure nothing is committed and
    /// the claim is released, including when this future is dropped early.
    pub async fn finalize(&self, request: FinalityRequest) -> Result<SignedTransaction, FinalityError> {
        let FinalityRequest {
            tx,
            input_tokens,
            counterparties,
            claim,
        } = request;
        let tx_id = tx.id;
        info!(tx = %tx_id, action = %tx.action, inputs = tx.inputs.len(), outputs = tx.outputs.len(), "finalizing transaction");

        let mut stx = SignedTransaction::new(tx);
        let mut sessions: Vec<Session> = Vec::new();

        let agreed = self
            .agree(&mut stx, &input_tokens, &counterparties, &mut sessions)
            .await;
        let attestation = match agreed {
            Ok(attestation) => attestation,
            Err(e) => {
                warn!(tx = %tx_id, error = %e, "finality aborted, releasing claim");
                abort_sessions(&sessions, &e.to_string()).await;
                if let Some(guard) = claim {
                    guard.release();
                }
                return Err(e);
            }
        };

        // The notary has confirmed: from here on the transaction is final.
        let record = commit_record_for(&stx, &self.identity);
        let committed = match claim {
            Some(guard) => guard.commit(&record),
            None => match asset_of(&stx, &input_tokens) {
                Some(asset) => self.claims.record_unclaimed(&asset, &record),
                None => Ok(()),
            },
        };

        self.announce(&mut sessions, &stx, attestation).await;

        if let Err(e) = committed {
            error!(tx = %tx_id, error = %e, "notarised transaction could not be committed locally");
            return Err(e.into());
        }
        info!(tx = %tx_id, "transaction finalized");
        Ok(stx)
    }

    /// Phase one (signatures) and phase two (notary).
    async fn agree(
        &self,
        stx: &mut SignedTransaction,
        input_tokens: &[Token],
        counterparties: &[PartyName],
        sessions: &mut Vec<Session>,
    ) -> Result<NotaryAttestation, FinalityError> {
        if stx.tx.notary != *self.notary.name() {
            return Err(FinalityError::Protocol(format!(
                "transaction names notary {}, ours is {}",
                stx.tx.notary,
                self.notary.name()
            )));
        }
        if stx.tx.valid_until.is_past(self.clock.now()) {
            return Err(FinalityError::Timeout {
                stage: "proposing an already expired transaction".into(),
            });
        }
        validate(stx.tx.action, input_tokens, &stx.tx.outputs, &stx.tx.required_signers)?;
        stx.sign(&self.keys);

        let deadline = self.deadline(self.timeouts.session, stx.tx.valid_until);
        let proposal = FinalityMessage::Proposal {
            tx: stx.clone(),
            input_tokens: input_tokens.to_vec(),
        };

        let mut peers: Vec<&PartyName> = counterparties.iter().filter(|p| **p != self.name).collect();
        peers.sort();
        peers.dedup();

        // Each session may only yield a signature by the peer it was opened to.
        let mut peer_identities: Vec<IdentityHash> = Vec::with_capacity(peers.len());
        for peer in peers {
            let member = self
                .directory
                .lookup(peer)?
                .ok_or_else(|| FinalityError::Protocol(format!("{peer} is not in the directory")))?;
            let session = timeout_at(deadline, self.sessions.open(&self.name, peer))
                .await
                .map_err(|_| FinalityError::Timeout {
                    stage: format!("opening session to {peer}"),
                })??;
            session.send(&proposal).await?;
            debug!(tx = %stx.tx.id, %peer, "sent proposal");
            sessions.push(session);
            peer_identities.push(member.identity);
        }

        for (session, expected) in sessions.iter_mut().zip(&peer_identities) {
            let peer = session.peer().clone();
            match session.receive_until(deadline, "awaiting counterparty reply").await? {
                FinalityMessage::Signature(sig) => {
                    if sig.signer != *expected {
                        return Err(FinalityError::Protocol(format!(
                            "{peer} returned a signature by {}, not its own",
                            sig.signer
                        )));
                    }
                    if !stx.tx.required_signers.contains(&sig.signer) {
                        return Err(FinalityError::Protocol(format!(
                            "{peer} signed as {}, which is not a required signer",
                            sig.signer
                        )));
                    }
                    stx.add_signature(sig)?;
                    debug!(tx = %stx.tx.id, %peer, "collected signature");
                }
                FinalityMessage::Acknowledged { tx_id } if tx_id == stx.tx.id => {
                    debug!(tx = %stx.tx.id, %peer, "counterparty acknowledged");
                }
                FinalityMessage::Abort { reason } => {
                    return Err(FinalityError::CounterpartyAbort {
                        party: peer.to_string(),
                        reason,
                    });
                }
                other => {
                    return Err(FinalityError::Protocol(format!(
                        "unexpected {} from {peer}",
                        other.kind()
                    )));
                }
            }
        }

        let missing = stx.missing_signers();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|m| m.to_string()).collect();
            return Err(FinalityError::Protocol(format!(
                "no session produced signatures for {}",
                names.join(", ")
            )));
        }

        let deadline = self.deadline(self.timeouts.notary, stx.tx.valid_until);
        let verdict = timeout_at(deadline, self.notary.submit(&*stx))
            .await
            .map_err(|_| FinalityError::Timeout {
                stage: format!("awaiting notary {}", self.notary.name()),
            })??;
        match verdict {
            NotaryVerdict::Confirmed(attestation) => {
                attestation.verify(&stx.tx, self.directory.as_ref())?;
                debug!(tx = %stx.tx.id, "notary confirmed");
                Ok(attestation)
            }
            NotaryVerdict::Rejected(reason) => Err(FinalityError::NotaryRejected(reason)),
        }
    }

    /// Tell every counterparty the transaction is final and wait, within the
    /// session budget, for each to record it.
    async fn announce(&self, sessions: &mut [Session], stx: &SignedTransaction, attestation: NotaryAttestation) {
        let deadline = Instant::now() + self.timeouts.session;
        let finalized = FinalityMessage::Finalized {
            tx: stx.clone(),
            attestation,
        };
        for session in sessions.iter() {
            if let Err(e) = session.send(&finalized).await {
                warn!(tx = %stx.tx.id, peer = %session.peer(), error = %e, "could not deliver outcome");
            }
        }
        for session in sessions.iter_mut() {
            match session.receive_until(deadline, "awaiting record confirmation").await {
                Ok(FinalityMessage::Recorded { .. }) => {}
                Ok(other) => {
                    warn!(tx = %stx.tx.id, peer = %session.peer(), reply = other.kind(), "counterparty did not record outcome")
                }
                Err(e) => warn!(tx = %stx.tx.id, peer = %session.peer(), error = %e, "counterparty did not record outcome"),
            }
        }
    }

    /// `budget` from now, but never past `valid_until`.
    fn deadline(&self, budget: Duration, valid_until: Timestamp) -> Instant {
        let left = Duration::from_secs(valid_until.secs_until(self.clock.now()));
        Instant::now() + budget.min(left)
    }
}

async fn abort_sessions(sessions: &[Session], reason: &str) {
    let abort = FinalityMessage::Abort {
        reason: reason.to_string(),
    };
    for session in sessions {
        let _ = session.send(&abort).await;
    }
}

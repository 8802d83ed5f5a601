//! Counterparty side of the finality handshake.

use crate::error::FinalityError;
use crate::message::FinalityMessage;
use crate::notary::NotaryAttestation;
use crate::record::{asset_of, commit_record_for};
use crate::session::Session;
use fungible_selection::ClaimManager;
use fungible_store::MemberDirectory;
use fungible_token::Token;
use fungible_transactions::{
    required_signers, validate, SignedTransaction, TransactionSignature, Violation,
};
use fungible_types::{Clock, IdentityHash, KeyPair};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponderState {
    AwaitingProposal,
    Validating,
    /// Co-signed as a required signer.
    Signed,
    /// Accepted as a notified party.
    Acknowledged,
    Aborted(String),
    Finalized,
}

impl ResponderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted(_) | Self::Finalized)
    }
}

/// What a responder needs from its node.
pub struct ResponderContext {
    pub identity: IdentityHash,
    pub keys: Arc<KeyPair>,
    pub claims: Arc<ClaimManager>,
    pub clock: Arc<dyn Clock>,
    /// Source of the notary keys that finalized transactions must carry.
    pub directory: Arc<dyn MemberDirectory>,
}

/// Message-driven state machine for one session.
pub struct ResponderSession<'a> {
    ctx: &'a ResponderContext,
    state: ResponderState,
    proposal: Option<(SignedTransaction, Vec<Token>)>,
}

impl<'a> ResponderSession<'a> {
    pub fn new(ctx: &'a ResponderContext) -> Self {
        Self {
            ctx,
            state: ResponderState::AwaitingProposal,
            proposal: None,
        }
    }

    pub fn state(&self) -> &ResponderState {
        &self.state
    }

    pub fn tx_id(&self) -> Option<String> {
        self.proposal.as_ref().map(|(stx, _)| stx.tx.id.to_string())
    }

    /// Feed one inbound message; returns the reply to send, if any.
    pub fn handle(&mut self, message: FinalityMessage) -> Option<FinalityMessage> {
        if self.state.is_terminal() {
            return None;
        }
        match (self.state.clone(), message) {
            (ResponderState::AwaitingProposal, FinalityMessage::Proposal { tx, input_tokens }) => {
                self.state = ResponderState::Validating;
                match self.check_proposal(&tx, &input_tokens) {
                    Ok(()) => {
                        let reply = if tx.tx.required_signers.contains(&self.ctx.identity) {
                            self.state = ResponderState::Signed;
                            FinalityMessage::Signature(TransactionSignature::create(&tx.tx, &self.ctx.keys))
                        } else {
                            self.state = ResponderState::Acknowledged;
                            FinalityMessage::Acknowledged { tx_id: tx.tx.id }
                        };
                        self.proposal = Some((tx, input_tokens));
                        Some(reply)
                    }
                    Err(e) => {
                        self.proposal = Some((tx, input_tokens));
                        Some(self.abort(e.to_string()))
                    }
                }
            }
            (
                ResponderState::Signed | ResponderState::Acknowledged,
                FinalityMessage::Finalized { tx, attestation },
            ) => {
                match self.record(&tx, &attestation) {
                    Ok(()) => {
                        self.state = ResponderState::Finalized;
                        Some(FinalityMessage::Recorded { tx_id: tx.tx.id })
                    }
                    Err(e) => Some(self.abort(e.to_string())),
                }
            }
            (_, FinalityMessage::Abort { reason }) => {
                self.state = ResponderState::Aborted(format!("initiator aborted: {reason}"));
                None
            }
            (state, other) => {
                let reason = format!("unexpected {} while {:?}", other.kind(), state);
                Some(self.abort(reason))
            }
        }
    }

    /// Give up locally, producing the abort frame for the peer.
    pub fn abort(&mut self, reason: String) -> FinalityMessage {
        self.state = ResponderState::Aborted(reason.clone());
        FinalityMessage::Abort { reason }
    }

    fn check_proposal(&self, stx: &SignedTransaction, input_tokens: &[Token]) -> Result<(), FinalityError> {
        let tx = &stx.tx;
        tx.verify_id()?;
        if tx.valid_until.is_past(self.ctx.clock.now()) {
            return Err(FinalityError::Protocol(format!(
                "transaction expired at {}",
                tx.valid_until
            )));
        }
        if input_tokens.len() != tx.inputs.len() {
            return Err(FinalityError::Protocol(format!(
                "{} input tokens for {} input refs",
                input_tokens.len(),
                tx.inputs.len()
            )));
        }
        if tx.required_signers != required_signers(tx.action, input_tokens, &tx.outputs) {
            return Err(FinalityError::Protocol("required signers do not match the transition".into()));
        }
        validate(tx.action, input_tokens, &tx.outputs, &tx.required_signers)?;
        stx.verified_signers()?;

        // Inputs we hold ourselves must match what the initiator claims they are.
        let index = self.ctx.claims.index();
        for (state_ref, token) in tx.inputs.iter().zip(input_tokens) {
            if let Some(held) = index.get(state_ref)? {
                if &held.token != token {
                    return Err(FinalityError::Protocol(format!(
                        "input {state_ref} does not match our record"
                    )));
                }
            }
        }
        Ok(())
    }

    fn record(&self, stx: &SignedTransaction, attestation: &NotaryAttestation) -> Result<(), FinalityError> {
        let (proposed, input_tokens) = self
            .proposal
            .as_ref()
            .ok_or_else(|| FinalityError::Protocol("finalized before proposal".into()))?;
        if stx.tx != proposed.tx {
            return Err(FinalityError::Protocol("finalized transaction differs from proposal".into()));
        }
        let signers = stx.verified_signers()?;
        validate(stx.tx.action, input_tokens, &stx.tx.outputs, &signers)?;
        if let Some(missing) = stx.missing_signers().first() {
            return Err(Violation::MissingSignature(*missing).into());
        }
        attestation.verify(&stx.tx, self.ctx.directory.as_ref())?;

        let asset = asset_of(stx, input_tokens)
            .ok_or_else(|| FinalityError::Protocol("transaction has no tokens".into()))?;
        let record = commit_record_for(stx, &self.ctx.identity);
        self.ctx.claims.record_unclaimed(&asset, &record)?;
        Ok(())
    }
}

/// Serves inbound sessions for one party.
pub struct Responder {
    ctx: ResponderContext,
    /// Longest wait for the initiator's next frame.
    idle_timeout: Duration,
}

impl Responder {
    pub fn new(ctx: ResponderContext, idle_timeout: Duration) -> Self {
        Self { ctx, idle_timeout }
    }

    /// Drive one session to a terminal state.
    pub async fn serve(&self, mut session: Session) -> ResponderState {
        let peer = session.peer().clone();
        let mut machine = ResponderSession::new(&self.ctx);

        while !machine.state().is_terminal() {
            let message = match timeout(self.idle_timeout, session.receive()).await {
                Ok(Ok(message)) => message,
                Ok(Err(e)) => {
                    machine.abort(e.to_string());
                    break;
                }
                Err(_) => {
                    let abort = machine.abort(format!("no message from {peer} within {:?}", self.idle_timeout));
                    let _ = session.send(&abort).await;
                    break;
                }
            };
            if let Some(reply) = machine.handle(message) {
                if let Err(e) = session.send(&reply).await {
                    machine.abort(e.to_string());
                }
            }
        }

        let tx = machine.tx_id().unwrap_or_else(|| "-".into());
        match machine.state() {
            ResponderState::Finalized => info!(%peer, %tx, "finality session succeeded"),
            state => warn!(%peer, %tx, ?state, "finality session failed"),
        }
        machine.state
    }
}

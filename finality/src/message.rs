//! Session wire messages.

use crate::error::FinalityError;
use crate::notary::NotaryAttestation;
use fungible_token::Token;
use fungible_transactions::{SignedTransaction, TransactionSignature};
use fungible_types::TxHash;
use serde::{Deserialize, Serialize};

/// Every frame exchanged on a finality session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalityMessage {
    /// Initiator -> counterparty. Carries the initiator's signature and the
    /// tokens behind each input ref, in input order.
    Proposal {
        tx: SignedTransaction,
        input_tokens: Vec<Token>,
    },
    /// Counterparty co-signature.
    Signature(TransactionSignature),
    /// A notified party that is not a required signer accepts the proposal.
    Acknowledged { tx_id: TxHash },
    /// Either side vetoes or gives up.
    Abort { reason: String },
    /// Initiator -> counterparty after notary confirmation, with the notary's
    /// signature as proof.
    Finalized {
        tx: SignedTransaction,
        attestation: NotaryAttestation,
    },
    /// Counterparty has recorded the finalized transaction.
    Recorded { tx_id: TxHash },
}

impl FinalityMessage {
    pub fn encode(&self) -> Result<Vec<u8>, FinalityError> {
        bincode::serialize(self).map_err(|e| FinalityError::Transport(format!("encode: {e}")))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FinalityError> {
        bincode::deserialize(bytes).map_err(|e| FinalityError::Transport(format!("decode: {e}")))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Proposal { .. } => "proposal",
            Self::Signature(_) => "signature",
            Self::Acknowledged { .. } => "acknowledged",
            Self::Abort { .. } => "abort",
            Self::Finalized { .. } => "finalized",
            Self::Recorded { .. } => "recorded",
        }
    }
}

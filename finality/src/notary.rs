//! The notary contract.

use crate::error::FinalityError;
use async_trait::async_trait;
use fungible_crypto::{sign_message, verify_signature};
use fungible_store::MemberDirectory;
use fungible_transactions::{ProposedTransaction, SignedTransaction};
use fungible_types::{KeyPair, PartyName, PublicKey, Signature, TxHash};
use serde::{Deserialize, Serialize};

/// A notary's signature over a transaction id: proof that the notary
/// confirmed the transaction and consumed its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryAttestation {
    pub notary: PartyName,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl NotaryAttestation {
    pub fn create(tx_id: &TxHash, notary: PartyName, keys: &KeyPair) -> Self {
        Self {
            notary,
            public_key: keys.public.clone(),
            signature: sign_message(tx_id.as_bytes(), &keys.private),
        }
    }

    /// Check the attestation covers `tx` and was signed with a ledger key the
    /// directory holds for the transaction's notary.
    pub fn verify(&self, tx: &ProposedTransaction, directory: &dyn MemberDirectory) -> Result<(), FinalityError> {
        if self.notary != tx.notary {
            return Err(FinalityError::Protocol(format!(
                "attested by {}, but the transaction names notary {}",
                self.notary, tx.notary
            )));
        }
        let member = directory
            .lookup(&tx.notary)?
            .filter(|m| m.is_notary)
            .ok_or_else(|| FinalityError::Protocol(format!("{} is not a registered notary", tx.notary)))?;
        if !member.ledger_keys.contains(&self.public_key) {
            return Err(FinalityError::Protocol(format!(
                "attestation key is not registered to notary {}",
                tx.notary
            )));
        }
        if !verify_signature(tx.id.as_bytes(), &self.signature, &self.public_key) {
            return Err(FinalityError::Protocol(format!(
                "notary signature does not cover transaction {}",
                tx.id
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotaryVerdict {
    Confirmed(NotaryAttestation),
    Rejected(String),
}

/// Final, network-wide arbiter of output consumption.
///
/// A confirmed transaction has consumed its inputs for good: no other
/// transaction spending any of them will ever be confirmed.
#[async_trait]
pub trait Notary: Send + Sync {
    fn name(&self) -> &PartyName;

    async fn submit(&self, tx: &SignedTransaction) -> Result<NotaryVerdict, FinalityError>;
}

//! Signature collection over a proposed transaction.

use crate::error::TransactionError;
use crate::proposal::ProposedTransaction;
use fungible_crypto::{identity_hash, sign_message, verify_signature};
use fungible_types::{IdentityHash, KeyPair, PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// One party's signature over a transaction id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub signer: IdentityHash,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl TransactionSignature {
    /// Sign `tx` with `keys`. The signer identity is derived from the key.
    pub fn create(tx: &ProposedTransaction, keys: &KeyPair) -> Self {
        Self {
            signer: identity_hash(&keys.public),
            public_key: keys.public.clone(),
            signature: sign_message(tx.id.as_bytes(), &keys.private),
        }
    }

    /// The key must hash to the claimed signer and the signature must cover `tx.id`.
    pub fn verify(&self, tx: &ProposedTransaction) -> bool {
        identity_hash(&self.public_key) == self.signer
            && verify_signature(tx.id.as_bytes(), &self.signature, &self.public_key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: ProposedTransaction,
    pub signatures: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn new(tx: ProposedTransaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    /// Add our own signature. Signing twice with the same key is a no-op.
    pub fn sign(&mut self, keys: &KeyPair) {
        let sig = TransactionSignature::create(&self.tx, keys);
        if !self.has_signed(&sig.signer) {
            self.signatures.push(sig);
        }
    }

    /// Add a counterparty's signature after checking it.
    pub fn add_signature(&mut self, sig: TransactionSignature) -> Result<(), TransactionError> {
        if !sig.verify(&self.tx) {
            return Err(self.invalid(&sig.signer));
        }
        if !self.has_signed(&sig.signer) {
            self.signatures.push(sig);
        }
        Ok(())
    }

    pub fn has_signed(&self, signer: &IdentityHash) -> bool {
        self.signatures.iter().any(|s| &s.signer == signer)
    }

    /// Identities behind every signature, failing on the first bad one.
    pub fn verified_signers(&self) -> Result<Vec<IdentityHash>, TransactionError> {
        self.signatures
            .iter()
            .map(|sig| {
                if sig.verify(&self.tx) {
                    Ok(sig.signer)
                } else {
                    Err(self.invalid(&sig.signer))
                }
            })
            .collect()
    }

    /// Required signers that have not signed yet.
    pub fn missing_signers(&self) -> Vec<IdentityHash> {
        self.tx
            .required_signers
            .iter()
            .filter(|id| !self.has_signed(id))
            .copied()
            .collect()
    }

    fn invalid(&self, signer: &IdentityHash) -> TransactionError {
        TransactionError::InvalidSignature {
            tx_id: self.tx.id.to_string(),
            signer: signer.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use fungible_crypto::keypair_from_seed;
    use fungible_token::{Symbol, Token};
    use fungible_types::{Amount, PartyName, Timestamp};

    fn proposal(issuer: IdentityHash, owner: IdentityHash) -> ProposedTransaction {
        let token = Token::new(
            issuer,
            owner,
            Amount::new(500, 2),
            Symbol::new("USD").unwrap(),
            "",
            2,
        )
        .unwrap();
        ProposedTransaction::new(
            Action::Issue,
            vec![],
            vec![token],
            vec![issuer, owner],
            PartyName::parse("Notary").unwrap(),
            Timestamp::new(100),
            issuer,
            0,
        )
        .unwrap()
    }

    #[test]
    fn collects_signatures_until_complete() {
        let issuer = keypair_from_seed(&[1; 32]);
        let owner = keypair_from_seed(&[2; 32]);
        let (issuer_id, owner_id) = (identity_hash(&issuer.public), identity_hash(&owner.public));

        let mut stx = SignedTransaction::new(proposal(issuer_id, owner_id));
        stx.sign(&issuer);
        assert_eq!(stx.missing_signers(), vec![owner_id]);

        let counter = TransactionSignature::create(&stx.tx, &owner);
        stx.add_signature(counter).unwrap();
        assert!(stx.missing_signers().is_empty());
        assert_eq!(stx.verified_signers().unwrap(), vec![issuer_id, owner_id]);
    }

    #[test]
    fn signing_twice_is_idempotent() {
        let issuer = keypair_from_seed(&[1; 32]);
        let id = identity_hash(&issuer.public);
        let mut stx = SignedTransaction::new(proposal(id, id));
        stx.sign(&issuer);
        stx.sign(&issuer);
        assert_eq!(stx.signatures.len(), 1);
    }

    #[test]
    fn rejects_signature_over_another_transaction() {
        let issuer = keypair_from_seed(&[1; 32]);
        let owner = keypair_from_seed(&[2; 32]);
        let (issuer_id, owner_id) = (identity_hash(&issuer.public), identity_hash(&owner.public));

        let mut stx = SignedTransaction::new(proposal(issuer_id, owner_id));
        let mut other = proposal(issuer_id, owner_id);
        other.nonce = 99;
        other.id = other.compute_id().unwrap();
        let foreign = TransactionSignature::create(&other, &owner);

        assert!(matches!(
            stx.add_signature(foreign),
            Err(TransactionError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn rejects_key_that_does_not_match_signer() {
        let issuer = keypair_from_seed(&[1; 32]);
        let owner = keypair_from_seed(&[2; 32]);
        let (issuer_id, owner_id) = (identity_hash(&issuer.public), identity_hash(&owner.public));

        let stx = SignedTransaction::new(proposal(issuer_id, owner_id));
        let mut forged = TransactionSignature::create(&stx.tx, &owner);
        forged.signer = issuer_id;
        assert!(!forged.verify(&stx.tx));
    }
}

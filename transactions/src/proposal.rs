//! Proposed transactions.

use crate::action::Action;
use crate::error::TransactionError;
use fungible_crypto::transaction_id;
use fungible_token::Token;
use fungible_types::{IdentityHash, PartyName, StateRef, Timestamp, TxHash};
use serde::{Deserialize, Serialize};

/// A transaction before notarisation.
///
/// `id` is the Blake2b hash of every other field, so any party can detect a
/// tampered proposal with [`ProposedTransaction::verify_id`]. Output `i` of a
/// committed transaction is addressed as `StateRef { tx: id, index: i }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedTransaction {
    pub id: TxHash,
    pub action: Action,
    pub inputs: Vec<StateRef>,
    pub outputs: Vec<Token>,
    pub required_signers: Vec<IdentityHash>,
    pub notary: PartyName,
    /// Last instant at which the notary accepts this transaction.
    pub valid_until: Timestamp,
    pub initiator: IdentityHash,
    /// Distinguishes otherwise identical proposals from the same initiator.
    pub nonce: u64,
}

#[derive(Serialize)]
struct Body<'a> {
    action: Action,
    inputs: &'a [StateRef],
    outputs: &'a [Token],
    required_signers: &'a [IdentityHash],
    notary: &'a PartyName,
    valid_until: Timestamp,
    initiator: &'a IdentityHash,
    nonce: u64,
}

impl ProposedTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action: Action,
        inputs: Vec<StateRef>,
        outputs: Vec<Token>,
        required_signers: Vec<IdentityHash>,
        notary: PartyName,
        valid_until: Timestamp,
        initiator: IdentityHash,
        nonce: u64,
    ) -> Result<Self, TransactionError> {
        let mut tx = Self {
            id: TxHash::ZERO,
            action,
            inputs,
            outputs,
            required_signers,
            notary,
            valid_until,
            initiator,
            nonce,
        };
        tx.id = tx.compute_id()?;
        Ok(tx)
    }

    /// Hash of the canonical body encoding.
    pub fn compute_id(&self) -> Result<TxHash, TransactionError> {
        let body = Body {
            action: self.action,
            inputs: &self.inputs,
            outputs: &self.outputs,
            required_signers: &self.required_signers,
            notary: &self.notary,
            valid_until: self.valid_until,
            initiator: &self.initiator,
            nonce: self.nonce,
        };
        let bytes =
            bincode::serialize(&body).map_err(|e| TransactionError::Encoding(e.to_string()))?;
        Ok(transaction_id(&bytes))
    }

    pub fn verify_id(&self) -> Result<(), TransactionError> {
        let computed = self.compute_id()?;
        if computed != self.id {
            return Err(TransactionError::IdMismatch {
                claimed: self.id.to_string(),
                computed: computed.to_string(),
            });
        }
        Ok(())
    }

    /// References of the outputs this transaction creates, in output order.
    pub fn output_refs(&self) -> impl Iterator<Item = (StateRef, &Token)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .map(move |(i, token)| (StateRef::new(self.id, i as u32), token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fungible_token::Symbol;
    use fungible_types::Amount;

    fn sample(nonce: u64) -> ProposedTransaction {
        let owner = IdentityHash::new([2; 32]);
        let token = Token::new(
            IdentityHash::new([1; 32]),
            owner,
            Amount::new(10_000, 2),
            Symbol::new("USD").unwrap(),
            "",
            2,
        )
        .unwrap();
        ProposedTransaction::new(
            Action::Issue,
            vec![],
            vec![token],
            vec![IdentityHash::new([1; 32]), owner],
            PartyName::parse("Notary").unwrap(),
            Timestamp::new(86_400),
            IdentityHash::new([1; 32]),
            nonce,
        )
        .unwrap()
    }

    #[test]
    fn id_commits_to_contents() {
        let tx = sample(0);
        assert!(!tx.id.is_zero());
        assert!(tx.verify_id().is_ok());

        let mut tampered = tx.clone();
        tampered.valid_until = Timestamp::new(1);
        assert!(matches!(
            tampered.verify_id(),
            Err(TransactionError::IdMismatch { .. })
        ));
    }

    #[test]
    fn nonce_separates_identical_proposals() {
        assert_ne!(sample(0).id, sample(1).id);
        assert_eq!(sample(7).id, sample(7).id);
    }

    #[test]
    fn output_refs_follow_output_order() {
        let tx = sample(0);
        let refs: Vec<StateRef> = tx.output_refs().map(|(r, _)| r).collect();
        assert_eq!(refs, vec![StateRef::new(tx.id, 0)]);
    }
}

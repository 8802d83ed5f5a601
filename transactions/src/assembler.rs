//! Transaction assembly.
//!
//! Turns claimed inputs and the outputs a flow wants into a proposal that
//! already satisfies the transition rules, apart from signatures still to be
//! collected. Assembly validates with every required signer assumed present so
//! that the initiator never proposes a transaction its counterparties would
//! have to reject on structural grounds.

use crate::action::Action;
use crate::error::TransactionError;
use crate::proposal::ProposedTransaction;
use crate::rules;
use fungible_token::{Token, UnspentToken};
use fungible_types::{IdentityHash, PartyName, Timestamp};

pub struct AssemblyRequest<'a> {
    pub action: Action,
    pub inputs: &'a [UnspentToken],
    pub outputs: Vec<Token>,
    pub notary: PartyName,
    pub initiator: IdentityHash,
    pub nonce: u64,
    pub now: Timestamp,
    pub validity_window_secs: u64,
}

/// Build a proposal from claimed inputs and desired outputs.
///
/// Inputs must all be governed by `request.notary`. The required-signer list is
/// derived from the tokens, never taken from the caller.
pub fn assemble(request: AssemblyRequest<'_>) -> Result<ProposedTransaction, TransactionError> {
    for input in request.inputs {
        if input.notary != request.notary {
            return Err(TransactionError::NotaryMismatch {
                input: input.state_ref.to_string(),
                found: input.notary.to_string(),
                expected: request.notary.to_string(),
            });
        }
    }

    let input_tokens: Vec<Token> = request.inputs.iter().map(|u| u.token.clone()).collect();
    let required = rules::required_signers(request.action, &input_tokens, &request.outputs);
    rules::validate(request.action, &input_tokens, &request.outputs, &required)?;

    ProposedTransaction::new(
        request.action,
        request.inputs.iter().map(|u| u.state_ref).collect(),
        request.outputs,
        required,
        request.notary,
        request.now.plus_secs(request.validity_window_secs),
        request.initiator,
        request.nonce,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Violation;
    use fungible_token::Symbol;
    use fungible_types::{Amount, StateRef, TxHash};

    fn id(n: u8) -> IdentityHash {
        IdentityHash::new([n; 32])
    }

    fn usd(owner: u8, raw: u128) -> Token {
        Token::new(id(1), id(owner), Amount::new(raw, 2), Symbol::new("USD").unwrap(), "", 2)
            .unwrap()
    }

    fn unspent(owner: u8, raw: u128, notary: &str) -> UnspentToken {
        UnspentToken {
            state_ref: StateRef::new(TxHash::new([owner; 32]), 0),
            token: usd(owner, raw),
            notary: PartyName::parse(notary).unwrap(),
            sequence: 0,
        }
    }

    fn request(action: Action, inputs: &[UnspentToken], outputs: Vec<Token>) -> AssemblyRequest<'_> {
        AssemblyRequest {
            action,
            inputs,
            outputs,
            notary: PartyName::parse("Notary").unwrap(),
            initiator: id(2),
            nonce: 1,
            now: Timestamp::new(1_000),
            validity_window_secs: 86_400,
        }
    }

    #[test]
    fn transfer_with_change() {
        let inputs = [unspent(2, 10_000, "Notary")];
        let tx = assemble(request(
            Action::Transfer,
            &inputs,
            vec![usd(3, 6_000), usd(2, 4_000)],
        ))
        .unwrap();

        assert_eq!(tx.inputs, vec![inputs[0].state_ref]);
        assert_eq!(tx.required_signers, vec![id(1), id(2)]);
        assert_eq!(tx.valid_until, Timestamp::new(87_400));
        assert!(tx.verify_id().is_ok());
    }

    #[test]
    fn rejects_input_under_another_notary() {
        let inputs = [unspent(2, 10_000, "OtherNotary")];
        let err = assemble(request(Action::Transfer, &inputs, vec![usd(3, 10_000)])).unwrap_err();
        assert!(matches!(err, TransactionError::NotaryMismatch { .. }));
    }

    #[test]
    fn rejects_unbalanced_transfer() {
        let inputs = [unspent(2, 10_000, "Notary")];
        let err = assemble(request(Action::Transfer, &inputs, vec![usd(3, 9_000)])).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Violation(Violation::Unbalanced { .. })
        ));
    }

    #[test]
    fn issue_requires_no_inputs() {
        let tx = assemble(request(Action::Issue, &[], vec![usd(2, 100)])).unwrap();
        assert!(tx.inputs.is_empty());
        assert_eq!(tx.required_signers, vec![id(1), id(2)]);
    }
}

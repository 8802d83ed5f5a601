//! Transition rule engine.
//!
//! [`validate`] is a pure function of the action, the consumed and produced
//! tokens, and the set of parties that have signed. The initiator runs it before
//! proposing, every counterparty runs it again before co-signing, and the notary
//! runs it before arbitrating. Nobody trusts another party's verdict.
//!
//! Checks run in a fixed order so every party reports the same violation:
//! cardinality, positivity, scale, asset, conservation, signatures.

use crate::action::Action;
use fungible_token::Token;
use fungible_types::{Amount, IdentityHash};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("cardinality error: {0}")]
    CardinalityError(String),

    #[error("token amounts must be strictly positive")]
    NonPositiveAmount,

    #[error("all amounts in a transaction must share one scale")]
    ScaleMismatch,

    #[error("inputs and outputs mix issuers or symbols")]
    MixedAsset,

    #[error("value is not conserved: inputs {inputs}, outputs {outputs}")]
    Unbalanced { inputs: String, outputs: String },

    #[error("amount overflow while totalling tokens")]
    Overflow,

    #[error("redeem change must return to an input owner")]
    ChangeOwnerMismatch,

    #[error("missing signature from {0}")]
    MissingSignature(IdentityHash),
}

/// Validate a proposed transition.
pub fn validate(
    action: Action,
    inputs: &[Token],
    outputs: &[Token],
    signers: &[IdentityHash],
) -> Result<(), Violation> {
    check_cardinality(action, inputs, outputs)?;

    let all = || inputs.iter().chain(outputs.iter());

    if all().any(|t| t.amount().is_zero()) {
        return Err(Violation::NonPositiveAmount);
    }

    // Cardinality guarantees at least one token.
    let reference = all().next().ok_or_else(|| {
        Violation::CardinalityError("transaction has no tokens".into())
    })?;
    let scale = reference.amount().scale();
    if all().any(|t| t.amount().scale() != scale) {
        return Err(Violation::ScaleMismatch);
    }
    if all().any(|t| !t.is_fungible_with(reference)) {
        return Err(Violation::MixedAsset);
    }

    check_conservation(action, inputs, outputs, scale)?;

    if action == Action::Redeem {
        if let Some(change) = outputs.first() {
            if !inputs.iter().any(|i| i.owner() == change.owner()) {
                return Err(Violation::ChangeOwnerMismatch);
            }
        }
    }

    for required in required_signers(action, inputs, outputs) {
        if !signers.contains(&required) {
            return Err(Violation::MissingSignature(required));
        }
    }

    Ok(())
}

/// Parties whose signatures a transition needs, in deterministic order
/// (issuer first, then owners ascending, no duplicates).
///
/// - Issue: the issuer and the receiving owner.
/// - Transfer: the issuer and every current owner of an input. The new owner
///   is notified during finality but does not co-sign.
/// - Redeem: the issuer and every current owner of an input.
pub fn required_signers(action: Action, inputs: &[Token], outputs: &[Token]) -> Vec<IdentityHash> {
    let (issuer, mut owners): (Option<IdentityHash>, Vec<IdentityHash>) = match action {
        Action::Issue => (
            outputs.first().map(|t| *t.issuer()),
            outputs.iter().map(|t| *t.owner()).collect(),
        ),
        Action::Transfer | Action::Redeem => (
            inputs.first().map(|t| *t.issuer()),
            inputs.iter().map(|t| *t.owner()).collect(),
        ),
    };
    owners.sort();
    owners.dedup();

    let mut signers = Vec::with_capacity(owners.len() + 1);
    if let Some(issuer) = issuer {
        signers.push(issuer);
    }
    signers.extend(owners.into_iter().filter(|o| Some(*o) != issuer));
    signers
}

fn check_cardinality(action: Action, inputs: &[Token], outputs: &[Token]) -> Result<(), Violation> {
    let problem = match action {
        Action::Issue if !inputs.is_empty() => Some("issue must not consume inputs"),
        Action::Issue if outputs.len() != 1 => Some("issue must produce exactly one output"),
        Action::Transfer if inputs.is_empty() => Some("transfer must consume at least one input"),
        Action::Transfer if outputs.is_empty() => Some("transfer must produce at least one output"),
        Action::Redeem if inputs.is_empty() => Some("redeem must consume at least one input"),
        Action::Redeem if outputs.len() > 1 => Some("redeem may produce at most one output"),
        _ => None,
    };
    match problem {
        Some(msg) => Err(Violation::CardinalityError(msg.into())),
        None => Ok(()),
    }
}

fn check_conservation(
    action: Action,
    inputs: &[Token],
    outputs: &[Token],
    scale: u8,
) -> Result<(), Violation> {
    let total = |tokens: &[Token]| {
        let amounts: Vec<Amount> = tokens.iter().map(Token::amount).collect();
        Amount::checked_sum(&amounts, scale).ok_or(Violation::Overflow)
    };
    let input_total = total(inputs)?;
    let output_total = total(outputs)?;
    let unbalanced = || Violation::Unbalanced {
        inputs: input_total.to_string(),
        outputs: output_total.to_string(),
    };
    match action {
        Action::Issue => Ok(()),
        Action::Transfer if input_total != output_total => Err(unbalanced()),
        Action::Redeem if output_total >= input_total => Err(unbalanced()),
        _ => Ok(()),
    }
}

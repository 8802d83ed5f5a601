//! What a flow reports back to its caller.

use fungible_finality::FinalityError;
use fungible_selection::SelectionError;
use fungible_types::params::MAX_CLAIM_INPUTS;
use fungible_types::{Amount, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::NodeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    InsufficientFunds,
    ValidationViolation,
    UnknownParty,
    CounterpartyAbort,
    NotaryRejected,
    Timeout,
    InternalInvariantViolation,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::InsufficientFunds => "insufficient funds",
            Self::ValidationViolation => "validation violation",
            Self::UnknownParty => "unknown party",
            Self::CounterpartyAbort => "counterparty abort",
            Self::NotaryRejected => "notary rejected",
            Self::Timeout => "timeout",
            Self::InternalInvariantViolation => "internal invariant violation",
        };
        f.write_str(s)
    }
}

/// Terminal result of one flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOutcome {
    pub kind: OutcomeKind,
    pub message: String,
    /// Id of the finalized transaction, for successful issue, transfer and redeem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    /// Decimal amount, for balance queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl FlowOutcome {
    pub fn success(message: impl Into<String>, tx_id: TxHash) -> Self {
        Self {
            kind: OutcomeKind::Success,
            message: message.into(),
            tx_id: Some(tx_id.to_string()),
            amount: None,
        }
    }

    pub fn balance(owner: &str, amount: Amount, symbol: &str) -> Self {
        Self {
            kind: OutcomeKind::Success,
            message: format!("balance of {owner} is {amount} {symbol}"),
            tx_id: None,
            amount: Some(amount.to_string()),
        }
    }

    /// `input_limit_reached` marks a shortfall caused by the per-claim input
    /// cap rather than by the balance itself.
    pub fn insufficient_funds(
        requested: Amount,
        available: Amount,
        symbol: &str,
        input_limit_reached: bool,
    ) -> Self {
        let mut message =
            format!("insufficient funds: requested {requested} {symbol}, available {available} {symbol}");
        if input_limit_reached {
            message.push_str(&format!(
                " (the amount needs more than {MAX_CLAIM_INPUTS} input tokens)"
            ));
        }
        Self {
            kind: OutcomeKind::InsufficientFunds,
            message,
            tx_id: None,
            amount: Some(available.to_string()),
        }
    }

    pub fn failure(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tx_id: None,
            amount: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

impl fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl From<&FinalityError> for OutcomeKind {
    fn from(e: &FinalityError) -> Self {
        match e {
            FinalityError::Invalid(_) => Self::ValidationViolation,
            FinalityError::CounterpartyAbort { .. } => Self::CounterpartyAbort,
            FinalityError::NotaryRejected(_) => Self::NotaryRejected,
            FinalityError::Timeout { .. } => Self::Timeout,
            // An unreachable counterparty is as good as a silent one.
            FinalityError::Transport(_) => Self::Timeout,
            FinalityError::Protocol(_) | FinalityError::Store(_) | FinalityError::Commit(_) => {
                Self::InternalInvariantViolation
            }
        }
    }
}

impl From<&NodeError> for OutcomeKind {
    fn from(e: &NodeError) -> Self {
        match e {
            NodeError::Validation(_) | NodeError::Transaction(_) | NodeError::Token(_) => {
                Self::ValidationViolation
            }
            NodeError::UnknownParty(_) => Self::UnknownParty,
            NodeError::Finality(inner) => inner.into(),
            NodeError::Selection(SelectionError::InvalidTarget(_)) => Self::ValidationViolation,
            NodeError::Selection(_)
            | NodeError::Store(_)
            | NodeError::Config(_)
            | NodeError::Io(_) => Self::InternalInvariantViolation,
        }
    }
}

impl From<NodeError> for FlowOutcome {
    fn from(e: NodeError) -> Self {
        Self::failure(OutcomeKind::from(&e), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finality_errors_map_to_outcome_kinds() {
        let abort = FinalityError::CounterpartyAbort {
            party: "Bob".into(),
            reason: "expired".into(),
        };
        assert_eq!(OutcomeKind::from(&abort), OutcomeKind::CounterpartyAbort);
        assert_eq!(
            OutcomeKind::from(&FinalityError::NotaryRejected("double spend".into())),
            OutcomeKind::NotaryRejected
        );
        assert_eq!(
            OutcomeKind::from(&FinalityError::Timeout { stage: "notary".into() }),
            OutcomeKind::Timeout
        );
    }

    #[test]
    fn negative_change_is_an_internal_violation() {
        let e = NodeError::Selection(SelectionError::NegativeChange {
            claimed: "1.00".into(),
            requested: "2.00".into(),
        });
        assert_eq!(FlowOutcome::from(e).kind, OutcomeKind::InternalInvariantViolation);
    }

    #[test]
    fn balance_message_names_owner_amount_and_symbol() {
        let outcome = FlowOutcome::balance("Bob", Amount::new(5_000, 2), "USD");
        assert_eq!(outcome.message, "balance of Bob is 50.00 USD");
        assert_eq!(outcome.amount.as_deref(), Some("50.00"));
        assert!(outcome.is_success());
    }

    #[test]
    fn shortfall_from_the_input_cap_says_so() {
        let plain = FlowOutcome::insufficient_funds(Amount::new(600, 2), Amount::new(500, 2), "USD", false);
        assert_eq!(plain.message, "insufficient funds: requested 6.00 USD, available 5.00 USD");

        let capped = FlowOutcome::insufficient_funds(Amount::new(600, 2), Amount::new(700, 2), "USD", true);
        assert_eq!(capped.kind, OutcomeKind::InsufficientFunds);
        assert_eq!(capped.amount.as_deref(), Some("7.00"));
        assert!(capped.message.contains("available 7.00 USD"));
        assert!(capped.message.contains(&format!("more than {MAX_CLAIM_INPUTS} input tokens")));
    }

    #[test]
    fn outcome_serialises_in_camel_case() {
        let outcome = FlowOutcome::success("done", TxHash::new([7; 32]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "success");
        assert!(json.get("txId").is_some());
        assert!(json.get("amount").is_none());
    }
}

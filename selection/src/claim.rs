//! Claims: transient reservations over unspent outputs.

use crate::error::SelectionError;
use fungible_store::TokenFilter;
use fungible_token::UnspentToken;
use fungible_types::{Amount, StateRef, Timestamp};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimId(pub u64);

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "claim-{}", self.0)
    }
}

/// What to claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimCriteria {
    pub filter: TokenFilter,
    pub target: Amount,
    /// Free-form label for diagnostics, e.g. `"transfer"`.
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimState {
    Open,
    Committed,
    Released,
}

/// A successful reservation.
///
/// `tokens` are in selection order (oldest first) and their sum, `total`, is
/// never below `criteria.target`.
#[derive(Clone, Debug)]
pub struct Claim {
    pub(crate) id: ClaimId,
    pub(crate) criteria: ClaimCriteria,
    pub(crate) tokens: Vec<UnspentToken>,
    pub(crate) total: Amount,
    pub(crate) expires_at: Timestamp,
    pub(crate) state: ClaimState,
}

impl Claim {
    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn criteria(&self) -> &ClaimCriteria {
        &self.criteria
    }

    pub fn tokens(&self) -> &[UnspentToken] {
        &self.tokens
    }

    pub fn refs(&self) -> impl Iterator<Item = StateRef> + '_ {
        self.tokens.iter().map(|t| t.state_ref)
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn state(&self) -> ClaimState {
        self.state
    }

    /// `claimedTotal - requested`, or `None` when there is nothing left over.
    ///
    /// A shortfall means the claim postcondition was broken and is reported as
    /// [`SelectionError::NegativeChange`].
    pub fn change_for(&self, requested: Amount) -> Result<Option<Amount>, SelectionError> {
        let change = self
            .total
            .checked_sub(requested)
            .ok_or_else(|| SelectionError::NegativeChange {
                claimed: self.total.to_string(),
                requested: requested.to_string(),
            })?;
        Ok((!change.is_zero()).then_some(change))
    }
}

/// Result of a claim attempt. Running short is an expected outcome, not an error.
#[derive(Debug)]
pub enum ClaimOutcome {
    Claimed(Claim),
    InsufficientFunds {
        requested: Amount,
        available: Amount,
        /// The target needed more than `MAX_CLAIM_INPUTS` tokens.
        input_limit_reached: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use fungible_token::{AssetKey, Symbol};
    use fungible_types::IdentityHash;

    fn claim_with_total(raw: u128) -> Claim {
        Claim {
            id: ClaimId(1),
            criteria: ClaimCriteria {
                filter: TokenFilter::for_asset(AssetKey {
                    issuer: IdentityHash::new([1; 32]),
                    symbol: Symbol::new("USD").unwrap(),
                }),
                target: Amount::new(raw, 2),
                label: "test".into(),
            },
            tokens: vec![],
            total: Amount::new(raw, 2),
            expires_at: Timestamp::new(0),
            state: ClaimState::Open,
        }
    }

    #[test]
    fn exact_claim_has_no_change() {
        let claim = claim_with_total(3_000);
        assert_eq!(claim.change_for(Amount::new(3_000, 2)).unwrap(), None);
    }

    #[test]
    fn surplus_becomes_change() {
        let claim = claim_with_total(10_000);
        assert_eq!(
            claim.change_for(Amount::new(5_000, 2)).unwrap(),
            Some(Amount::new(5_000, 2))
        );
    }

    #[test]
    fn shortfall_is_an_invariant_violation() {
        let claim = claim_with_total(100);
        assert!(matches!(
            claim.change_for(Amount::new(101, 2)),
            Err(SelectionError::NegativeChange { .. })
        ));
    }

    #[test]
    fn claim_ids_display_with_prefix() {
        assert_eq!(ClaimId(42).to_string(), "claim-42");
    }
}

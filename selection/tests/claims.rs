mod common;

use std::sync::Arc;

use common::*;
use fungible_selection::{BalanceView, ClaimGuard, ClaimOutcome, ClaimState, SelectionError};
use fungible_store::{CommitRecord, TokenFilter};
use fungible_types::params::MAX_CLAIM_INPUTS;
use fungible_types::{Amount, StateRef, TxHash};

fn claimed(outcome: ClaimOutcome) -> fungible_selection::Claim {
    match outcome {
        ClaimOutcome::Claimed(claim) => claim,
        other => panic!("expected a claim, got {other:?}"),
    }
}

fn bob_usd() -> TokenFilter {
    TokenFilter::for_asset(asset()).owned_by(id(2))
}

#[test]
fn selects_oldest_first_until_target_is_covered() {
    let index = Arc::new(TestIndex::default());
    let oldest = index.insert(10, 2, 3_000);
    let middle = index.insert(11, 2, 3_000);
    index.insert(12, 2, 3_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    let claim = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert_eq!(claim.refs().collect::<Vec<_>>(), vec![oldest, middle]);
    assert_eq!(claim.total(), Amount::new(6_000, 2));
    assert_eq!(claim.change_for(Amount::new(5_000, 2)).unwrap(), Some(Amount::new(1_000, 2)));
}

#[test]
fn shortfall_is_an_outcome_and_claims_nothing() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 2, 10_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    match claims.try_claim(criteria(2, 10_001)).unwrap() {
        ClaimOutcome::InsufficientFunds {
            requested,
            available,
            input_limit_reached,
        } => {
            assert_eq!(requested, Amount::new(10_001, 2));
            assert_eq!(available, Amount::new(10_000, 2));
            assert!(!input_limit_reached);
        }
        other => panic!("expected insufficient funds, got {other:?}"),
    }
    assert_eq!(claims.open_claims(), 0);
    assert_eq!(
        claims.balance(&bob_usd(), BalanceView::Spendable).unwrap(),
        Amount::new(10_000, 2)
    );
}

#[test]
fn input_cap_shortfall_reports_the_whole_balance() {
    let index = Arc::new(TestIndex::default());
    let count = MAX_CLAIM_INPUTS as u32 + 10;
    for output in 0..count {
        index.insert_output(10, output, 2, 1);
    }
    let claims = manager(index, Arc::new(TestClock::new(0)));

    match claims.try_claim(criteria(2, u128::from(count) - 5)).unwrap() {
        ClaimOutcome::InsufficientFunds {
            requested,
            available,
            input_limit_reached,
        } => {
            assert_eq!(requested, Amount::new(u128::from(count) - 5, 2));
            assert_eq!(available, Amount::new(u128::from(count), 2));
            assert!(input_limit_reached);
        }
        other => panic!("expected insufficient funds, got {other:?}"),
    }
    assert_eq!(claims.open_claims(), 0);

    let claim = claimed(claims.try_claim(criteria(2, MAX_CLAIM_INPUTS as u128)).unwrap());
    assert_eq!(claim.tokens().len(), MAX_CLAIM_INPUTS);
}

#[test]
fn other_owners_tokens_are_never_selected() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 3, 10_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));
    assert!(matches!(
        claims.try_claim(criteria(2, 100)).unwrap(),
        ClaimOutcome::InsufficientFunds { .. }
    ));
}

#[test]
fn claimed_refs_are_skipped_by_later_attempts() {
    let index = Arc::new(TestIndex::default());
    let first = index.insert(10, 2, 5_000);
    let second = index.insert(11, 2, 5_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    let a = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    let b = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert_eq!(a.refs().collect::<Vec<_>>(), vec![first]);
    assert_eq!(b.refs().collect::<Vec<_>>(), vec![second]);
    assert!(matches!(
        claims.try_claim(criteria(2, 1)).unwrap(),
        ClaimOutcome::InsufficientFunds { .. }
    ));
}

#[test]
fn balance_excludes_claimed_tokens_unless_pending_requested() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 2, 6_000);
    index.insert(11, 2, 4_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    let _claim = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert_eq!(
        claims.balance(&bob_usd(), BalanceView::Spendable).unwrap(),
        Amount::new(4_000, 2)
    );
    assert_eq!(
        claims.balance(&bob_usd(), BalanceView::IncludingPending).unwrap(),
        Amount::new(10_000, 2)
    );
}

#[test]
fn release_is_idempotent_and_frees_refs() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 2, 5_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    let mut claim = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    claims.release(&mut claim);
    claims.release(&mut claim);
    assert_eq!(claim.state(), ClaimState::Released);

    let again = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert_eq!(again.total(), Amount::new(5_000, 2));
}

#[test]
fn commit_spends_inputs_and_publishes_outputs() {
    let index = Arc::new(TestIndex::default());
    let input = index.insert(10, 2, 10_000);
    let claims = manager(index.clone(), Arc::new(TestClock::new(0)));

    let mut claim = claimed(claims.try_claim(criteria(2, 4_000)).unwrap());
    let tx = TxHash::new([99; 32]);
    let record = CommitRecord {
        tx_id: tx,
        notary: notary(),
        spent: vec![input],
        produced: vec![(StateRef::new(tx, 1), usd(2, 6_000))],
    };
    claims.commit(&mut claim, &record).unwrap();
    assert_eq!(claim.state(), ClaimState::Committed);
    assert_eq!(claims.open_claims(), 0);
    assert_eq!(
        claims.balance(&bob_usd(), BalanceView::Spendable).unwrap(),
        Amount::new(6_000, 2)
    );

    // Releasing after commit changes nothing.
    claims.release(&mut claim);
    assert_eq!(claim.state(), ClaimState::Committed);
    assert!(matches!(
        claims.commit(&mut claim, &record),
        Err(SelectionError::NotOpen(_))
    ));
}

#[test]
fn commit_must_spend_every_claimed_ref() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 2, 10_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    let mut claim = claimed(claims.try_claim(criteria(2, 100)).unwrap());
    let record = CommitRecord {
        tx_id: TxHash::new([1; 32]),
        notary: notary(),
        spent: vec![],
        produced: vec![],
    };
    assert!(matches!(
        claims.commit(&mut claim, &record),
        Err(SelectionError::CommitMismatch(_))
    ));
    assert_eq!(claim.state(), ClaimState::Open);
}

#[test]
fn expired_lease_makes_refs_selectable_again() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 2, 5_000);
    let clock = Arc::new(TestClock::new(1_000));
    let claims = manager(index, clock.clone());

    let _stale = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert!(matches!(
        claims.try_claim(criteria(2, 5_000)).unwrap(),
        ClaimOutcome::InsufficientFunds { .. }
    ));

    clock.advance(61);
    let fresh = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert_eq!(fresh.total(), Amount::new(5_000, 2));
    assert_eq!(claims.open_claims(), 1);
}

#[test]
fn refs_spent_after_snapshot_are_not_claimed() {
    let index = Arc::new(TestIndex::default());
    let gone = index.insert(10, 2, 5_000);
    index.insert(11, 2, 5_000);
    let claims = manager(index.clone(), Arc::new(TestClock::new(0)));

    index.remove(&gone);
    let claim = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    assert!(claim.refs().all(|r| r != gone));
}

#[test]
fn guard_releases_on_drop() {
    let index = Arc::new(TestIndex::default());
    index.insert(10, 2, 5_000);
    let claims = manager(index, Arc::new(TestClock::new(0)));

    let claim = claimed(claims.try_claim(criteria(2, 5_000)).unwrap());
    {
        let _guard = ClaimGuard::new(claims.clone(), claim);
        assert_eq!(claims.open_claims(), 1);
    }
    assert_eq!(claims.open_claims(), 0);
}

#[test]
fn invalid_targets_are_errors() {
    let claims = manager(Arc::new(TestIndex::default()), Arc::new(TestClock::new(0)));
    let mut zero = criteria(2, 0);
    assert!(matches!(claims.try_claim(zero.clone()), Err(SelectionError::InvalidTarget(_))));
    zero.target = Amount::new(100, 3);
    assert!(matches!(claims.try_claim(zero), Err(SelectionError::InvalidTarget(_))));
}

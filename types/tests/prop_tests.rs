use proptest::prelude::*;

use fungible_types::{Amount, StateRef, Timestamp, TxHash};

proptest! {
    /// Display then parse at the same scale returns the original amount.
    #[test]
    fn amount_display_parses_back(raw in 0u128..1_000_000_000_000u128, scale in 0u8..8) {
        let amount = Amount::new(raw, scale);
        let parsed = Amount::parse(&amount.to_string(), scale).unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Subtraction undoes addition at a fixed scale.
    #[test]
    fn amount_sub_undoes_add(a in 0u128..u64::MAX as u128, b in 0u128..u64::MAX as u128) {
        let x = Amount::new(a, 2);
        let y = Amount::new(b, 2);
        let sum = x.checked_add(y).unwrap();
        prop_assert_eq!(sum.checked_sub(y), Some(x));
        prop_assert!(sum >= x);
    }

    /// Amount ordering matches raw ordering at equal scale.
    #[test]
    fn amount_ordering_matches_raw(a in any::<u64>(), b in any::<u64>()) {
        let x = Amount::new(a as u128, 2);
        let y = Amount::new(b as u128, 2);
        prop_assert_eq!(x < y, a < b);
        prop_assert_eq!(x == y, a == b);
    }

    /// StateRef ordering is transaction first, then index.
    #[test]
    fn state_ref_orders_by_tx_then_index(
        tx_a in prop::array::uniform32(0u8..),
        tx_b in prop::array::uniform32(0u8..),
        i in any::<u32>(),
        j in any::<u32>(),
    ) {
        let a = StateRef::new(TxHash::new(tx_a), i);
        let b = StateRef::new(TxHash::new(tx_b), j);
        prop_assert_eq!(a.cmp(&b), (tx_a, i).cmp(&(tx_b, j)));
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
    }
}

#[test]
fn state_ref_survives_wire_encoding() {
    let r = StateRef::new(TxHash::new([7u8; 32]), 3);
    let bytes = bincode::serialize(&r).unwrap();
    let back: StateRef = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, r);
}

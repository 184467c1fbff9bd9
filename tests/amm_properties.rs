//! Property tests for the testable properties enumerated in §8: the
//! floor relation, no-loss round trips, fee/input monotonicity, sqrt
//! bounds, the k-invariant, and contract-amount round trips.
//!
//! Mirrors the teacher's `arbitrage_properties.rs`: one `proptest!`
//! block per property, bounded ranges chosen to stay well inside
//! `i128` for the test's own cross-check arithmetic (the wide-multiply
//! overflow-safety of the implementation itself is covered separately
//! by `fixed_math.rs`'s colocated unit tests).

use amm_router::{AmmFormulas, FixedMath};
use proptest::prelude::*;

const MAX_RESERVE: i128 = 1_000_000_000_000;
const DEFAULT_FEE: u32 = 30;

fn reserve_strategy() -> impl Strategy<Value = i128> {
    1i128..=MAX_RESERVE
}

fn amount_strategy() -> impl Strategy<Value = i128> {
    1i128..=1_000_000_000
}

proptest! {
    #[test]
    fn property_1_floor_relation(
        amount_in in amount_strategy(),
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
    ) {
        let amount_out = AmmFormulas::amount_out(amount_in, r_in, r_out, DEFAULT_FEE).unwrap();
        let bps_minus_fee = 10_000 - DEFAULT_FEE as i128;
        let amount_in_with_fee = amount_in * bps_minus_fee;
        let lhs = amount_out * (r_in * 10_000 + amount_in_with_fee);
        let rhs = amount_in_with_fee * r_out;
        prop_assert!(lhs <= rhs);
    }

    #[test]
    fn property_2_swap_out_of_swap_in_no_loss(
        r_in in reserve_strategy(),
        r_out in 2i128..=MAX_RESERVE,
        y_frac in 1u32..100u32,
    ) {
        let y = (r_out * y_frac as i128) / 100;
        prop_assume!(y > 0 && y < r_out);
        let needed_in = AmmFormulas::amount_in(y, r_in, r_out, DEFAULT_FEE).unwrap();
        let round_trip_out = AmmFormulas::amount_out(needed_in, r_in, r_out, DEFAULT_FEE).unwrap();
        prop_assert!(round_trip_out >= y);
    }

    #[test]
    fn property_3_swap_in_of_swap_out_no_loss(
        amount_in in amount_strategy(),
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
    ) {
        let x = amount_in;
        let out = AmmFormulas::amount_out(x, r_in, r_out, DEFAULT_FEE).unwrap();
        prop_assume!(out > 0 && out < r_out);
        let recovered_in = AmmFormulas::amount_in(out, r_in, r_out, DEFAULT_FEE).unwrap();
        prop_assert!(recovered_in >= x);
    }

    #[test]
    fn property_4_lower_fee_yields_greater_output(
        amount_in in amount_strategy(),
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
        fee_hi in 1u32..=9_999u32,
    ) {
        let fee_lo = fee_hi.saturating_sub(1);
        let out_lo = AmmFormulas::amount_out(amount_in, r_in, r_out, fee_lo).unwrap();
        let out_hi = AmmFormulas::amount_out(amount_in, r_in, r_out, fee_hi).unwrap();
        prop_assert!(out_lo >= out_hi);
    }

    #[test]
    fn property_5_monotonic_in_input(
        x1 in amount_strategy(),
        delta in 1i128..=1_000_000,
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
    ) {
        let x2 = x1 + delta;
        let out1 = AmmFormulas::amount_out(x1, r_in, r_out, DEFAULT_FEE).unwrap();
        let out2 = AmmFormulas::amount_out(x2, r_in, r_out, DEFAULT_FEE).unwrap();
        prop_assert!(out1 <= out2);
    }

    #[test]
    fn property_6_sqrt_bounds(n in 0i128..=MAX_RESERVE) {
        let root = FixedMath::sqrt(n).unwrap();
        prop_assert!(root * root <= n);
        prop_assert!(n < (root + 1) * (root + 1));
    }

    #[test]
    fn property_7_k_invariant_after_swap(
        amount_in in amount_strategy(),
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
    ) {
        let amount_out = AmmFormulas::amount_out(amount_in, r_in, r_out, DEFAULT_FEE).unwrap();
        let new_r_in = r_in + amount_in;
        let new_r_out = r_out - amount_out;
        prop_assume!(new_r_out > 0);
        prop_assert!(FixedMath::verify_k(new_r_in, new_r_out, r_in, r_out).unwrap());
    }

    #[test]
    fn property_8_contract_amount_round_trip(
        amount in 0i128..=1_000_000_000,
        decimals in 0u32..=12u32,
    ) {
        let scaled = FixedMath::to_contract_amount(amount, decimals).unwrap();
        let back = FixedMath::from_contract_amount(scaled, decimals).unwrap();
        prop_assert_eq!(back, amount);
    }
}

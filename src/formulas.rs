//! Constant-product swap math.
//!
//! Every formula here is pure integer arithmetic routed through
//! [`crate::fixed_math::FixedMath`]; none of it touches [`TokenId`]
//! directly: callers orient `(reserve_in, reserve_out)` for the
//! direction being quoted and these functions stay token-agnostic,
//! mirroring the teacher's separation between its pure math module and
//! the higher layers that own token identity.

use crate::error::{AmmError, AmmResult};
use crate::fixed_math::{FixedMath, BPS_DENOM, MIN_INITIAL_LIQUIDITY};
use crate::types::TokenId;

/// One hop's reserves and fee, oriented `(reserve_in, reserve_out)`
/// for the direction being traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopReserves {
    pub reserve_in: i128,
    pub reserve_out: i128,
    pub fee_bps: u32,
}

pub struct AmmFormulas;

impl AmmFormulas {
    /// `floor((amount_in * (BPS - f) * reserve_out) / (reserve_in * BPS + amount_in * (BPS - f)))`.
    pub fn amount_out(amount_in: i128, reserve_in: i128, reserve_out: i128, fee_bps: u32) -> AmmResult<i128> {
        if amount_in <= 0 {
            return Err(AmmError::invalid_amount("amount_in must be positive"));
        }
        if reserve_in <= 0 || reserve_out <= 0 {
            return Err(AmmError::insufficient_liquidity("reserves must be positive"));
        }

        let bps_minus_fee = BPS_DENOM - fee_bps as i128;
        // amount_in * (BPS - f) and reserve_in * BPS are kept as wide
        // (256-bit) intermediates: for a reserve near i128::MAX, either
        // product alone overflows i128 even though the true amount_out
        // (bounded by reserve_out) fits comfortably.
        let amount_in_with_fee = FixedMath::wide_mul(amount_in, bps_minus_fee)?;
        let reserve_in_scaled = FixedMath::wide_mul(reserve_in, BPS_DENOM)?;
        let denominator = FixedMath::add_wide(reserve_in_scaled, amount_in_with_fee)?;
        FixedMath::mul_div_down_wide(amount_in_with_fee, reserve_out, denominator)
    }

    /// `floor((reserve_in * amount_out * BPS) / ((reserve_out - amount_out) * (BPS - f))) + 1`.
    /// The `+1` preserves the no-loss round-trip rule (see property tests).
    pub fn amount_in(amount_out: i128, reserve_in: i128, reserve_out: i128, fee_bps: u32) -> AmmResult<i128> {
        if amount_out <= 0 {
            return Err(AmmError::invalid_amount("amount_out must be positive"));
        }
        if reserve_in <= 0 || reserve_out <= 0 {
            return Err(AmmError::insufficient_liquidity("reserves must be positive"));
        }
        if amount_out >= reserve_out {
            return Err(AmmError::insufficient_liquidity("amount_out must be less than reserve_out"));
        }

        let bps_minus_fee = BPS_DENOM - fee_bps as i128;
        let diff = reserve_out - amount_out;
        // reserve_in * amount_out is already a full 128x128 product
        // before the further multiply by BPS_DENOM, so both the
        // numerator and denominator are carried wide until the single
        // final divide.
        let reserve_amount = FixedMath::wide_mul(reserve_in, amount_out)?;
        let denominator = FixedMath::wide_mul(diff, bps_minus_fee)?;
        let base = FixedMath::mul_div_down_wide(reserve_amount, BPS_DENOM, denominator)?;
        base.checked_add(1).ok_or_else(|| AmmError::Overflow { context: "amount_in +1".to_string() })
    }

    /// Compose [`Self::amount_out`] left to right across `hops`,
    /// returning the full amounts vector including the input endpoint.
    pub fn multi_hop_out(amount_in: i128, hops: &[HopReserves]) -> AmmResult<Vec<i128>> {
        let mut amounts = Vec::with_capacity(hops.len() + 1);
        amounts.push(amount_in);
        let mut current = amount_in;
        for hop in hops {
            current = Self::amount_out(current, hop.reserve_in, hop.reserve_out, hop.fee_bps)?;
            amounts.push(current);
        }
        Ok(amounts)
    }

    /// Compose [`Self::amount_in`] in reverse order across `hops`,
    /// returning the full amounts vector including the output endpoint.
    pub fn multi_hop_in(amount_out: i128, hops: &[HopReserves]) -> AmmResult<Vec<i128>> {
        let mut amounts = vec![0i128; hops.len() + 1];
        amounts[hops.len()] = amount_out;
        let mut current = amount_out;
        for (i, hop) in hops.iter().enumerate().rev() {
            current = Self::amount_in(current, hop.reserve_in, hop.reserve_out, hop.fee_bps)?;
            amounts[i] = current;
        }
        Ok(amounts)
    }

    /// Proportional quote: `amount_b = floor(amount_a * reserve_b / reserve_a)`.
    pub fn quote(amount_a: i128, reserve_a: i128, reserve_b: i128) -> AmmResult<i128> {
        if reserve_a <= 0 {
            return Err(AmmError::insufficient_liquidity("reserve_a must be positive"));
        }
        FixedMath::mul_div_down(amount_a, reserve_b, reserve_a)
    }

    /// `sqrt(a0 * a1) - MIN_INITIAL_LIQUIDITY`; the floor is permanently
    /// unissued (dead shares) to keep a pool from ever being drained to
    /// zero total supply.
    pub fn calculate_initial_liquidity(a0: i128, a1: i128) -> AmmResult<i128> {
        let shares = FixedMath::sqrt_product(a0, a1)?;
        let shares = shares - MIN_INITIAL_LIQUIDITY;
        if shares <= 0 {
            return Err(AmmError::insufficient_liquidity("initial liquidity below minimum floor"));
        }
        Ok(shares)
    }

    /// `min(floor(a0 * supply / reserve0), floor(a1 * supply / reserve1))`.
    pub fn calculate_incremental_liquidity(
        a0: i128,
        a1: i128,
        supply: i128,
        reserve0: i128,
        reserve1: i128,
    ) -> AmmResult<i128> {
        let shares0 = FixedMath::mul_div_down(a0, supply, reserve0)?;
        let shares1 = FixedMath::mul_div_down(a1, supply, reserve1)?;
        Ok(shares0.min(shares1))
    }

    /// Price impact in basis points for a trade of `amount_in` against
    /// `(reserve_in, reserve_out)`. Zero when the proportional
    /// (no-fee, no-slippage) expected output is zero.
    pub fn price_impact_bps(amount_in: i128, reserve_in: i128, reserve_out: i128, fee_bps: u32) -> AmmResult<i128> {
        let expected = FixedMath::mul_div_down(amount_in, reserve_out, reserve_in)?;
        if expected == 0 {
            return Ok(0);
        }
        let actual = Self::amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
        let diff = (expected - actual).max(0);
        FixedMath::mul_div_down(diff, BPS_DENOM, expected)
    }

    /// Pool ownership share as a percent with two decimal digits of
    /// precision (e.g. `12.34`). `100.0` for an empty pool (`supply == 0`).
    pub fn pool_share_percent(liq: i128, supply: i128) -> AmmResult<f64> {
        if supply == 0 {
            return Ok(100.0);
        }
        let scaled = FixedMath::mul_div_down(liq, BPS_DENOM, supply)?;
        Ok(scaled as f64 / 100.0)
    }

    /// Minimum acceptable output given a slippage tolerance in bps.
    pub fn min_out(amount: i128, slip_bps: i128) -> AmmResult<i128> {
        FixedMath::mul_div_down(amount, BPS_DENOM - slip_bps, BPS_DENOM)
    }

    /// Maximum acceptable input given a slippage tolerance in bps.
    pub fn max_in(amount: i128, slip_bps: i128) -> AmmResult<i128> {
        FixedMath::mul_div_down(amount, BPS_DENOM + slip_bps, BPS_DENOM)
    }

    /// Canonical `(min, max)` ordering of a token pair by normalised
    /// string. Fails `InvalidArgument` if the two tokens are the same.
    pub fn sort_tokens(a: &TokenId, b: &TokenId) -> AmmResult<(TokenId, TokenId)> {
        if a == b {
            return Err(AmmError::invalid_argument(format!("identical tokens: {a}")));
        }
        if a < b {
            Ok((a.clone(), b.clone()))
        } else {
            Ok((b.clone(), a.clone()))
        }
    }
}

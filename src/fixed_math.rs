//! Checked 128-bit signed fixed-point arithmetic.
//!
//! Every AMM formula in [`crate::formulas`] resolves to these
//! primitives. Products of two `i128` reserves/amounts can exceed
//! `i128::MAX` (e.g. two reserves near `i128::MAX` multiply to ~2^254),
//! so every multiply here widens into a 256-bit intermediate
//! (represented as a `(hi, lo)` pair of `u128`s) before dividing or
//! narrowing back down, rather than relying on `i128::checked_mul`
//! directly. This mirrors the overflow-checked-multiply-before-divide
//! discipline the teacher's `UniswapV2Math` applies to `U256`, adapted
//! to signed 128-bit per this crate's reserve type.

use crate::error::{AmmError, AmmResult};

/// One part in ten thousand; the unit fees, slippage tolerances, and
/// price-impact measurements are expressed in.
pub const BPS_DENOM: i128 = 10_000;

/// LP shares permanently burned on pool creation (dead shares), so a
/// pool can never be drained to zero total supply.
pub const MIN_INITIAL_LIQUIDITY: i128 = 1_000;

/// Default swap deadline used by callers that don't specify one.
pub const DEFAULT_DEADLINE_SECS: u64 = 1_800;

fn require_non_negative(name: &'static str, v: i128) -> AmmResult<()> {
    if v < 0 {
        return Err(AmmError::invalid_argument(format!("{name} must be non-negative, got {v}")));
    }
    Ok(())
}

/// Full 128x128 -> 256 bit unsigned multiply, returned as (hi, lo).
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let mask = u64::MAX as u128;
    let a_lo = a & mask;
    let a_hi = a >> 64;
    let b_lo = b & mask;
    let b_hi = b >> 64;

    let p00 = a_lo * b_lo;
    let p01 = a_lo * b_hi;
    let p10 = a_hi * b_lo;
    let p11 = a_hi * b_hi;

    let col1 = (p00 >> 64) + (p01 & mask) + (p10 & mask);
    let r1 = col1 & mask;
    let carry1 = col1 >> 64;

    let col2 = (p01 >> 64) + (p10 >> 64) + (p11 & mask) + carry1;
    let r2 = col2 & mask;
    let carry2 = col2 >> 64;

    let r3 = (p11 >> 64) + carry2;

    let lo = (p00 & mask) | (r1 << 64);
    let hi = r2 | (r3 << 64);
    (hi, lo)
}

/// Average of two `u128`s without overflow (`a + b` can overflow `u128`
/// even though the average cannot).
fn avg(a: u128, b: u128) -> u128 {
    (a & b) + ((a ^ b) >> 1)
}

/// Divide a 256-bit unsigned numerator `(n_hi, n_lo)` by a `u128`
/// divisor, returning `(quotient_hi, quotient_lo, remainder)`.
///
/// Callers in this module only ever pass a `divisor` that originated
/// from a validated non-negative `i128`, so `divisor < 2^127` and the
/// remainder (always `< divisor`) never overflows a `u128` left-shift
/// during the bit-at-a-time long division below.
fn div_rem_wide(n_hi: u128, n_lo: u128, divisor: u128) -> (u128, u128, u128) {
    debug_assert!(divisor > 0);
    let mut rem: u128 = 0;
    let mut q_hi: u128 = 0;
    let mut q_lo: u128 = 0;
    for i in (0..256).rev() {
        let bit = if i >= 128 { (n_hi >> (i - 128)) & 1 } else { (n_lo >> i) & 1 };
        rem = (rem << 1) | bit;
        if rem >= divisor {
            rem -= divisor;
            if i >= 128 {
                q_hi |= 1 << (i - 128);
            } else {
                q_lo |= 1 << i;
            }
        }
    }
    (q_hi, q_lo, rem)
}

fn narrow_to_i128(q_hi: u128, q_lo: u128, context: &'static str) -> AmmResult<i128> {
    if q_hi != 0 || q_lo > i128::MAX as u128 {
        return Err(AmmError::Overflow { context: context.to_string() });
    }
    Ok(q_lo as i128)
}

/// An exact, unnarrowed 256-bit unsigned product, as returned by
/// [`FixedMath::wide_mul`]/[`FixedMath::add_wide`] and consumed by
/// [`FixedMath::mul_div_down_wide`]. Lets a formula chain several
/// multiplies/adds (e.g. a swap's fee-adjusted numerator and
/// denominator) through the wide domain before a single final divide
/// narrows back down to `i128`.
pub type Wide256 = (u128, u128);

/// Multiply a 256-bit unsigned value `(hi, lo)` by a `u128` scalar,
/// returning the exact 384-bit product as big-endian limbs
/// `(hi, mid, lo)`, i.e. `result = hi * 2^256 + mid * 2^128 + lo`.
fn mul_wide_by_u128(hi: u128, lo: u128, scalar: u128) -> (u128, u128, u128) {
    let (lo_hi, lo_lo) = widening_mul(lo, scalar);
    let (hi_hi, hi_lo) = widening_mul(hi, scalar);
    let (mid, carry) = hi_lo.overflowing_add(lo_hi);
    let result_hi = hi_hi + carry as u128;
    (result_hi, mid, lo_lo)
}

/// Divide a 384-bit unsigned numerator (big-endian limbs `hi`, `mid`,
/// `lo`) by a 256-bit divisor `(d_hi, d_lo)`, via the same bit-serial
/// restoring-division technique as [`div_rem_wide`], generalized to a
/// wider numerator. Returns `(quotient, remainder_hi, remainder_lo)`;
/// `quotient` is `None` when the true quotient doesn't narrow into
/// `i128`.
fn div_rem_wide384(hi: u128, mid: u128, lo: u128, d_hi: u128, d_lo: u128) -> (Option<i128>, u128, u128) {
    debug_assert!(d_hi != 0 || d_lo != 0);
    let mut rem_hi: u128 = 0;
    let mut rem_lo: u128 = 0;
    let mut q_lo: u128 = 0;
    let mut overflow = false;

    for (limb, base) in [(hi, 256u32), (mid, 128u32), (lo, 0u32)] {
        for local_bit in (0..128u32).rev() {
            let global_bit = base + local_bit;
            let bit = (limb >> local_bit) & 1;
            rem_hi = (rem_hi << 1) | (rem_lo >> 127);
            rem_lo = (rem_lo << 1) | bit;
            let ge = rem_hi > d_hi || (rem_hi == d_hi && rem_lo >= d_lo);
            if ge {
                let (new_lo, borrow) = rem_lo.overflowing_sub(d_lo);
                rem_lo = new_lo;
                rem_hi -= d_hi + borrow as u128;
                if global_bit < 128 {
                    q_lo |= 1u128 << global_bit;
                } else {
                    overflow = true;
                }
            }
        }
    }

    let quotient = if overflow || q_lo > i128::MAX as u128 { None } else { Some(q_lo as i128) };
    (quotient, rem_hi, rem_lo)
}

/// Fixed-point arithmetic primitives. All reserve/amount quantities
/// flowing through this crate are non-negative `i128`s; every function
/// here rejects negative operands with [`AmmError::InvalidArgument`].
pub struct FixedMath;

impl FixedMath {
    /// `floor((a * b) / c)`.
    pub fn mul_div_down(a: i128, b: i128, c: i128) -> AmmResult<i128> {
        require_non_negative("a", a)?;
        require_non_negative("b", b)?;
        if c == 0 {
            return Err(AmmError::DivisionByZero { context: "mul_div_down".to_string() });
        }
        require_non_negative("c", c)?;

        let (hi, lo) = widening_mul(a as u128, b as u128);
        let (q_hi, q_lo, _rem) = div_rem_wide(hi, lo, c as u128);
        narrow_to_i128(q_hi, q_lo, "mul_div_down")
    }

    /// `ceil((a * b) / c)`.
    pub fn mul_div_up(a: i128, b: i128, c: i128) -> AmmResult<i128> {
        require_non_negative("a", a)?;
        require_non_negative("b", b)?;
        if c == 0 {
            return Err(AmmError::DivisionByZero { context: "mul_div_up".to_string() });
        }
        require_non_negative("c", c)?;

        let (hi, lo) = widening_mul(a as u128, b as u128);
        let (q_hi, q_lo, rem) = div_rem_wide(hi, lo, c as u128);
        if rem == 0 {
            return narrow_to_i128(q_hi, q_lo, "mul_div_up");
        }
        let (q_hi, q_lo) = if q_lo == u128::MAX { (q_hi + 1, 0) } else { (q_hi, q_lo + 1) };
        narrow_to_i128(q_hi, q_lo, "mul_div_up")
    }

    /// Full-precision `a * b`, kept in the 256-bit domain rather than
    /// narrowed back to `i128`. For formulas (see
    /// [`crate::formulas::AmmFormulas`]) that need to add or
    /// multiply-and-divide more than one such product before a single
    /// final narrowing divide, so that an in-range reserve near
    /// `i128::MAX` doesn't overflow an intermediate that the true
    /// result never approaches.
    pub fn wide_mul(a: i128, b: i128) -> AmmResult<Wide256> {
        require_non_negative("a", a)?;
        require_non_negative("b", b)?;
        Ok(widening_mul(a as u128, b as u128))
    }

    /// `a + b` in the 256-bit domain, for combining two
    /// [`Self::wide_mul`] products without narrowing either addend to
    /// `i128` first.
    pub fn add_wide(a: Wide256, b: Wide256) -> AmmResult<Wide256> {
        let (lo, carry) = a.1.overflowing_add(b.1);
        let (hi, carry_hi) = a.0.overflowing_add(b.0);
        let (hi, carry_out) = hi.overflowing_add(carry as u128);
        if carry_hi || carry_out {
            return Err(AmmError::Overflow { context: "add_wide".to_string() });
        }
        Ok((hi, lo))
    }

    /// `floor(wide * c / divisor)`, where `wide` and `divisor` are
    /// already-widened 256-bit values (from [`Self::wide_mul`] and/or
    /// [`Self::add_wide`]) and `c` is a plain non-negative `i128`.
    /// Computes the exact 384-bit product `wide * c` and divides it by
    /// `divisor` in one step, so neither `wide` nor that intermediate
    /// product is ever narrowed before the final divide narrows the
    /// (in-range) result. Mirrors the teacher's `U256`-throughout
    /// `UniswapV2Math` arithmetic, generalized one multiply further.
    pub fn mul_div_down_wide(wide: Wide256, c: i128, divisor: Wide256) -> AmmResult<i128> {
        require_non_negative("c", c)?;
        if divisor == (0, 0) {
            return Err(AmmError::DivisionByZero { context: "mul_div_down_wide".to_string() });
        }

        let (hi, mid, lo) = mul_wide_by_u128(wide.0, wide.1, c as u128);
        let (quotient, _rem_hi, _rem_lo) = div_rem_wide384(hi, mid, lo, divisor.0, divisor.1);
        quotient.ok_or_else(|| AmmError::Overflow { context: "mul_div_down_wide".to_string() })
    }

    /// Integer floor of `sqrt(v)`. `sqrt(0) == 0`.
    pub fn sqrt(v: i128) -> AmmResult<i128> {
        require_non_negative("v", v)?;
        Ok(sqrt_wide(0, v as u128) as i128)
    }

    /// `sqrt(a * b)` computed on the widened product so that reserve
    /// products exceeding `i128::MAX` (as happens for large pools) do
    /// not overflow before the square root narrows the result back
    /// down: the square root of a value `< 2^254` is always `< 2^127`
    /// and so always fits back into `i128`.
    pub fn sqrt_product(a: i128, b: i128) -> AmmResult<i128> {
        require_non_negative("a", a)?;
        require_non_negative("b", b)?;
        let (hi, lo) = widening_mul(a as u128, b as u128);
        Ok(sqrt_wide(hi, lo) as i128)
    }

    /// `r0 * r1`, checked against `i128`'s range. Use [`Self::verify_k`]
    /// instead when only a comparison between two products is needed;
    /// it compares the widened products directly and so never needs to
    /// reject a product that doesn't narrow back into `i128`.
    pub fn k(r0: i128, r1: i128) -> AmmResult<i128> {
        require_non_negative("r0", r0)?;
        require_non_negative("r1", r1)?;
        let (hi, lo) = widening_mul(r0 as u128, r1 as u128);
        narrow_to_i128(hi, lo, "k")
    }

    /// `new0 * new1 >= old0 * old1`, without narrowing either product.
    pub fn verify_k(new0: i128, new1: i128, old0: i128, old1: i128) -> AmmResult<bool> {
        require_non_negative("new0", new0)?;
        require_non_negative("new1", new1)?;
        require_non_negative("old0", old0)?;
        require_non_negative("old1", old1)?;
        let new_k = widening_mul(new0 as u128, new1 as u128);
        let old_k = widening_mul(old0 as u128, old1 as u128);
        Ok(new_k >= old_k)
    }

    /// Scale a human amount up by `10^decimals` (e.g. 1.5 tokens with
    /// `decimals = 6` and `amount = 1_500_000` stays as-is; this scales
    /// a *smaller*-decimals amount up to a contract's native decimals).
    pub fn to_contract_amount(amount: i128, decimals: u32) -> AmmResult<i128> {
        require_non_negative("amount", amount)?;
        let scale = 10i128
            .checked_pow(decimals)
            .ok_or_else(|| AmmError::Overflow { context: "to_contract_amount scale".to_string() })?;
        amount
            .checked_mul(scale)
            .ok_or_else(|| AmmError::Overflow { context: "to_contract_amount".to_string() })
    }

    /// Inverse of [`Self::to_contract_amount`], truncating (flooring)
    /// any fractional digits beyond `decimals`.
    pub fn from_contract_amount(amount: i128, decimals: u32) -> AmmResult<i128> {
        require_non_negative("amount", amount)?;
        let scale = 10i128
            .checked_pow(decimals)
            .ok_or_else(|| AmmError::Overflow { context: "from_contract_amount scale".to_string() })?;
        Ok(amount / scale)
    }
}

/// Newton's method floor square root over a 256-bit unsigned value
/// represented as `(hi, lo)`. Starts from an over-estimate (`u128::MAX`
/// whenever `hi != 0`, else `lo` itself) so the iteration decreases
/// monotonically to the floor, matching the standard integer-sqrt
/// convergence argument.
fn sqrt_wide(hi: u128, lo: u128) -> u128 {
    if hi == 0 && lo == 0 {
        return 0;
    }
    let mut x0: u128 = if hi != 0 { u128::MAX } else { lo };
    loop {
        let (q_hi, q_lo, _) = div_rem_wide(hi, lo, x0);
        debug_assert_eq!(q_hi, 0, "v/x0 must fit in u128 once x0 >= sqrt(v)");
        let x1 = avg(x0, q_lo);
        if x1 >= x0 {
            return x0;
        }
        x0 = x1;
    }
}

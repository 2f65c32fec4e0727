//! Price movement and token amounts for a fixed liquidity.
//!
//! Within a single tick range liquidity `L` is constant and
//!
//! - `Δx = L * (1/√P_a - 1/√P_b)` (token0),
//! - `Δy = L * (√P_b - √P_a)` (token1).
//!
//! Every function here rounds in the pool's favour: the next price is
//! chosen so the trader never receives more than they paid for, and
//! amounts owed to the pool round up while amounts paid out round down.

use alloy_primitives::{I256, U256};

use super::checked::{check_u160, neg_i256, to_i256, CheckedArithmetic};
use super::full_math::{div_rounding_up, mul_div, mul_div_floor, mul_div_rounding_up};
use crate::domain::Rounding;
use crate::error::AmmError;

/// Number of fractional bits in a Q64.96 value.
pub const RESOLUTION: usize = 96;

/// `2^96`.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// `2^160 - 1`, the largest amount that can be shifted left by 96 bits
/// without overflowing.
const MAX_U160: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);

/// Next sqrt-price after adding or removing `amount` of token0, rounded up.
///
/// Rounding up keeps the price from moving too far in either direction:
/// on input it under-shoots the price drop, on output it over-charges.
///
/// # Errors
///
/// - [`AmmError::Overflow`] if the result does not fit 160 bits.
/// - [`AmmError::InsufficientLiquidity`] when removing more token0 than
///   the range holds.
pub fn next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, AmmError> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let product = amount.checked_mul(sqrt_price_x96);

    if add {
        if let Some(product) = product {
            if let Some(denominator) = numerator1.checked_add(product) {
                return check_u160(mul_div_rounding_up(numerator1, sqrt_price_x96, denominator)?);
            }
        }
        // L * √P / (L + Δx * √P) rearranged to avoid the overflowing product
        let denominator = numerator1
            .safe_div(&sqrt_price_x96, Rounding::Down)?
            .safe_add(&amount)?;
        check_u160(div_rounding_up(numerator1, denominator)?)
    } else {
        let Some(product) = product.filter(|p| numerator1 > *p) else {
            return Err(AmmError::InsufficientLiquidity);
        };
        let denominator = numerator1 - product;
        check_u160(mul_div_rounding_up(numerator1, sqrt_price_x96, denominator)?)
    }
}

/// Next sqrt-price after adding or removing `amount` of token1, rounded down.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `liquidity` is zero.
/// - [`AmmError::Overflow`] if the result does not fit 160 bits.
/// - [`AmmError::InsufficientLiquidity`] when removing more token1 than
///   the range holds.
pub fn next_sqrt_price_from_amount1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, AmmError> {
    let liquidity = U256::from(liquidity);
    if add {
        let quotient = if amount <= MAX_U160 {
            (amount << RESOLUTION).safe_div(&liquidity, Rounding::Down)?
        } else {
            mul_div_floor(amount, Q96, liquidity)?
        };
        check_u160(sqrt_price_x96.safe_add(&quotient)?)
    } else {
        let quotient = if amount <= MAX_U160 {
            div_rounding_up(amount << RESOLUTION, liquidity)?
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };
        if sqrt_price_x96 <= quotient {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(sqrt_price_x96 - quotient)
    }
}

/// Next sqrt-price after swapping `amount_in` into the pool.
///
/// # Errors
///
/// - [`AmmError::InvalidPrice`] if `sqrt_price_x96` is zero.
/// - [`AmmError::InsufficientLiquidity`] if `liquidity` is zero.
/// - Propagates the errors of the amount helpers.
pub fn next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, AmmError> {
    ensure_nonzero(sqrt_price_x96, liquidity)?;
    if zero_for_one {
        next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in, true)
    } else {
        next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt-price after taking `amount_out` out of the pool.
///
/// # Errors
///
/// - [`AmmError::InvalidPrice`] if `sqrt_price_x96` is zero.
/// - [`AmmError::InsufficientLiquidity`] if `liquidity` is zero or the
///   range cannot cover `amount_out`.
pub fn next_sqrt_price_from_output(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, AmmError> {
    ensure_nonzero(sqrt_price_x96, liquidity)?;
    if zero_for_one {
        next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_out, false)
    } else {
        next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_out, false)
    }
}

fn ensure_nonzero(sqrt_price_x96: U256, liquidity: u128) -> Result<(), AmmError> {
    if sqrt_price_x96.is_zero() {
        return Err(AmmError::InvalidPrice("sqrt price must be positive"));
    }
    if liquidity == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(())
}

/// Token0 between two sqrt-prices: `L * (√P_b - √P_a) / (√P_a * √P_b)`.
///
/// The prices may be given in either order.
///
/// # Errors
///
/// - [`AmmError::InvalidPrice`] if the lower price is zero.
/// - [`AmmError::Overflow`] if the amount exceeds 256 bits.
pub fn amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256, AmmError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower.is_zero() {
        return Err(AmmError::InvalidPrice("sqrt price must be positive"));
    }
    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = upper - lower;

    match rounding {
        Rounding::Up => div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower),
        Rounding::Down => mul_div_floor(numerator1, numerator2, upper)?.safe_div(&lower, Rounding::Down),
    }
}

/// Token1 between two sqrt-prices: `L * (√P_b - √P_a)`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the amount exceeds 256 bits.
pub fn amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256, AmmError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    mul_div(U256::from(liquidity), upper - lower, Q96, rounding)
}

/// Signed token0 delta for a liquidity change.
///
/// Adding liquidity (positive delta) rounds up; removing rounds down and
/// negates, so the pool never pays out more than it took in.
///
/// # Errors
///
/// Propagates [`amount0_delta`] errors, plus [`AmmError::Overflow`] if
/// the amount does not fit `I256`.
pub fn amount0_delta_signed(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, AmmError> {
    let magnitude = liquidity.unsigned_abs();
    if liquidity < 0 {
        neg_i256(to_i256(amount0_delta(sqrt_ratio_a_x96, sqrt_ratio_b_x96, magnitude, Rounding::Down)?)?)
    } else {
        to_i256(amount0_delta(sqrt_ratio_a_x96, sqrt_ratio_b_x96, magnitude, Rounding::Up)?)
    }
}

/// Signed token1 delta for a liquidity change.
///
/// # Errors
///
/// Propagates [`amount1_delta`] errors, plus [`AmmError::Overflow`] if
/// the amount does not fit `I256`.
pub fn amount1_delta_signed(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, AmmError> {
    let magnitude = liquidity.unsigned_abs();
    if liquidity < 0 {
        neg_i256(to_i256(amount1_delta(sqrt_ratio_a_x96, sqrt_ratio_b_x96, magnitude, Rounding::Down)?)?)
    } else {
        to_i256(amount1_delta(sqrt_ratio_a_x96, sqrt_ratio_b_x96, magnitude, Rounding::Up)?)
    }
}

#[inline]
fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::tick_math::sqrt_price_at_tick;
    use proptest::prelude::*;

    fn e18() -> U256 {
        U256::from(1_000_000_000_000_000_000u128)
    }

    fn sqrt_at(tick: i32) -> U256 {
        let Ok(p) = sqrt_price_at_tick(tick) else {
            panic!("valid tick");
        };
        p
    }

    // -- next price ----------------------------------------------------------

    #[test]
    fn zero_price_or_liquidity_rejected() {
        assert!(next_sqrt_price_from_input(U256::ZERO, 1, e18(), true).is_err());
        assert_eq!(
            next_sqrt_price_from_input(Q96, 0, e18(), true),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            next_sqrt_price_from_output(Q96, 0, e18(), true),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn zero_amount_keeps_price() {
        assert_eq!(next_sqrt_price_from_input(Q96, 1_000, U256::ZERO, true), Ok(Q96));
        assert_eq!(next_sqrt_price_from_input(Q96, 1_000, U256::ZERO, false), Ok(Q96));
    }

    #[test]
    fn token1_input_moves_price_up_by_quotient() {
        // price 1, L = 1e18, +0.1e18 token1 -> √P = 1.1
        let liquidity = 1_000_000_000_000_000_000u128;
        let Ok(next) =
            next_sqrt_price_from_input(Q96, liquidity, e18() / U256::from(10u8), false)
        else {
            panic!("expected Ok");
        };
        assert_eq!(next, U256::from(87_150_978_765_690_771_352_898_345_369_u128));
    }

    #[test]
    fn token0_input_moves_price_down() {
        let liquidity = 1_000_000_000_000_000_000u128;
        let Ok(next) =
            next_sqrt_price_from_input(Q96, liquidity, e18() / U256::from(10u8), true)
        else {
            panic!("expected Ok");
        };
        // 1 / 1.1 in Q96, rounded up
        assert_eq!(next, U256::from(72_025_602_285_694_852_357_767_227_579_u128));
    }

    #[test]
    fn output_exceeding_reserves_fails() {
        // range [1, ∞) at L = 1 cannot release 4 units of token0
        assert_eq!(
            next_sqrt_price_from_output(Q96, 1, U256::from(4u8), false),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            next_sqrt_price_from_output(Q96, 1, U256::from(1u8) << 100, true),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn huge_token0_input_uses_fallback_path() {
        // the product amount * √P overflows 256 bits
        let Ok(next) = next_sqrt_price_from_input(Q96, 1, U256::MAX >> 1, true) else {
            panic!("expected Ok");
        };
        assert_eq!(next, U256::from(1u8));
    }

    // -- amount deltas -------------------------------------------------------

    #[test]
    fn deltas_are_zero_for_equal_prices() {
        assert_eq!(amount0_delta(Q96, Q96, 1_000, Rounding::Up), Ok(U256::ZERO));
        assert_eq!(amount1_delta(Q96, Q96, 1_000, Rounding::Up), Ok(U256::ZERO));
    }

    #[test]
    fn one_to_one_range_amounts() {
        // L = 1000 over [-60, 60] at price 1 holds ~3 of each token
        let Ok(a0) = amount0_delta(Q96, sqrt_at(60), 1_000, Rounding::Up) else {
            panic!("expected Ok");
        };
        let Ok(a1) = amount1_delta(sqrt_at(-60), Q96, 1_000, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(a0, U256::from(3u8));
        assert_eq!(a1, U256::from(3u8));
        let Ok(a0_down) = amount0_delta(Q96, sqrt_at(60), 1_000, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(a0_down, U256::from(2u8));
    }

    #[test]
    fn signed_deltas_follow_liquidity_sign() {
        let (a, b) = (sqrt_at(-60), sqrt_at(60));
        let Ok(add) = amount0_delta_signed(a, b, 1_000) else {
            panic!("expected Ok");
        };
        let Ok(remove) = amount0_delta_signed(a, b, -1_000) else {
            panic!("expected Ok");
        };
        assert!(add.is_positive());
        assert!(remove.is_negative());
        assert!(remove.unsigned_abs() <= add.unsigned_abs());
        let Ok(zero) = amount1_delta_signed(a, b, 0) else {
            panic!("expected Ok");
        };
        assert!(zero.is_zero());
    }

    proptest! {
        #[test]
        fn up_never_below_down(t0 in -50_000i32..50_000, t1 in -50_000i32..50_000, l in 1u128..1u128 << 100) {
            let (a, b) = (sqrt_at(t0), sqrt_at(t1));
            let (Ok(up0), Ok(down0)) = (amount0_delta(a, b, l, Rounding::Up), amount0_delta(a, b, l, Rounding::Down)) else {
                panic!("amounts fit 256 bits");
            };
            let (Ok(up1), Ok(down1)) = (amount1_delta(a, b, l, Rounding::Up), amount1_delta(a, b, l, Rounding::Down)) else {
                panic!("amounts fit 256 bits");
            };
            prop_assert!(up0 >= down0 && up0 - down0 <= U256::from(1u8));
            prop_assert!(up1 >= down1 && up1 - down1 <= U256::from(1u8));
        }

        #[test]
        fn input_never_overshoots(l in 1u128..1u128 << 96, amount in 1u64.., zero_for_one: bool) {
            let Ok(next) = next_sqrt_price_from_input(Q96, l, U256::from(amount), zero_for_one) else {
                panic!("in-range input");
            };
            // the amount needed to reach `next` never exceeds what was supplied
            let needed = if zero_for_one {
                amount0_delta(next, Q96, l, Rounding::Up)
            } else {
                amount1_delta(Q96, next, l, Rounding::Up)
            };
            let Ok(needed) = needed else {
                panic!("expected Ok");
            };
            prop_assert!(needed <= U256::from(amount));
        }
    }
}

//! A single swap step within one initialized-tick interval.

use alloy_primitives::{I256, U256};

use super::full_math::{mul_div_floor, mul_div_rounding_up};
use super::sqrt_price_math::{
    amount0_delta, amount1_delta, next_sqrt_price_from_input, next_sqrt_price_from_output,
};
use crate::domain::{Rounding, FEE_DENOMINATOR};
use crate::error::AmmError;

/// Outcome of [`compute_swap_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapStep {
    /// Price reached by the step, never beyond the target.
    pub sqrt_price_next_x96: U256,
    /// Input consumed, excluding the fee.
    pub amount_in: U256,
    /// Output released.
    pub amount_out: U256,
    /// Fee charged on the input.
    pub fee_amount: U256,
}

/// Moves the price from `sqrt_price_current_x96` towards
/// `sqrt_price_target_x96` using at most `amount_remaining`.
///
/// The direction is implied by the two prices. A positive
/// `amount_remaining` is an exact input (the fee is taken from it before
/// pricing); a negative one is an exact output (the fee is added on top
/// of the input). When an exact-input step stops short of the target the
/// unspent remainder is taken entirely as fee, so the step always
/// consumes its whole budget.
///
/// # Errors
///
/// Propagates arithmetic errors from the sqrt-price helpers.
///
/// # Examples
///
/// ```
/// use alloy_primitives::{I256, U256};
/// use hydra_clmm::math::{compute_swap_step, sqrt_price_at_tick};
///
/// let current = U256::from(1u8) << 96;
/// let target = sqrt_price_at_tick(-60).expect("valid tick");
/// let ten = I256::from_raw(U256::from(10u8));
/// let step = compute_swap_step(current, target, 1_000, ten, 3_000).expect("step succeeds");
/// assert_eq!(step.sqrt_price_next_x96, target);
/// assert_eq!(step.amount_in, U256::from(4u8));
/// assert_eq!(step.fee_amount, U256::from(1u8));
/// ```
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<SwapStep, AmmError> {
    if fee_pips >= FEE_DENOMINATOR {
        return Err(AmmError::InvalidFee("fee must be below 1_000_000 pips"));
    }
    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let exact_in = !amount_remaining.is_negative();
    let remaining = amount_remaining.unsigned_abs();
    let fee = U256::from(fee_pips);
    let denominator = U256::from(FEE_DENOMINATOR);

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;

    let sqrt_price_next_x96 = if exact_in {
        let remaining_less_fee = mul_div_floor(remaining, denominator - fee, denominator)?;
        amount_in = if zero_for_one {
            amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, Rounding::Up)?
        } else {
            amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, Rounding::Up)?
        };
        if remaining_less_fee >= amount_in {
            sqrt_price_target_x96
        } else {
            next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            amount1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, Rounding::Down)?
        } else {
            amount0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, Rounding::Down)?
        };
        if remaining >= amount_out {
            sqrt_price_target_x96
        } else {
            next_sqrt_price_from_output(sqrt_price_current_x96, liquidity, remaining, zero_for_one)?
        }
    };

    let reached_target = sqrt_price_next_x96 == sqrt_price_target_x96;

    // recompute whichever side was not pinned by reaching the target
    if zero_for_one {
        if !(reached_target && exact_in) {
            amount_in = amount0_delta(
                sqrt_price_next_x96,
                sqrt_price_current_x96,
                liquidity,
                Rounding::Up,
            )?;
        }
        if !(reached_target && !exact_in) {
            amount_out = amount1_delta(
                sqrt_price_next_x96,
                sqrt_price_current_x96,
                liquidity,
                Rounding::Down,
            )?;
        }
    } else {
        if !(reached_target && exact_in) {
            amount_in = amount1_delta(
                sqrt_price_current_x96,
                sqrt_price_next_x96,
                liquidity,
                Rounding::Up,
            )?;
        }
        if !(reached_target && !exact_in) {
            amount_out = amount0_delta(
                sqrt_price_current_x96,
                sqrt_price_next_x96,
                liquidity,
                Rounding::Down,
            )?;
        }
    }

    // rounding in the price may otherwise release more than requested
    if !exact_in && amount_out > remaining {
        amount_out = remaining;
    }

    let fee_amount = if exact_in && !reached_target {
        remaining.saturating_sub(amount_in)
    } else {
        mul_div_rounding_up(amount_in, fee, denominator - fee)?
    };

    Ok(SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}

//! Fixed-point price math for concentrated liquidity.
//!
//! Everything here is a pure function over integers: Q64.96 sqrt-prices,
//! Q128.128 fee-growth accumulators and 128-bit liquidity. No floating
//! point is used on any state-changing path; the `f64` helpers in
//! [`tick_math`] exist for display and estimates only.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`full_math`] | `a * b / d` with a 512-bit intermediate |
//! | [`tick_math`] | tick ↔ sqrt-price conversion |
//! | [`sqrt_price_math`] | price movement and token amounts for a fixed `L` |
//! | [`swap_math`] | one swap step, including fees |
//! | [`liquidity_math`] | signed liquidity deltas |
//! | [`bit_math`] | bit scans for the tick bitmap |
//! | `checked` | checked arithmetic and width conversions |

pub mod bit_math;
mod checked;
pub mod full_math;
pub mod liquidity_math;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;

pub use checked::{
    check_u160, neg_i256, to_i256, to_u128, truncate_u128, u256_to_f64, CheckedArithmetic,
};
pub use full_math::{div_rounding_up, mul_div, mul_div_floor, mul_div_rounding_up};
pub use liquidity_math::add_delta;
pub use sqrt_price_math::{
    amount0_delta, amount0_delta_signed, amount1_delta, amount1_delta_signed,
    next_sqrt_price_from_input, next_sqrt_price_from_output, Q96,
};
pub use swap_math::{compute_swap_step, SwapStep};
pub use tick_math::{
    price_at_tick, price_from_sqrt_price, sqrt_price_at_tick, tick_at_sqrt_price, MAX_SQRT_RATIO,
    MAX_TICK, MIN_SQRT_RATIO, MIN_TICK,
};

/// `2^128`, the scale of fee-growth and seconds-per-liquidity accumulators.
pub const Q128: alloy_primitives::U256 = alloy_primitives::U256::from_limbs([0, 0, 1, 0]);

//! Conversions between ticks and Q64.96 sqrt-prices.
//!
//! Prices are quantised as `price = 1.0001^tick`; the pool stores
//! `sqrt(price) * 2^96`. The exact conversion decomposes the tick into
//! bits and multiplies precomputed Q128 factors `1/sqrt(1.0001)^(2^i)`,
//! so every node evaluating it agrees bit for bit.
//!
//! # Functions
//!
//! - [`sqrt_price_at_tick`]: exact tick → sqrt-price (rounded up).
//! - [`tick_at_sqrt_price`]: greatest tick whose sqrt-price is ≤ the input.
//! - [`price_at_tick`], [`price_from_sqrt_price`]: `f64` helpers for
//!   display and TWAP reporting; never used on a state-changing path.
//!
//! # Examples
//!
//! ```
//! use hydra_clmm::math::{sqrt_price_at_tick, tick_at_sqrt_price};
//!
//! let p = sqrt_price_at_tick(100).expect("valid tick");
//! assert_eq!(tick_at_sqrt_price(p), Ok(100));
//! ```

use alloy_primitives::U256;

use super::checked::u256_to_f64;
use crate::error::AmmError;

/// Smallest tick whose sqrt-price is representable.
pub const MIN_TICK: i32 = -887_272;

/// Largest tick whose sqrt-price is representable.
pub const MAX_TICK: i32 = -MIN_TICK;

/// `sqrt_price_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4_295_128_739, 0, 0, 0]);

/// `sqrt_price_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 = U256::from_limbs([
    0x5d95_1d52_6398_8d26,
    0xefd1_fc6a_5064_8849,
    0xfffd_8963,
    0,
]);

/// Base of the tick-price exponential: `price = BASE^tick`.
const BASE: f64 = 1.0001;

/// `1/sqrt(1.0001)^(2^i)` in Q128 for bits 1..=19 of `|tick|`.
const RATIO_FACTORS: [(u32, u128); 19] = [
    (0x2, 0xfff9_7272_373d_4132_59a4_6990_580e_213a),
    (0x4, 0xfff2_e50f_5f65_6932_ef12_357c_f3c7_fdcc),
    (0x8, 0xffe5_caca_7e10_e4e6_1c36_24ea_a094_1cd0),
    (0x10, 0xffcb_9843_d60f_6159_c9db_5883_5c92_6644),
    (0x20, 0xff97_3b41_fa98_c081_472e_6896_dfb2_54c0),
    (0x40, 0xff2e_a164_66c9_6a38_43ec_78b3_26b5_2861),
    (0x80, 0xfe5d_ee04_6a99_a2a8_11c4_61f1_969c_3053),
    (0x100, 0xfcbe_86c7_900a_88ae_dcff_c83b_479a_a3a4),
    (0x200, 0xf987_a725_3ac4_1317_6f2b_074c_f781_5e54),
    (0x400, 0xf339_2b08_22b7_0005_940c_7a39_8e4b_70f3),
    (0x800, 0xe715_9475_a2c2_9b74_43b2_9c7f_a6e8_89d9),
    (0x1000, 0xd097_f3bd_fd20_22b8_845a_d8f7_92aa_5825),
    (0x2000, 0xa9f7_4646_2d87_0fdf_8a65_dc1f_90e0_61e5),
    (0x4000, 0x70d8_69a1_56d2_a1b8_90bb_3df6_2baf_32f7),
    (0x8000, 0x31be_135f_97d0_8fd9_8123_1505_542f_cfa6),
    (0x10000, 0x9aa_508b_5b7a_84e1_c677_de54_f3e9_9bc9),
    (0x20000, 0x5d_6af8_dedb_8119_6699_c329_225e_e604),
    (0x40000, 0x22_16e5_84f5_fa1e_a926_041b_edfe_98),
    (0x80000, 0x4_8a17_0391_f7dc_4244_4e8f_a2),
];

/// Factor applied when bit 0 of `|tick|` is set.
const BIT0_FACTOR: u128 = 0xfffc_b933_bd6f_ad37_aa2d_162d_1a59_4001;

/// Computes `sqrt(1.0001^tick) * 2^96`, rounded up.
///
/// # Errors
///
/// Returns [`AmmError::InvalidTick`] if `|tick| > MAX_TICK`.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use hydra_clmm::math::{sqrt_price_at_tick, MIN_SQRT_RATIO};
///
/// assert_eq!(sqrt_price_at_tick(0), Ok(U256::from(1u8) << 96));
/// assert_eq!(sqrt_price_at_tick(-887_272), Ok(MIN_SQRT_RATIO));
/// assert!(sqrt_price_at_tick(887_273).is_err());
/// ```
pub fn sqrt_price_at_tick(tick: i32) -> Result<U256, AmmError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK.unsigned_abs() {
        return Err(AmmError::InvalidTick("tick outside [MIN_TICK, MAX_TICK]"));
    }

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(BIT0_FACTOR)
    } else {
        U256::from(1u8) << 128
    };
    for (bit, factor) in RATIO_FACTORS {
        if abs_tick & bit != 0 {
            // ratio <= 2^128 and factor < 2^128: the product fits
            ratio = ratio.wrapping_mul(U256::from(factor)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so tick_at_sqrt_price stays consistent
    let shifted = ratio >> 32;
    let has_remainder = !(ratio & U256::from(u32::MAX)).is_zero();
    Ok(if has_remainder {
        shifted + U256::from(1u8)
    } else {
        shifted
    })
}

/// Returns the greatest tick `t` with `sqrt_price_at_tick(t) <= sqrt_price_x96`.
///
/// A logarithm estimate lands within a tick or two of the answer; the
/// result is then snapped exactly against [`sqrt_price_at_tick`], which
/// is strictly increasing, so the round trip is exact for every tick.
///
/// # Errors
///
/// Returns [`AmmError::InvalidPrice`] unless
/// `MIN_SQRT_RATIO <= sqrt_price_x96 < MAX_SQRT_RATIO`.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use hydra_clmm::math::{tick_at_sqrt_price, MAX_SQRT_RATIO, MIN_SQRT_RATIO};
///
/// assert_eq!(tick_at_sqrt_price(U256::from(1u8) << 96), Ok(0));
/// assert_eq!(tick_at_sqrt_price(MIN_SQRT_RATIO), Ok(-887_272));
/// assert!(tick_at_sqrt_price(MAX_SQRT_RATIO).is_err());
/// ```
pub fn tick_at_sqrt_price(sqrt_price_x96: U256) -> Result<i32, AmmError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(AmmError::InvalidPrice(
            "sqrt price outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)",
        ));
    }

    // tick = log_{sqrt(1.0001)}(sqrt_price / 2^96)
    let ln_sqrt_price = u256_to_f64(sqrt_price_x96).ln() - 96.0 * core::f64::consts::LN_2;
    let estimate = (2.0 * ln_sqrt_price / BASE.ln()).floor();
    #[allow(clippy::cast_possible_truncation)]
    let mut tick = (estimate as i32).clamp(MIN_TICK, MAX_TICK - 1);

    while tick > MIN_TICK && sqrt_price_at_tick(tick)? > sqrt_price_x96 {
        tick -= 1;
    }
    while tick < MAX_TICK - 1 && sqrt_price_at_tick(tick + 1)? <= sqrt_price_x96 {
        tick += 1;
    }
    Ok(tick)
}

/// `1.0001^tick` as a float.
///
/// # Errors
///
/// Returns [`AmmError::InvalidTick`] if `tick` is outside
/// `[MIN_TICK, MAX_TICK]`.
#[must_use = "this returns the computed price and does not modify state"]
pub fn price_at_tick(tick: i32) -> Result<f64, AmmError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(AmmError::InvalidTick("tick outside [MIN_TICK, MAX_TICK]"));
    }
    Ok(BASE.powf(f64::from(tick)))
}

/// Token1-per-token0 price implied by a Q64.96 sqrt-price, as a float.
#[must_use]
pub fn price_from_sqrt_price(sqrt_price_x96: U256) -> f64 {
    let sqrt = u256_to_f64(sqrt_price_x96) / 2f64.powi(96);
    sqrt * sqrt
}

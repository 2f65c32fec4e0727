//! `a * b / d` with a full 512-bit intermediate product.
//!
//! Fixed-point price math multiplies two 256-bit quantities before
//! dividing, so the product routinely exceeds 256 bits even when the
//! quotient does not. [`mul_div`] widens both factors to [`U512`], divides
//! once and narrows the quotient back, failing only when the *result*
//! does not fit.

use alloy_primitives::{U256, U512};

use crate::domain::Rounding;
use crate::error::AmmError;

#[inline]
fn widen(x: U256) -> U512 {
    let [l0, l1, l2, l3] = *x.as_limbs();
    U512::from_limbs([l0, l1, l2, l3, 0, 0, 0, 0])
}

#[inline]
fn narrow(x: U512) -> Option<U256> {
    let [l0, l1, l2, l3, l4, l5, l6, l7] = *x.as_limbs();
    if (l4 | l5 | l6 | l7) != 0 {
        return None;
    }
    Some(U256::from_limbs([l0, l1, l2, l3]))
}

/// Computes `a * b / denominator` rounded in the given direction.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `denominator` is zero.
/// - [`AmmError::Overflow`] if the rounded quotient exceeds `U256::MAX`.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use hydra_clmm::domain::Rounding;
/// use hydra_clmm::math::mul_div;
///
/// let q128 = U256::from(1u8) << 128;
/// // (2^128 * 2^128) / 2^128 does not overflow despite the 2^256 product.
/// assert_eq!(mul_div(q128, q128, q128, Rounding::Down), Ok(q128));
/// assert_eq!(
///     mul_div(U256::from(7u8), U256::from(3u8), U256::from(2u8), Rounding::Up),
///     Ok(U256::from(11u8)),
/// );
/// ```
pub fn mul_div(
    a: U256,
    b: U256,
    denominator: U256,
    rounding: Rounding,
) -> Result<U256, AmmError> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let product = widen(a).wrapping_mul(widen(b));
    let (quotient, remainder) = product.div_rem(widen(denominator));
    let quotient = narrow(quotient).ok_or(AmmError::Overflow("mul_div result exceeds 256 bits"))?;
    if rounding.is_up() && !remainder.is_zero() {
        return quotient
            .checked_add(U256::from(1u8))
            .ok_or(AmmError::Overflow("mul_div rounding overflow"));
    }
    Ok(quotient)
}

/// [`mul_div`] rounding down.
///
/// # Errors
///
/// See [`mul_div`].
#[inline]
pub fn mul_div_floor(a: U256, b: U256, denominator: U256) -> Result<U256, AmmError> {
    mul_div(a, b, denominator, Rounding::Down)
}

/// [`mul_div`] rounding up.
///
/// # Errors
///
/// See [`mul_div`].
#[inline]
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, AmmError> {
    mul_div(a, b, denominator, Rounding::Up)
}

/// `ceil(a / denominator)`.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `denominator` is zero.
#[inline]
pub fn div_rounding_up(a: U256, denominator: U256) -> Result<U256, AmmError> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let (q, r) = a.div_rem(denominator);
    if r.is_zero() {
        Ok(q)
    } else {
        Ok(q.wrapping_add(U256::from(1u8)))
    }
}

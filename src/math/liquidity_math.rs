//! Signed liquidity adjustments.

use super::checked::CheckedArithmetic;
use crate::error::AmmError;

/// Applies a signed delta to an unsigned liquidity value.
///
/// # Errors
///
/// - [`AmmError::Underflow`] if a negative delta exceeds `x`.
/// - [`AmmError::Overflow`] if a positive delta pushes past `u128::MAX`.
///
/// # Examples
///
/// ```
/// use hydra_clmm::math::add_delta;
///
/// assert_eq!(add_delta(10, -3), Ok(7));
/// assert!(add_delta(1, -2).is_err());
/// ```
#[inline]
pub fn add_delta(x: u128, y: i128) -> Result<u128, AmmError> {
    let magnitude = y.unsigned_abs();
    if y < 0 {
        x.safe_sub(&magnitude)
    } else {
        x.safe_add(&magnitude)
    }
}

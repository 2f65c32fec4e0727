//! Bit scans over 256-bit words, used by the tick bitmap.

use alloy_primitives::U256;

use crate::error::AmmError;

/// Index of the highest set bit: `x >= 2^msb && x < 2^(msb + 1)`.
///
/// # Errors
///
/// Returns [`AmmError::InvalidQuantity`] if `x` is zero.
#[inline]
pub fn most_significant_bit(x: U256) -> Result<u8, AmmError> {
    if x.is_zero() {
        return Err(AmmError::InvalidQuantity("bit scan of zero"));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok((255 - x.leading_zeros()) as u8)
}

/// Index of the lowest set bit: `x & (1 << lsb) != 0` and no lower bit is set.
///
/// # Errors
///
/// Returns [`AmmError::InvalidQuantity`] if `x` is zero.
#[inline]
pub fn least_significant_bit(x: U256) -> Result<u8, AmmError> {
    if x.is_zero() {
        return Err(AmmError::InvalidQuantity("bit scan of zero"));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(x.trailing_zeros() as u8)
}

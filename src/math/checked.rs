//! Checked arithmetic and width conversions for the engine's integer types.
//!
//! The [`CheckedArithmetic`] trait provides fallible arithmetic that
//! returns [`Result<Self, AmmError>`](crate::error::AmmError) instead of
//! wrapping or panicking. The free functions convert between the unsigned
//! 256-bit amounts, the signed 256-bit swap deltas and the 128-bit
//! liquidity values without going through lossy `as` casts.
//!
//! # Examples
//!
//! ```
//! use alloy_primitives::U256;
//! use hydra_clmm::domain::Rounding;
//! use hydra_clmm::math::CheckedArithmetic;
//!
//! let q = U256::from(10u8).safe_div(&U256::from(3u8), Rounding::Up);
//! assert_eq!(q, Ok(U256::from(4u8)));
//! assert!(U256::MAX.safe_add(&U256::from(1u8)).is_err());
//! ```

use alloy_primitives::{I256, U256};

use crate::domain::Rounding;
use crate::error::AmmError;

/// Fallible arithmetic.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No silent wrapping**: code paths that rely on modular arithmetic
///   call the `wrapping_*` methods explicitly.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_mul(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked division with explicit [`Rounding`] direction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError>;
}

// ---------------------------------------------------------------------------
// U256
// ---------------------------------------------------------------------------

impl CheckedArithmetic for U256 {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(*other)
            .ok_or(AmmError::Overflow("u256 addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(*other)
            .ok_or(AmmError::Underflow("u256 subtraction underflow"))
    }

    #[inline]
    fn safe_mul(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_mul(*other)
            .ok_or(AmmError::Overflow("u256 multiplication overflow"))
    }

    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError> {
        if other.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        let (q, r) = self.div_rem(*other);
        if rounding.is_up() && !r.is_zero() {
            // other >= 2 here, so q < U256::MAX
            return Ok(q.wrapping_add(U256::from(1u8)));
        }
        Ok(q)
    }
}

// ---------------------------------------------------------------------------
// u128
// ---------------------------------------------------------------------------

impl CheckedArithmetic for u128 {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(*other)
            .ok_or(AmmError::Overflow("u128 addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(*other)
            .ok_or(AmmError::Underflow("u128 subtraction underflow"))
    }

    #[inline]
    fn safe_mul(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_mul(*other)
            .ok_or(AmmError::Overflow("u128 multiplication overflow"))
    }

    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError> {
        if *other == 0 {
            return Err(AmmError::DivisionByZero);
        }
        let q = self / other;
        if rounding.is_up() && self % other != 0 {
            return Ok(q + 1);
        }
        Ok(q)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Reinterprets a non-negative `U256` as `I256`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `value >= 2^255`.
#[inline]
pub fn to_i256(value: U256) -> Result<I256, AmmError> {
    if value.bit(255) {
        return Err(AmmError::Overflow("value does not fit in int256"));
    }
    Ok(I256::from_raw(value))
}

/// Negates an `I256`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] for `I256::MIN`.
#[inline]
pub fn neg_i256(value: I256) -> Result<I256, AmmError> {
    value
        .checked_neg()
        .ok_or(AmmError::Overflow("int256 negation overflow"))
}

/// Narrows a `U256` to `u128`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `value >= 2^128`.
#[inline]
pub fn to_u128(value: U256) -> Result<u128, AmmError> {
    let [l0, l1, l2, l3] = *value.as_limbs();
    if l2 != 0 || l3 != 0 {
        return Err(AmmError::Overflow("value does not fit in uint128"));
    }
    Ok(low_u128(l0, l1))
}

/// Keeps the low 128 bits of a `U256`, discarding the rest.
#[must_use]
#[inline]
pub fn truncate_u128(value: U256) -> u128 {
    let [l0, l1, _, _] = *value.as_limbs();
    low_u128(l0, l1)
}

/// Ensures `value` fits in 160 bits, the width of a sqrt-price.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `value >= 2^160`.
#[inline]
pub fn check_u160(value: U256) -> Result<U256, AmmError> {
    if value.bit_len() > 160 {
        return Err(AmmError::Overflow("value does not fit in uint160"));
    }
    Ok(value)
}

/// Approximate `f64` value of a `U256`, for estimates and display only.
#[must_use]
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0_f64, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

#[inline]
const fn low_u128(l0: u64, l1: u64) -> u128 {
    ((l1 as u128) << 64) | l0 as u128
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- U256 ---------------------------------------------------------------

    #[test]
    fn u256_add_overflow() {
        let Err(AmmError::Overflow(_)) = U256::MAX.safe_add(&U256::from(1u8)) else {
            panic!("expected Overflow");
        };
    }

    #[test]
    fn u256_sub_underflow() {
        let Err(AmmError::Underflow(_)) = U256::ZERO.safe_sub(&U256::from(1u8)) else {
            panic!("expected Underflow");
        };
    }

    #[test]
    fn u256_div_rounding() {
        let seven = U256::from(7u8);
        let two = U256::from(2u8);
        assert_eq!(seven.safe_div(&two, Rounding::Down), Ok(U256::from(3u8)));
        assert_eq!(seven.safe_div(&two, Rounding::Up), Ok(U256::from(4u8)));
        assert_eq!(
            U256::from(8u8).safe_div(&two, Rounding::Up),
            Ok(U256::from(4u8))
        );
        assert_eq!(seven.safe_div(&U256::ZERO, Rounding::Up), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn u256_div_up_at_max() {
        let Ok(q) = U256::MAX.safe_div(&U256::from(2u8), Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(q, (U256::MAX >> 1) + U256::from(1u8));
    }

    // -- u128 ---------------------------------------------------------------

    #[test]
    fn u128_ops() {
        assert_eq!(1u128.safe_add(&2), Ok(3));
        assert!(u128::MAX.safe_mul(&2).is_err());
        assert_eq!(10u128.safe_div(&4, Rounding::Up), Ok(3));
        assert_eq!(10u128.safe_div(&4, Rounding::Down), Ok(2));
    }

    // -- conversions --------------------------------------------------------

    #[test]
    fn to_i256_rejects_high_bit() {
        assert!(to_i256(U256::from(1u8) << 255).is_err());
        let Ok(v) = to_i256(U256::from(42u8)) else {
            panic!("expected Ok");
        };
        assert_eq!(v.unsigned_abs(), U256::from(42u8));
    }

    #[test]
    fn u128_narrowing() {
        assert_eq!(to_u128(U256::from(u128::MAX)), Ok(u128::MAX));
        assert!(to_u128(U256::from(1u8) << 128).is_err());
        assert_eq!(truncate_u128((U256::from(1u8) << 128) + U256::from(9u8)), 9);
    }

    #[test]
    fn u160_bound() {
        assert!(check_u160((U256::from(1u8) << 160) - U256::from(1u8)).is_ok());
        assert!(check_u160(U256::from(1u8) << 160).is_err());
    }

    #[test]
    fn f64_estimate() {
        let v = u256_to_f64(U256::from(1u8) << 96);
        assert!((v - 2f64.powi(96)).abs() < 1.0);
    }
}

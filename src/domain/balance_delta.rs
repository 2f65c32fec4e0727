//! Signed token deltas reported by a swap.

use core::fmt;

use alloy_primitives::I256;

/// Net token movement of a swap from the pool's point of view.
///
/// A positive amount was received by the pool, a negative amount was paid
/// out by it. Exactly one side is positive for any swap that moved the
/// price; both may be zero when the limit equals the current price.
///
/// # Examples
///
/// ```
/// use alloy_primitives::I256;
/// use hydra_clmm::domain::BalanceDelta;
///
/// let delta = BalanceDelta::new(I256::ONE, I256::MINUS_ONE);
/// assert!(delta.amount0.is_positive());
/// assert!(delta.amount1.is_negative());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BalanceDelta {
    /// Token0 delta.
    pub amount0: I256,
    /// Token1 delta.
    pub amount1: I256,
}

impl BalanceDelta {
    /// No movement.
    pub const ZERO: Self = Self {
        amount0: I256::ZERO,
        amount1: I256::ZERO,
    };

    /// Creates a delta from its two sides.
    #[must_use]
    pub const fn new(amount0: I256, amount1: I256) -> Self {
        Self { amount0, amount1 }
    }

    /// Returns `true` if neither side moved.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }
}

impl fmt::Display for BalanceDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BalanceDelta(amount0={}, amount1={})", self.amount0, self.amount1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(BalanceDelta::default(), BalanceDelta::ZERO);
        assert!(BalanceDelta::ZERO.is_zero());
    }

    #[test]
    fn display() {
        let d = BalanceDelta::new(I256::ONE, I256::MINUS_ONE);
        assert_eq!(d.to_string(), "BalanceDelta(amount0=1, amount1=-1)");
        assert!(!d.is_zero());
    }
}

//! Ordered pair of distinct assets.

use super::Address;
use crate::error::AmmError;

/// An ordered pair of distinct asset addresses.
///
/// The canonical ordering guarantees `token0 < token1`, so the pair
/// `(A, B)` and `(B, A)` describe the same pool. Every signed amount the
/// engine reports is expressed against this ordering: `amount0` is always
/// `token0`, `amount1` always `token1`.
///
/// # Examples
///
/// ```
/// use hydra_clmm::domain::{Address, TokenPair};
///
/// let usdc = Address::repeat_byte(2);
/// let weth = Address::repeat_byte(1);
///
/// let pair = TokenPair::new(usdc, weth).expect("distinct tokens");
/// assert_eq!(pair.token0(), weth);
/// assert_eq!(pair.token1(), usdc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenPair {
    token0: Address,
    token1: Address,
}

impl TokenPair {
    /// Creates a new canonically-ordered `TokenPair`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if both addresses are equal or
    /// either one is the zero address.
    pub fn new(token_a: Address, token_b: Address) -> Result<Self, AmmError> {
        if token_a == token_b {
            return Err(AmmError::InvalidToken(
                "token pair requires two distinct addresses",
            ));
        }
        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        if token0.is_zero() {
            return Err(AmmError::InvalidToken("token address must be non-zero"));
        }
        Ok(Self { token0, token1 })
    }

    /// Returns the lower-addressed asset.
    #[must_use]
    pub const fn token0(&self) -> Address {
        self.token0
    }

    /// Returns the higher-addressed asset.
    #[must_use]
    pub const fn token1(&self) -> Address {
        self.token1
    }

    /// Returns `true` if `token` is part of this pair.
    #[must_use]
    pub fn contains(&self, token: &Address) -> bool {
        self.token0 == *token || self.token1 == *token
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn sorts_reversed_input() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let Ok(pair) = TokenPair::new(b, a) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.token0(), a);
        assert_eq!(pair.token1(), b);
    }

    #[test]
    fn rejects_same_address() {
        let a = Address::repeat_byte(1);
        let Err(e) = TokenPair::new(a, a) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            AmmError::InvalidToken("token pair requires two distinct addresses")
        );
    }

    #[test]
    fn rejects_zero_address() {
        assert!(TokenPair::new(Address::zero(), Address::repeat_byte(3)).is_err());
    }

    #[test]
    fn order_independent_equality() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        assert_eq!(TokenPair::new(a, b), TokenPair::new(b, a));
    }

    #[test]
    fn contains_members_only() {
        let Ok(pair) = TokenPair::new(Address::repeat_byte(1), Address::repeat_byte(2)) else {
            panic!("expected Ok");
        };
        assert!(pair.contains(&Address::repeat_byte(1)));
        assert!(pair.contains(&Address::repeat_byte(2)));
        assert!(!pair.contains(&Address::repeat_byte(3)));
    }
}

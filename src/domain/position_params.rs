//! Parameters of the position and flash entry points.

use alloy_primitives::U256;

use super::{Address, TickRange};

/// Parameters of [`Pool::mint`](crate::pool::Pool::mint).
///
/// The liquidity is credited to `recipient`; the payment callback is
/// responsible for delivering the owed token amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MintParams {
    /// Position owner.
    pub recipient: Address,
    /// Range receiving the liquidity.
    pub range: TickRange,
    /// Liquidity to add; must be non-zero.
    pub amount: u128,
}

impl MintParams {
    /// Creates mint parameters.
    #[must_use]
    pub const fn new(recipient: Address, range: TickRange, amount: u128) -> Self {
        Self {
            recipient,
            range,
            amount,
        }
    }
}

/// Parameters of [`Pool::collect`](crate::pool::Pool::collect).
///
/// Requested amounts are capped at what the position is owed, so
/// `u128::MAX` collects everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectParams {
    /// Receiver of the collected tokens.
    pub recipient: Address,
    /// Range of the caller's position.
    pub range: TickRange,
    /// Upper bound on token0 collected.
    pub amount0_requested: u128,
    /// Upper bound on token1 collected.
    pub amount1_requested: u128,
}

impl CollectParams {
    /// Creates collect parameters.
    #[must_use]
    pub const fn new(
        recipient: Address,
        range: TickRange,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Self {
        Self {
            recipient,
            range,
            amount0_requested,
            amount1_requested,
        }
    }

    /// Collects everything owed.
    #[must_use]
    pub const fn all(recipient: Address, range: TickRange) -> Self {
        Self::new(recipient, range, u128::MAX, u128::MAX)
    }
}

/// Parameters of [`Pool::flash`](crate::pool::Pool::flash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlashParams {
    /// Receiver of the borrowed tokens.
    pub recipient: Address,
    /// Token0 borrowed.
    pub amount0: U256,
    /// Token1 borrowed.
    pub amount1: U256,
}

impl FlashParams {
    /// Creates flash parameters.
    #[must_use]
    pub const fn new(recipient: Address, amount0: U256, amount1: U256) -> Self {
        Self {
            recipient,
            amount0,
            amount1,
        }
    }
}

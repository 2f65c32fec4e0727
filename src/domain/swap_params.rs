//! Swap request parameters.

use core::fmt;

use alloy_primitives::{I256, U256};

use super::Address;
use crate::math::{neg_i256, to_i256};
use crate::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};

/// Whether the specified amount fixes the input or the output side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SwapKind {
    /// The input amount is fixed; output is computed.
    ExactInput = 0,
    /// The output amount is fixed; input is computed.
    ExactOutput = 1,
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactInput => write!(f, "ExactInput"),
            Self::ExactOutput => write!(f, "ExactOutput"),
        }
    }
}

/// Parameters of a single [`Pool::swap`](crate::pool::Pool::swap) call.
///
/// `amount_specified` follows the signed convention of the engine:
/// positive for exact input, negative for exact output. The pool rejects
/// a zero amount and validates `sqrt_price_limit_x96` against the current
/// price, so constructing the struct never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapParams {
    /// Receiver of the output asset.
    pub recipient: Address,
    /// `true` sells token0 for token1 (price moves down).
    pub zero_for_one: bool,
    /// Positive: exact input. Negative: exact output.
    pub amount_specified: I256,
    /// Price the swap may not cross, as Q64.96 sqrt-price.
    pub sqrt_price_limit_x96: U256,
}

impl SwapParams {
    /// Raw constructor using the signed amount convention.
    #[must_use]
    pub const fn new(
        recipient: Address,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: U256,
    ) -> Self {
        Self {
            recipient,
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
        }
    }

    /// Exact-input swap of `amount_in` with no price limit.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if
    /// `amount_in` does not fit a signed 256-bit integer.
    pub fn exact_input(
        recipient: Address,
        zero_for_one: bool,
        amount_in: U256,
    ) -> crate::error::Result<Self> {
        Ok(Self::new(
            recipient,
            zero_for_one,
            to_i256(amount_in)?,
            Self::unbounded_limit(zero_for_one),
        ))
    }

    /// Exact-output swap of `amount_out` with no price limit.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if
    /// `amount_out` does not fit a signed 256-bit integer.
    pub fn exact_output(
        recipient: Address,
        zero_for_one: bool,
        amount_out: U256,
    ) -> crate::error::Result<Self> {
        Ok(Self::new(
            recipient,
            zero_for_one,
            neg_i256(to_i256(amount_out)?)?,
            Self::unbounded_limit(zero_for_one),
        ))
    }

    /// Replaces the price limit.
    #[must_use]
    pub const fn with_limit(mut self, sqrt_price_limit_x96: U256) -> Self {
        self.sqrt_price_limit_x96 = sqrt_price_limit_x96;
        self
    }

    /// The most permissive legal limit for the given direction.
    #[must_use]
    pub fn unbounded_limit(zero_for_one: bool) -> U256 {
        if zero_for_one {
            MIN_SQRT_RATIO + U256::from(1u8)
        } else {
            MAX_SQRT_RATIO - U256::from(1u8)
        }
    }

    /// Exact input or exact output.
    #[must_use]
    pub fn kind(&self) -> SwapKind {
        if self.amount_specified.is_negative() {
            SwapKind::ExactOutput
        } else {
            SwapKind::ExactInput
        }
    }
}

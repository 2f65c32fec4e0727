//! The pool's hot state and accrued protocol fees.

use alloy_primitives::U256;

/// State read and written by almost every pool operation.
///
/// `fee_protocol` packs two 4-bit denominators: the low nibble applies to
/// token0 fees, the high nibble to token1. A value of `n` diverts `1/n`
/// of the swap fee to the protocol; `0` disables the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    /// Current sqrt-price, Q64.96.
    pub sqrt_price_x96: U256,
    /// Current tick.
    pub tick: i32,
    /// Index of the most recent oracle observation.
    pub observation_index: u16,
    /// Number of populated oracle slots.
    pub observation_cardinality: u16,
    /// Number of allocated oracle slots.
    pub observation_cardinality_next: u16,
    /// Packed protocol fee denominators.
    pub fee_protocol: u8,
    /// Reentrancy flag; `false` before initialization and while an
    /// operation is in progress.
    pub unlocked: bool,
}

impl Slot {
    /// Protocol fee denominator for token0.
    #[must_use]
    pub const fn fee_protocol_0(&self) -> u8 {
        self.fee_protocol % 16
    }

    /// Protocol fee denominator for token1.
    #[must_use]
    pub const fn fee_protocol_1(&self) -> u8 {
        self.fee_protocol >> 4
    }

    /// Denominator applying to the input token of a swap.
    #[must_use]
    pub const fn fee_protocol_for(&self, zero_for_one: bool) -> u8 {
        if zero_for_one {
            self.fee_protocol_0()
        } else {
            self.fee_protocol_1()
        }
    }
}

/// Protocol fees accrued and not yet collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolFees {
    /// Token0 owed to the protocol.
    pub token0: u128,
    /// Token1 owed to the protocol.
    pub token1: u128,
}

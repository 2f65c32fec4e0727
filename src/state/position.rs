//! Liquidity positions and their fee checkpoints.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::domain::PositionKey;
use crate::error::AmmError;
use crate::math::{add_delta, mul_div_floor, truncate_u128, Q128};

/// Per-position state.
///
/// Fees are not streamed into positions. Instead each position remembers
/// the fee growth inside its range at its last update; the next update
/// credits `(growth_now - growth_then) * liquidity` to `tokens_owed_*`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionInfo {
    /// Liquidity owned by the position.
    pub liquidity: u128,
    /// Token0 fee growth inside the range at the last update (Q128).
    pub fee_growth_inside_0_last_x128: U256,
    /// Token1 fee growth inside the range at the last update (Q128).
    pub fee_growth_inside_1_last_x128: U256,
    /// Token0 owed to the owner: burned principal plus fees.
    pub tokens_owed_0: u128,
    /// Token1 owed to the owner: burned principal plus fees.
    pub tokens_owed_1: u128,
}

impl PositionInfo {
    /// Credits accrued fees, applies `liquidity_delta` and moves the
    /// checkpoint to the supplied fee growth.
    ///
    /// A zero delta is a *poke*: it only settles fees.
    ///
    /// # Errors
    ///
    /// - [`AmmError::NoLiquidityToPoke`] for a poke on an empty position.
    /// - [`AmmError::Underflow`] / [`AmmError::Overflow`] if the delta
    ///   does not fit the current liquidity.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(), AmmError> {
        let liquidity_next = if liquidity_delta == 0 {
            if self.liquidity == 0 {
                return Err(AmmError::NoLiquidityToPoke);
            }
            self.liquidity
        } else {
            add_delta(self.liquidity, liquidity_delta)?
        };

        let liquidity = U256::from(self.liquidity);
        // fee amounts beyond u128 are truncated; owners must collect first
        let owed_0 = truncate_u128(mul_div_floor(
            fee_growth_inside_0_x128.wrapping_sub(self.fee_growth_inside_0_last_x128),
            liquidity,
            Q128,
        )?);
        let owed_1 = truncate_u128(mul_div_floor(
            fee_growth_inside_1_x128.wrapping_sub(self.fee_growth_inside_1_last_x128),
            liquidity,
            Q128,
        )?);

        self.liquidity = liquidity_next;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;
        self.tokens_owed_0 = self.tokens_owed_0.saturating_add(owed_0);
        self.tokens_owed_1 = self.tokens_owed_1.saturating_add(owed_1);
        Ok(())
    }
}

/// All positions of a pool, keyed by owner and range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Positions {
    positions: BTreeMap<PositionKey, PositionInfo>,
}

impl Positions {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a position.
    #[must_use]
    pub fn get(&self, key: &PositionKey) -> Option<&PositionInfo> {
        self.positions.get(key)
    }

    /// Mutable access to an existing position.
    pub fn get_mut(&mut self, key: &PositionKey) -> Option<&mut PositionInfo> {
        self.positions.get_mut(key)
    }

    /// Returns the position, creating an empty record if absent.
    pub fn get_mut_or_default(&mut self, key: PositionKey) -> &mut PositionInfo {
        self.positions.entry(key).or_default()
    }

    /// Puts back a record saved before an aborted change.
    pub(crate) fn restore(&mut self, key: PositionKey, info: Option<PositionInfo>) {
        match info {
            Some(info) => self.positions.insert(key, info),
            None => self.positions.remove(&key),
        };
    }

    /// Number of position records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no position was ever touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates positions in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PositionKey, &PositionInfo)> {
        self.positions.iter()
    }
}

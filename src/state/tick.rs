//! Per-tick records for initialized range boundaries.
//!
//! A tick is *initialized* while at least one position uses it as a
//! bound. Its record tracks the liquidity that enters or leaves the active
//! range when the price crosses it, plus "outside" snapshots of every
//! global accumulator. "Outside" is relative to the current tick: the
//! side of the tick the price is *not* on. Crossing the tick flips each
//! snapshot to its complement against the global value, which lets fee
//! growth inside any range be computed from the two bounding ticks alone.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::error::AmmError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use crate::math::add_delta;

/// State kept for an initialized tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickInfo {
    /// Total liquidity of positions using this tick as either bound.
    pub liquidity_gross: u128,
    /// Liquidity added to the active range when crossed left to right.
    pub liquidity_net: i128,
    /// Token0 fee growth per unit of liquidity on the outside side (Q128).
    pub fee_growth_outside_0_x128: U256,
    /// Token1 fee growth per unit of liquidity on the outside side (Q128).
    pub fee_growth_outside_1_x128: U256,
    /// Tick cumulative on the outside side.
    pub tick_cumulative_outside: i64,
    /// Seconds per unit of liquidity on the outside side (Q128).
    pub seconds_per_liquidity_outside_x128: U256,
    /// Seconds spent on the outside side.
    pub seconds_outside: u32,
    /// `true` once any position references the tick.
    pub initialized: bool,
}

/// Global accumulator values at the moment a tick is touched.
///
/// Bundles the inputs [`Ticks::update`] and [`Ticks::cross`] copy into
/// the outside snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accumulators {
    /// Global token0 fee growth (Q128).
    pub fee_growth_global_0_x128: U256,
    /// Global token1 fee growth (Q128).
    pub fee_growth_global_1_x128: U256,
    /// Oracle seconds-per-liquidity cumulative (Q128).
    pub seconds_per_liquidity_cumulative_x128: U256,
    /// Oracle tick cumulative.
    pub tick_cumulative: i64,
    /// Current block timestamp.
    pub time: u32,
}

/// Sparse map of tick index to [`TickInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks {
    ticks: BTreeMap<i32, TickInfo>,
}

impl Ticks {
    /// Creates an empty tick map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `tick`, if initialized.
    #[must_use]
    pub fn get(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Number of initialized ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Returns `true` if no tick is initialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Iterates initialized ticks in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &TickInfo)> {
        self.ticks.iter().map(|(t, info)| (*t, info))
    }

    /// Applies a liquidity change to one bound of a position.
    ///
    /// On first initialization the outside snapshots are seeded with the
    /// globals iff `tick <= tick_current`: by convention all growth before
    /// a tick is initialized happened below it.
    ///
    /// Returns `true` if the tick flipped between initialized and
    /// uninitialized.
    ///
    /// # Errors
    ///
    /// - [`AmmError::TickLiquidityOverflow`] if gross liquidity would
    ///   exceed `max_liquidity`.
    /// - [`AmmError::Overflow`] / [`AmmError::Underflow`] on gross or net
    ///   liquidity arithmetic.
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        globals: &Accumulators,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool, AmmError> {
        let mut info = self.ticks.get(&tick).cloned().unwrap_or_default();

        let gross_before = info.liquidity_gross;
        let gross_after = add_delta(gross_before, liquidity_delta)?;
        if gross_after > max_liquidity {
            return Err(AmmError::TickLiquidityOverflow);
        }
        let flipped = (gross_after == 0) != (gross_before == 0);

        if gross_before == 0 {
            if tick <= tick_current {
                info.fee_growth_outside_0_x128 = globals.fee_growth_global_0_x128;
                info.fee_growth_outside_1_x128 = globals.fee_growth_global_1_x128;
                info.seconds_per_liquidity_outside_x128 =
                    globals.seconds_per_liquidity_cumulative_x128;
                info.tick_cumulative_outside = globals.tick_cumulative;
                info.seconds_outside = globals.time;
            }
            info.initialized = true;
        }

        info.liquidity_gross = gross_after;
        info.liquidity_net = if upper {
            info.liquidity_net
                .checked_sub(liquidity_delta)
                .ok_or(AmmError::Overflow("tick liquidity_net overflow"))?
        } else {
            info.liquidity_net
                .checked_add(liquidity_delta)
                .ok_or(AmmError::Overflow("tick liquidity_net overflow"))?
        };

        self.ticks.insert(tick, info);
        Ok(flipped)
    }

    /// Transitions `tick` as the price crosses it and returns its
    /// `liquidity_net`.
    pub fn cross(&mut self, tick: i32, globals: &Accumulators) -> i128 {
        let info = self.ticks.entry(tick).or_default();
        info.fee_growth_outside_0_x128 = globals
            .fee_growth_global_0_x128
            .wrapping_sub(info.fee_growth_outside_0_x128);
        info.fee_growth_outside_1_x128 = globals
            .fee_growth_global_1_x128
            .wrapping_sub(info.fee_growth_outside_1_x128);
        info.seconds_per_liquidity_outside_x128 = globals
            .seconds_per_liquidity_cumulative_x128
            .wrapping_sub(info.seconds_per_liquidity_outside_x128);
        info.tick_cumulative_outside = globals
            .tick_cumulative
            .wrapping_sub(info.tick_cumulative_outside);
        info.seconds_outside = globals.time.wrapping_sub(info.seconds_outside);
        tracing::trace!(tick, liquidity_net = info.liquidity_net, "tick crossed");
        info.liquidity_net
    }

    /// Fee growth per unit of liquidity inside `[lower, upper)`.
    ///
    /// All subtraction wraps: only differences of the result over time are
    /// meaningful.
    #[must_use]
    pub fn fee_growth_inside(
        &self,
        lower: i32,
        upper: i32,
        tick_current: i32,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
    ) -> (U256, U256) {
        let lower_info = self.ticks.get(&lower);
        let upper_info = self.ticks.get(&upper);
        let lower_0 = lower_info.map_or(U256::ZERO, |s| s.fee_growth_outside_0_x128);
        let lower_1 = lower_info.map_or(U256::ZERO, |s| s.fee_growth_outside_1_x128);
        let upper_0 = upper_info.map_or(U256::ZERO, |s| s.fee_growth_outside_0_x128);
        let upper_1 = upper_info.map_or(U256::ZERO, |s| s.fee_growth_outside_1_x128);

        let (below_0, below_1) = if tick_current >= lower {
            (lower_0, lower_1)
        } else {
            (
                fee_growth_global_0_x128.wrapping_sub(lower_0),
                fee_growth_global_1_x128.wrapping_sub(lower_1),
            )
        };

        let (above_0, above_1) = if tick_current < upper {
            (upper_0, upper_1)
        } else {
            (
                fee_growth_global_0_x128.wrapping_sub(upper_0),
                fee_growth_global_1_x128.wrapping_sub(upper_1),
            )
        };

        (
            fee_growth_global_0_x128
                .wrapping_sub(below_0)
                .wrapping_sub(above_0),
            fee_growth_global_1_x128
                .wrapping_sub(below_1)
                .wrapping_sub(above_1),
        )
    }

    /// Removes the record for `tick`.
    pub fn clear(&mut self, tick: i32) {
        self.ticks.remove(&tick);
    }

    /// Puts back a record saved before an aborted change.
    pub(crate) fn restore(&mut self, tick: i32, info: Option<TickInfo>) {
        match info {
            Some(info) => self.ticks.insert(tick, info),
            None => self.ticks.remove(&tick),
        };
    }
}

/// Largest gross liquidity a single tick may carry for `tick_spacing`.
///
/// Caps the liquidity so that the sum over every usable tick still fits
/// in a `u128`, keeping the in-range liquidity from overflowing.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] if `tick_spacing <= 0`.
///
/// # Examples
///
/// ```
/// use hydra_clmm::state::max_liquidity_per_tick;
///
/// assert_eq!(
///     max_liquidity_per_tick(60),
///     Ok(11_505_743_598_341_114_571_880_798_222_544_994),
/// );
/// ```
pub fn max_liquidity_per_tick(tick_spacing: i32) -> Result<u128, AmmError> {
    if tick_spacing <= 0 {
        return Err(AmmError::InvalidConfiguration(
            "tick spacing must be positive",
        ));
    }
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing).unsigned_abs() + 1;
    Ok(u128::MAX / u128::from(num_ticks))
}

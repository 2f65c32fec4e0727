//! Ring buffer of price and liquidity observations.
//!
//! Each observation records two running sums as of a timestamp: the tick
//! integrated over time (`tick_cumulative`) and `seconds / liquidity`
//! integrated over time in Q128. Differencing two observations gives the
//! time-weighted average tick and the harmonic-mean liquidity over the
//! interval. At most one observation is written per timestamp.
//!
//! The buffer holds `cardinality_next` slots. Only the first
//! `cardinality` are part of the ring; slots added by [`Oracle::grow`]
//! are pre-touched (timestamp `1`, uninitialized) and join the ring when
//! the write index wraps onto them.

use alloy_primitives::U256;

use crate::error::AmmError;

/// A single oracle data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Timestamp of the observation.
    pub block_timestamp: u32,
    /// Tick integrated over time since the pool was initialized.
    pub tick_cumulative: i64,
    /// `seconds / max(1, liquidity)` integrated over time, Q128.
    pub seconds_per_liquidity_cumulative_x128: U256,
    /// `false` for pre-touched slots never written.
    pub initialized: bool,
}

impl Observation {
    /// Projects `self` forward to `time` assuming `tick` and `liquidity`
    /// held constant since `self.block_timestamp`.
    #[must_use]
    pub fn transform(&self, time: u32, tick: i32, liquidity: u128) -> Self {
        let delta = time.wrapping_sub(self.block_timestamp);
        let per_liquidity = (U256::from(delta) << 128) / U256::from(liquidity.max(1));
        Self {
            block_timestamp: time,
            tick_cumulative: self
                .tick_cumulative
                .wrapping_add(i64::from(tick).wrapping_mul(i64::from(delta))),
            seconds_per_liquidity_cumulative_x128: self
                .seconds_per_liquidity_cumulative_x128
                .wrapping_add(per_liquidity),
            initialized: true,
        }
    }
}

/// Pool state needed to read the oracle at the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveContext {
    /// Current block timestamp.
    pub time: u32,
    /// Current pool tick.
    pub tick: i32,
    /// Current in-range liquidity.
    pub liquidity: u128,
    /// Index of the most recent observation.
    pub index: u16,
    /// Number of populated ring slots.
    pub cardinality: u16,
}

/// Returns `a <= b` for timestamps that are both at most 2^32 seconds
/// before `time`, tolerating one wraparound of the 32-bit clock.
#[must_use]
pub fn lte(time: u32, a: u32, b: u32) -> bool {
    if a <= time && b <= time {
        return a <= b;
    }
    let wrap = 1u64 << 32;
    let a_adjusted = if a > time { u64::from(a) } else { u64::from(a) + wrap };
    let b_adjusted = if b > time { u64::from(b) } else { u64::from(b) + wrap };
    a_adjusted <= b_adjusted
}

/// Average tick over a window, rounded towards negative infinity.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `seconds` is zero.
/// - [`AmmError::Overflow`] if the mean does not fit an `i32`.
///
/// # Examples
///
/// ```
/// use hydra_clmm::state::arithmetic_mean_tick;
///
/// assert_eq!(arithmetic_mean_tick(0, 600, 10), Ok(60));
/// assert_eq!(arithmetic_mean_tick(0, -605, 10), Ok(-61));
/// ```
pub fn arithmetic_mean_tick(
    tick_cumulative_start: i64,
    tick_cumulative_end: i64,
    seconds: u32,
) -> Result<i32, AmmError> {
    if seconds == 0 {
        return Err(AmmError::DivisionByZero);
    }
    let delta = tick_cumulative_end.wrapping_sub(tick_cumulative_start);
    let period = i64::from(seconds);
    let mut mean = delta / period;
    if delta < 0 && delta % period != 0 {
        mean -= 1;
    }
    i32::try_from(mean).map_err(|_| AmmError::Overflow("mean tick does not fit i32"))
}

/// Bounded ring buffer of [`Observation`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Oracle {
    observations: Vec<Observation>,
}

impl Oracle {
    /// Creates an empty buffer; call [`initialize`](Self::initialize) first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observation stored at `index`, including pre-touched slots.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Observation> {
        self.observations.get(usize::from(index))
    }

    /// Number of allocated slots (`cardinality_next`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` before initialization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn at(&self, index: usize) -> Result<&Observation, AmmError> {
        self.observations
            .get(index)
            .ok_or(AmmError::OracleNotInitialized)
    }

    /// Writes the first observation and returns `(cardinality, cardinality_next)`.
    pub fn initialize(&mut self, time: u32) -> (u16, u16) {
        self.observations = vec![Observation {
            block_timestamp: time,
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: U256::ZERO,
            initialized: true,
        }];
        (1, 1)
    }

    /// Records the state as of `time`, returning the new
    /// `(index, cardinality)`.
    ///
    /// `tick` and `liquidity` are the values that held *since* the last
    /// observation. Nothing is written if an observation already exists
    /// for `time`. The ring expands into pre-touched slots only when the
    /// write index is at the current end of the ring.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::OracleNotInitialized`] if `cardinality` is zero
    /// or `index` does not address a stored observation.
    pub fn write(
        &mut self,
        index: u16,
        time: u32,
        tick: i32,
        liquidity: u128,
        cardinality: u16,
        cardinality_next: u16,
    ) -> Result<(u16, u16), AmmError> {
        if cardinality == 0 {
            return Err(AmmError::OracleNotInitialized);
        }
        let last = *self.at(usize::from(index))?;
        if last.block_timestamp == time {
            return Ok((index, cardinality));
        }

        let (index_updated, cardinality_updated) =
            Self::write_target(index, cardinality, cardinality_next)
                .ok_or(AmmError::OracleNotInitialized)?;

        let slot = self
            .observations
            .get_mut(usize::from(index_updated))
            .ok_or(AmmError::OracleNotInitialized)?;
        *slot = last.transform(time, tick, liquidity);
        Ok((index_updated, cardinality_updated))
    }

    /// Slot and cardinality the next [`write`](Self::write) after `index`
    /// uses; `None` before initialization.
    pub(crate) fn write_target(
        index: u16,
        cardinality: u16,
        cardinality_next: u16,
    ) -> Option<(u16, u16)> {
        let last = cardinality.checked_sub(1)?;
        let cardinality_updated = if cardinality_next > cardinality && index == last {
            cardinality_next
        } else {
            cardinality
        };
        #[allow(clippy::cast_possible_truncation)]
        let index_updated = ((u32::from(index) + 1) % u32::from(cardinality_updated)) as u16;
        Some((index_updated, cardinality_updated))
    }

    /// Puts back an observation saved before an aborted write.
    pub(crate) fn restore(&mut self, index: u16, observation: Observation) {
        if let Some(slot) = self.observations.get_mut(usize::from(index)) {
            *slot = observation;
        }
    }

    /// Drops slots allocated past `len` by an aborted [`grow`](Self::grow).
    pub(crate) fn truncate(&mut self, len: usize) {
        self.observations.truncate(len);
    }

    /// Allocates slots up to `next` and returns the new `cardinality_next`.
    ///
    /// New slots are pre-touched with timestamp `1` and stay
    /// uninitialized until the ring reaches them.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::OracleNotInitialized`] if `current` is zero.
    pub fn grow(&mut self, current: u16, next: u16) -> Result<u16, AmmError> {
        if current == 0 {
            return Err(AmmError::OracleNotInitialized);
        }
        if next <= current {
            return Ok(current);
        }
        let next_len = usize::from(next);
        if self.observations.len() < next_len {
            self.observations.resize(
                next_len,
                Observation {
                    block_timestamp: 1,
                    ..Observation::default()
                },
            );
        }
        Ok(next)
    }

    /// Finds the stored observations bracketing `target`.
    ///
    /// The caller guarantees `target` lies between the oldest and the
    /// newest observation.
    fn binary_search(
        &self,
        time: u32,
        target: u32,
        index: u16,
        cardinality: u16,
    ) -> Result<(Observation, Observation), AmmError> {
        let cardinality = usize::from(cardinality);
        // oldest observation
        let mut l = (usize::from(index) + 1) % cardinality;
        // newest observation
        let mut r = l + cardinality - 1;

        loop {
            if l > r {
                return Err(AmmError::ObservationTooOld);
            }
            let i = (l + r) / 2;
            let before_or_at = *self.at(i % cardinality)?;

            // an unwritten slot means the ring has not wrapped yet; search right
            if !before_or_at.initialized {
                l = i + 1;
                continue;
            }

            let at_or_after = *self.at((i + 1) % cardinality)?;
            let target_at_or_after = lte(time, before_or_at.block_timestamp, target);

            if target_at_or_after && lte(time, target, at_or_after.block_timestamp) {
                return Ok((before_or_at, at_or_after));
            }

            if target_at_or_after {
                l = i + 1;
            } else {
                r = i.checked_sub(1).ok_or(AmmError::ObservationTooOld)?;
            }
        }
    }

    /// Returns `(before_or_at, at_or_after)` for `target`, projecting the
    /// newest observation forward when `target` is more recent than it.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ObservationTooOld`] if `target` predates the
    /// oldest observation.
    pub fn surrounding_observations(
        &self,
        ctx: &ObserveContext,
        target: u32,
    ) -> Result<(Observation, Observation), AmmError> {
        if ctx.cardinality == 0 {
            return Err(AmmError::OracleNotInitialized);
        }
        let newest = *self.at(usize::from(ctx.index))?;

        if lte(ctx.time, newest.block_timestamp, target) {
            if newest.block_timestamp == target {
                return Ok((newest, Observation::default()));
            }
            return Ok((newest, newest.transform(target, ctx.tick, ctx.liquidity)));
        }

        let mut oldest = *self.at((usize::from(ctx.index) + 1) % usize::from(ctx.cardinality))?;
        if !oldest.initialized {
            oldest = *self.at(0)?;
        }

        if !lte(ctx.time, oldest.block_timestamp, target) {
            return Err(AmmError::ObservationTooOld);
        }

        self.binary_search(ctx.time, target, ctx.index, ctx.cardinality)
    }

    /// Cumulative values as of `seconds_ago` before `ctx.time`.
    ///
    /// Between two stored observations the values are interpolated
    /// linearly.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ObservationTooOld`] if the target predates the
    /// oldest observation.
    pub fn observe_single(
        &self,
        ctx: &ObserveContext,
        seconds_ago: u32,
    ) -> Result<(i64, U256), AmmError> {
        if seconds_ago == 0 {
            let mut last = *self.at(usize::from(ctx.index))?;
            if last.block_timestamp != ctx.time {
                last = last.transform(ctx.time, ctx.tick, ctx.liquidity);
            }
            return Ok((
                last.tick_cumulative,
                last.seconds_per_liquidity_cumulative_x128,
            ));
        }

        let target = ctx.time.wrapping_sub(seconds_ago);
        let (before_or_at, at_or_after) = self.surrounding_observations(ctx, target)?;

        if target == before_or_at.block_timestamp {
            return Ok((
                before_or_at.tick_cumulative,
                before_or_at.seconds_per_liquidity_cumulative_x128,
            ));
        }
        if target == at_or_after.block_timestamp {
            return Ok((
                at_or_after.tick_cumulative,
                at_or_after.seconds_per_liquidity_cumulative_x128,
            ));
        }

        let observation_delta = at_or_after
            .block_timestamp
            .wrapping_sub(before_or_at.block_timestamp);
        let target_delta = target.wrapping_sub(before_or_at.block_timestamp);

        let tick_slope = at_or_after
            .tick_cumulative
            .wrapping_sub(before_or_at.tick_cumulative)
            / i64::from(observation_delta);
        let tick_cumulative = before_or_at
            .tick_cumulative
            .wrapping_add(tick_slope.wrapping_mul(i64::from(target_delta)));

        let spl_delta = at_or_after
            .seconds_per_liquidity_cumulative_x128
            .wrapping_sub(before_or_at.seconds_per_liquidity_cumulative_x128);
        let seconds_per_liquidity = before_or_at
            .seconds_per_liquidity_cumulative_x128
            .wrapping_add(
                spl_delta.wrapping_mul(U256::from(target_delta)) / U256::from(observation_delta),
            );

        Ok((tick_cumulative, seconds_per_liquidity))
    }

    /// [`observe_single`](Self::observe_single) for each entry of
    /// `seconds_agos`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::OracleNotInitialized`] if `ctx.cardinality` is zero.
    /// - [`AmmError::ObservationTooOld`] if any target is too old.
    pub fn observe(
        &self,
        ctx: &ObserveContext,
        seconds_agos: &[u32],
    ) -> Result<(Vec<i64>, Vec<U256>), AmmError> {
        if ctx.cardinality == 0 {
            return Err(AmmError::OracleNotInitialized);
        }
        let mut tick_cumulatives = Vec::with_capacity(seconds_agos.len());
        let mut seconds_per_liquidity = Vec::with_capacity(seconds_agos.len());
        for &seconds_ago in seconds_agos {
            let (tc, spl) = self.observe_single(ctx, seconds_ago)?;
            tick_cumulatives.push(tc);
            seconds_per_liquidity.push(spl);
        }
        Ok((tick_cumulatives, seconds_per_liquidity))
    }
}

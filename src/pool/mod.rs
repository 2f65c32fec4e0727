//! The concentrated-liquidity pool.
//!
//! [`Pool`] owns all mutable state of one pool: the [`Slot`], the global
//! fee accumulators, the tick index, the position ledger and the oracle.
//! Token balances live in the [`Host`]; the pool only records what it is
//! owed and what it owes.
//!
//! # Operations
//!
//! | Operation | Kind | Module |
//! |-----------|------|--------|
//! | [`initialize`](Pool::initialize) | sets the first price, runs unlocked | here |
//! | [`mint`](Pool::mint), [`burn`](Pool::burn), [`collect`](Pool::collect) | liquidity | `modify_position` |
//! | [`swap`](Pool::swap) | trading | `swap` |
//! | [`flash`](Pool::flash) | flash loan | `flash` |
//! | [`set_fee_protocol`](Pool::set_fee_protocol), [`collect_protocol`](Pool::collect_protocol), [`increase_observation_cardinality_next`](Pool::increase_observation_cardinality_next) | administration | `admin` |
//!
//! Every state-mutating operation other than `initialize` runs under the
//! pool lock and is atomic: if it fails, both the pool and the host are
//! restored to their state before the call. The lock itself is internal:
//!
//! ```compile_fail
//! use hydra_clmm::pool::lock::LockGuard;
//! ```

mod admin;
mod flash;
mod journal;
mod lock;
mod modify_position;
mod swap;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

use alloy_primitives::U256;

use crate::config::PoolConfig;
use crate::domain::{Address, FeeTier, PositionKey, TickRange, TokenPair};
use crate::error::AmmError;
use crate::math::tick_at_sqrt_price;
use crate::state::{
    max_liquidity_per_tick, Observation, ObserveContext, Oracle, PositionInfo, Positions,
    ProtocolFees, Slot, TickBitmap, TickInfo, Ticks,
};
use crate::traits::{FromConfig, Host};

use self::journal::Journal;
use self::lock::LockGuard;

/// Parameters fixed at pool creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Immutables {
    /// The pool's own account in the host ledger.
    pub address: Address,
    /// The two assets, ordered.
    pub token_pair: TokenPair,
    /// Swap fee.
    pub fee: FeeTier,
    /// Distance between initializable ticks.
    pub tick_spacing: i32,
    /// Cap on the gross liquidity referencing a single tick.
    pub max_liquidity_per_tick: u128,
}

impl Immutables {
    /// Token0 of the pair.
    #[must_use]
    pub const fn token0(&self) -> Address {
        self.token_pair.token0()
    }

    /// Token1 of the pair.
    #[must_use]
    pub const fn token1(&self) -> Address {
        self.token_pair.token1()
    }
}

/// A concentrated-liquidity pool.
///
/// # Examples
///
/// ```
/// use hydra_clmm::config::PoolConfig;
/// use hydra_clmm::domain::{Address, FeeTier, TokenPair};
/// use hydra_clmm::math::Q96;
/// use hydra_clmm::memory::MemoryHost;
/// use hydra_clmm::pool::Pool;
///
/// let pair = TokenPair::new(Address::repeat_byte(1), Address::repeat_byte(2)).expect("distinct");
/// let config = PoolConfig::new(Address::repeat_byte(0xee), pair, FeeTier::MEDIUM, 60)
///     .expect("valid config");
/// let mut pool = Pool::new(&config).expect("valid pool");
/// let host = MemoryHost::new(1_000);
///
/// pool.initialize(&host, Q96).expect("first initialization");
/// assert_eq!(pool.slot().tick, 0);
/// assert!(pool.slot().unlocked);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pool {
    immutables: Immutables,
    slot: Slot,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
    protocol_fees: ProtocolFees,
    liquidity: u128,
    ticks: Ticks,
    tick_bitmap: TickBitmap,
    positions: Positions,
    oracle: Oracle,
    #[cfg_attr(feature = "serde", serde(skip))]
    journal: Journal,
}

impl Pool {
    /// Creates an uninitialized pool.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`PoolConfig::validate`].
    pub fn new(config: &PoolConfig) -> Result<Self, AmmError> {
        config.validate()?;
        let immutables = Immutables {
            address: config.address(),
            token_pair: *config.token_pair(),
            fee: config.fee(),
            tick_spacing: config.tick_spacing(),
            max_liquidity_per_tick: max_liquidity_per_tick(config.tick_spacing())?,
        };
        Ok(Self {
            immutables,
            slot: Slot::default(),
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
            protocol_fees: ProtocolFees::default(),
            liquidity: 0,
            ticks: Ticks::new(),
            tick_bitmap: TickBitmap::new(),
            positions: Positions::new(),
            oracle: Oracle::new(),
            journal: Journal::default(),
        })
    }

    /// Sets the first price and opens the pool.
    ///
    /// Runs without the lock: an uninitialized pool has nothing to
    /// protect.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyInitialized`] if the pool has a price.
    /// - [`AmmError::InvalidPrice`] if `sqrt_price_x96` is outside
    ///   `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
    pub fn initialize<H: Host>(&mut self, host: &H, sqrt_price_x96: U256) -> Result<(), AmmError> {
        if !self.slot.sqrt_price_x96.is_zero() {
            tracing::debug!(pool = %self.immutables.address, "initialize rejected: already initialized");
            return Err(AmmError::AlreadyInitialized);
        }
        let tick = tick_at_sqrt_price(sqrt_price_x96)?;
        let (cardinality, cardinality_next) = self.oracle.initialize(host.block_timestamp());

        self.slot = Slot {
            sqrt_price_x96,
            tick,
            observation_index: 0,
            observation_cardinality: cardinality,
            observation_cardinality_next: cardinality_next,
            fee_protocol: 0,
            unlocked: true,
        };
        tracing::info!(
            pool = %self.immutables.address,
            %sqrt_price_x96,
            tick,
            "Initialize"
        );
        Ok(())
    }

    /// Runs `op` under the lock, rolling back the pool and the host if it
    /// fails.
    ///
    /// The lock is checked before anything else, so reentrant calls fail
    /// with [`AmmError::Locked`] without touching any state. Rollback
    /// replays the pool journal and reverts the host checkpoint; neither is
    /// copied up front.
    pub(crate) fn locked<H, T, F>(
        &mut self,
        host: &mut H,
        operation: &'static str,
        op: F,
    ) -> Result<T, AmmError>
    where
        H: Host,
        F: FnOnce(&mut Self, &mut H) -> Result<T, AmmError>,
    {
        self.ensure_unlocked().inspect_err(|err| {
            tracing::debug!(pool = %self.immutables.address, operation, %err, "operation rejected");
        })?;
        let checkpoint = host.checkpoint();
        self.begin_journal();

        let result = LockGuard::acquire(self).and_then(|mut guard| op(&mut *guard, host));

        match &result {
            Ok(_) => {
                self.commit_journal();
                host.commit(checkpoint);
            }
            Err(err) => {
                tracing::debug!(pool = %self.immutables.address, operation, %err, "operation reverted");
                self.revert_journal();
                host.revert(checkpoint);
            }
        }
        result
    }

    pub(crate) fn ensure_unlocked(&self) -> Result<(), AmmError> {
        if self.slot.unlocked {
            Ok(())
        } else if self.slot.sqrt_price_x96.is_zero() {
            Err(AmmError::NotInitialized)
        } else {
            Err(AmmError::Locked)
        }
    }

    fn observe_context(&self, time: u32) -> ObserveContext {
        ObserveContext {
            time,
            tick: self.slot.tick,
            liquidity: self.liquidity,
            index: self.slot.observation_index,
            cardinality: self.slot.observation_cardinality,
        }
    }

    // -- Queries ------------------------------------------------------------

    /// Parameters fixed at creation.
    #[must_use]
    pub const fn immutables(&self) -> &Immutables {
        &self.immutables
    }

    /// Current price, tick, oracle bookkeeping and lock state.
    #[must_use]
    pub const fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Returns `true` once [`initialize`](Self::initialize) succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.slot.sqrt_price_x96.is_zero()
    }

    /// Token0 fees earned per unit of liquidity over the pool's life (Q128).
    #[must_use]
    pub const fn fee_growth_global_0_x128(&self) -> U256 {
        self.fee_growth_global_0_x128
    }

    /// Token1 fees earned per unit of liquidity over the pool's life (Q128).
    #[must_use]
    pub const fn fee_growth_global_1_x128(&self) -> U256 {
        self.fee_growth_global_1_x128
    }

    /// Protocol fees accrued and not yet collected.
    #[must_use]
    pub const fn protocol_fees(&self) -> ProtocolFees {
        self.protocol_fees
    }

    /// Liquidity in range at the current tick.
    #[must_use]
    pub const fn liquidity(&self) -> u128 {
        self.liquidity
    }

    /// Record of an initialized tick.
    #[must_use]
    pub fn tick(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(tick)
    }

    /// All tick records.
    #[must_use]
    pub const fn ticks(&self) -> &Ticks {
        &self.ticks
    }

    /// Raw tick-bitmap word.
    #[must_use]
    pub fn tick_bitmap_word(&self, word_pos: i16) -> U256 {
        self.tick_bitmap.word(word_pos)
    }

    /// The tick bitmap.
    #[must_use]
    pub const fn tick_bitmap(&self) -> &TickBitmap {
        &self.tick_bitmap
    }

    /// Position record, if it was ever touched.
    #[must_use]
    pub fn position(&self, key: &PositionKey) -> Option<&PositionInfo> {
        self.positions.get(key)
    }

    /// All position records.
    #[must_use]
    pub const fn positions(&self) -> &Positions {
        &self.positions
    }

    /// Raw oracle slot, including pre-touched uninitialized ones.
    #[must_use]
    pub fn observation(&self, index: u16) -> Option<&Observation> {
        self.oracle.get(index)
    }

    /// Pool balance of token0 in the host ledger.
    pub fn balance0<H: Host>(&self, host: &H) -> U256 {
        host.balance_of(self.immutables.token0(), self.immutables.address)
    }

    /// Pool balance of token1 in the host ledger.
    pub fn balance1<H: Host>(&self, host: &H) -> U256 {
        host.balance_of(self.immutables.token1(), self.immutables.address)
    }

    /// Tick and seconds-per-liquidity cumulatives as of each
    /// `seconds_ago` before the current block time.
    ///
    /// The difference of two tick cumulatives divided by the elapsed time
    /// is the time-weighted average tick; see
    /// [`arithmetic_mean_tick`](crate::state::arithmetic_mean_tick).
    ///
    /// # Errors
    ///
    /// - [`AmmError::OracleNotInitialized`] before initialization.
    /// - [`AmmError::ObservationTooOld`] if any target predates the oldest
    ///   observation.
    pub fn observe<H: Host>(
        &self,
        host: &H,
        seconds_agos: &[u32],
    ) -> Result<(Vec<i64>, Vec<U256>), AmmError> {
        self.oracle
            .observe(&self.observe_context(host.block_timestamp()), seconds_agos)
    }

    /// Tick cumulative, seconds-per-liquidity and seconds spent inside
    /// `range`.
    ///
    /// Only differences between two snapshots taken while a position over
    /// `range` existed are meaningful.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidTick`] if either bound is not initialized.
    /// - Oracle errors when the current tick is inside the range.
    pub fn snapshot_cumulatives_inside<H: Host>(
        &self,
        host: &H,
        range: TickRange,
    ) -> Result<(i64, U256, u32), AmmError> {
        let lower = self
            .ticks
            .get(range.lower())
            .filter(|info| info.initialized)
            .ok_or(AmmError::InvalidTick("lower tick is not initialized"))?;
        let upper = self
            .ticks
            .get(range.upper())
            .filter(|info| info.initialized)
            .ok_or(AmmError::InvalidTick("upper tick is not initialized"))?;

        let tick = self.slot.tick;
        if tick < range.lower() {
            Ok((
                lower
                    .tick_cumulative_outside
                    .wrapping_sub(upper.tick_cumulative_outside),
                lower
                    .seconds_per_liquidity_outside_x128
                    .wrapping_sub(upper.seconds_per_liquidity_outside_x128),
                lower.seconds_outside.wrapping_sub(upper.seconds_outside),
            ))
        } else if tick < range.upper() {
            let time = host.block_timestamp();
            let (tick_cumulative, seconds_per_liquidity) =
                self.oracle.observe_single(&self.observe_context(time), 0)?;
            Ok((
                tick_cumulative
                    .wrapping_sub(lower.tick_cumulative_outside)
                    .wrapping_sub(upper.tick_cumulative_outside),
                seconds_per_liquidity
                    .wrapping_sub(lower.seconds_per_liquidity_outside_x128)
                    .wrapping_sub(upper.seconds_per_liquidity_outside_x128),
                time.wrapping_sub(lower.seconds_outside)
                    .wrapping_sub(upper.seconds_outside),
            ))
        } else {
            Ok((
                upper
                    .tick_cumulative_outside
                    .wrapping_sub(lower.tick_cumulative_outside),
                upper
                    .seconds_per_liquidity_outside_x128
                    .wrapping_sub(lower.seconds_per_liquidity_outside_x128),
                upper.seconds_outside.wrapping_sub(lower.seconds_outside),
            ))
        }
    }
}

impl FromConfig<PoolConfig> for Pool {
    fn from_config(config: &PoolConfig) -> Result<Self, AmmError> {
        Self::new(config)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::math::{sqrt_price_at_tick, Q96};
    use crate::memory::MemoryHost;

    pub(crate) const POOL: Address = Address::repeat_byte(0xee);
    pub(crate) const TOKEN0: Address = Address::repeat_byte(1);
    pub(crate) const TOKEN1: Address = Address::repeat_byte(2);

    pub(crate) fn config(fee: FeeTier, spacing: i32) -> PoolConfig {
        let Ok(pair) = TokenPair::new(TOKEN0, TOKEN1) else {
            panic!("expected Ok");
        };
        let Ok(config) = PoolConfig::new(POOL, pair, fee, spacing) else {
            panic!("expected Ok");
        };
        config
    }

    pub(crate) fn initialized_pool(host: &MemoryHost, sqrt_price_x96: U256) -> Pool {
        let Ok(mut pool) = Pool::new(&config(FeeTier::MEDIUM, 60)) else {
            panic!("expected Ok");
        };
        let Ok(()) = pool.initialize(host, sqrt_price_x96) else {
            panic!("expected Ok");
        };
        pool
    }

    pub(crate) fn range(lower: i32, upper: i32) -> TickRange {
        let Ok(range) = TickRange::new(lower, upper) else {
            panic!("expected Ok");
        };
        range
    }

    #[test]
    fn new_pool_is_uninitialized_and_locked() {
        let Ok(pool) = Pool::new(&config(FeeTier::MEDIUM, 60)) else {
            panic!("expected Ok");
        };
        assert!(!pool.is_initialized());
        assert!(!pool.slot().unlocked);
        assert_eq!(pool.ensure_unlocked(), Err(AmmError::NotInitialized));
        assert_eq!(
            pool.immutables().max_liquidity_per_tick,
            11_505_743_598_341_114_571_880_798_222_544_994
        );
    }

    #[test]
    fn from_config_matches_new() {
        let cfg = config(FeeTier::LOW, 10);
        assert_eq!(Pool::from_config(&cfg), Pool::new(&cfg));
    }

    #[test]
    fn initialize_sets_price_tick_and_oracle() {
        let host = MemoryHost::new(77);
        let Ok(price) = sqrt_price_at_tick(-120) else {
            panic!("expected Ok");
        };
        let pool = initialized_pool(&host, price);
        assert_eq!(pool.slot().tick, -120);
        assert_eq!(pool.slot().observation_cardinality, 1);
        assert_eq!(pool.slot().observation_cardinality_next, 1);
        let Some(obs) = pool.observation(0) else {
            panic!("expected observation");
        };
        assert_eq!(obs.block_timestamp, 77);
        assert!(obs.initialized);
    }

    #[test]
    fn initialize_twice_fails() {
        let host = MemoryHost::new(0);
        let mut pool = initialized_pool(&host, Q96);
        assert_eq!(pool.initialize(&host, Q96), Err(AmmError::AlreadyInitialized));
    }

    #[test]
    fn initialize_rejects_out_of_range_price() {
        let host = MemoryHost::new(0);
        let Ok(mut pool) = Pool::new(&config(FeeTier::MEDIUM, 60)) else {
            panic!("expected Ok");
        };
        let Err(AmmError::InvalidPrice(_)) = pool.initialize(&host, U256::from(1u8)) else {
            panic!("expected InvalidPrice");
        };
        assert!(!pool.is_initialized());
    }

    #[test]
    fn observe_before_initialize_fails() {
        let host = MemoryHost::new(0);
        let Ok(pool) = Pool::new(&config(FeeTier::MEDIUM, 60)) else {
            panic!("expected Ok");
        };
        assert_eq!(pool.observe(&host, &[0]), Err(AmmError::OracleNotInitialized));
    }

    #[test]
    fn locked_rolls_back_on_error() {
        let mut host = MemoryHost::new(0);
        host.mint(TOKEN0, POOL, U256::from(10u8));
        let mut pool = initialized_pool(&host, Q96);
        let before = pool.clone();

        let result: Result<(), AmmError> = pool.locked(&mut host, "test", |pool, host| {
            pool.liquidity = 99;
            host.mint(TOKEN0, POOL, U256::from(5u8));
            assert!(!pool.slot.unlocked);
            Err(AmmError::TransferFailed)
        });
        assert_eq!(result, Err(AmmError::TransferFailed));
        assert_eq!(pool, before);
        assert_eq!(pool.balance0(&host), U256::from(10u8));
    }

    #[test]
    fn locked_releases_on_success() {
        let mut host = MemoryHost::new(0);
        let mut pool = initialized_pool(&host, Q96);
        let result = pool.locked(&mut host, "test", |pool, _| {
            pool.liquidity = 5;
            Ok(7u8)
        });
        assert_eq!(result, Ok(7));
        assert!(pool.slot().unlocked);
        assert_eq!(pool.liquidity(), 5);
    }

    #[test]
    fn snapshot_requires_initialized_ticks() {
        let host = MemoryHost::new(0);
        let pool = initialized_pool(&host, Q96);
        let Err(AmmError::InvalidTick(_)) = pool.snapshot_cumulatives_inside(&host, range(-60, 60))
        else {
            panic!("expected InvalidTick");
        };
    }
}

//! Owner-controlled registry of fee tiers and deployed pools.

use std::collections::BTreeMap;

use crate::config::{PoolConfig, MAX_TICK_SPACING};
use crate::domain::{Address, FeeTier, FEE_DENOMINATOR};
use crate::error::AmmError;
use crate::pool::Pool;
use crate::traits::{FromConfig, OwnerAuthority};

/// Creates pools and remembers which pair/fee combinations exist.
///
/// The factory owns two pieces of governance state: the owner address,
/// which is the authority consulted by [`Pool::set_fee_protocol`] and
/// [`Pool::collect_protocol`], and the table of enabled fee tiers with
/// the tick spacing each one implies. Tiers can be added but never
/// removed or re-priced.
///
/// # Example
///
/// ```rust
/// use hydra_clmm::config::PoolConfig;
/// use hydra_clmm::domain::{Address, FeeTier, TokenPair};
/// use hydra_clmm::factory::PoolFactory;
///
/// let owner = Address::repeat_byte(0xaa);
/// let mut factory = PoolFactory::new(owner);
/// assert_eq!(factory.fee_amount_tick_spacing(FeeTier::MEDIUM), Some(60));
///
/// let pair = TokenPair::new(Address::repeat_byte(2), Address::repeat_byte(1)).expect("distinct");
/// let config = PoolConfig::new(Address::repeat_byte(0xee), pair, FeeTier::MEDIUM, 60).expect("valid");
/// let pool = factory.create_pool(&config).expect("created");
///
/// assert!(!pool.is_initialized());
/// assert_eq!(
///     factory.get_pool(Address::repeat_byte(1), Address::repeat_byte(2), FeeTier::MEDIUM),
///     Some(Address::repeat_byte(0xee))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolFactory {
    owner: Address,
    fee_amount_tick_spacing: BTreeMap<FeeTier, i32>,
    pools: BTreeMap<(Address, Address, FeeTier), Address>,
}

impl PoolFactory {
    /// Creates a factory owned by `owner` with the four standard tiers
    /// enabled (100/1, 500/10, 3000/60, 10000/200).
    #[must_use]
    pub fn new(owner: Address) -> Self {
        let fee_amount_tick_spacing = [FeeTier::LOWEST, FeeTier::LOW, FeeTier::MEDIUM, FeeTier::HIGH]
            .into_iter()
            .filter_map(|fee| fee.default_tick_spacing().map(|spacing| (fee, spacing)))
            .collect();
        Self {
            owner,
            fee_amount_tick_spacing,
            pools: BTreeMap::new(),
        }
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Hands ownership to `new_owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Unauthorized`] unless `caller` is the owner.
    pub fn set_owner(&mut self, caller: Address, new_owner: Address) -> Result<(), AmmError> {
        self.ensure_owner(caller)?;
        tracing::info!(old = %self.owner, new = %new_owner, "OwnerChanged");
        self.owner = new_owner;
        Ok(())
    }

    /// Enables a new fee tier with its tick spacing.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless `caller` is the owner.
    /// - [`AmmError::InvalidFee`] if the tier is already enabled or is
    ///   not below 100%.
    /// - [`AmmError::InvalidConfiguration`] if `tick_spacing` is not in
    ///   `1..16384`.
    pub fn enable_fee_amount(
        &mut self,
        caller: Address,
        fee: FeeTier,
        tick_spacing: i32,
    ) -> Result<(), AmmError> {
        self.ensure_owner(caller)?;
        if fee.pips() >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee("fee must be below 1_000_000 pips"));
        }
        if tick_spacing <= 0 || tick_spacing >= MAX_TICK_SPACING {
            return Err(AmmError::InvalidConfiguration(
                "tick spacing must be between 1 and 16383",
            ));
        }
        if self.fee_amount_tick_spacing.contains_key(&fee) {
            return Err(AmmError::InvalidFee("fee tier already enabled"));
        }
        self.fee_amount_tick_spacing.insert(fee, tick_spacing);
        tracing::info!(fee = fee.pips(), tick_spacing, "FeeAmountEnabled");
        Ok(())
    }

    /// Tick spacing of an enabled tier, or `None`.
    #[must_use]
    pub fn fee_amount_tick_spacing(&self, fee: FeeTier) -> Option<i32> {
        self.fee_amount_tick_spacing.get(&fee).copied()
    }

    /// Address of the pool for a token pair (in either order) and fee tier.
    #[must_use]
    pub fn get_pool(&self, token_a: Address, token_b: Address, fee: FeeTier) -> Option<Address> {
        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        self.pools.get(&(token0, token1, fee)).copied()
    }

    /// Number of pools created.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Creates and registers an uninitialized pool.
    ///
    /// The configuration's tick spacing must equal the spacing enabled for
    /// its fee tier.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidFee`] if the fee tier is not enabled.
    /// - [`AmmError::InvalidConfiguration`] if the tick spacing does not
    ///   match the tier or the configuration is otherwise invalid.
    /// - [`AmmError::PoolAlreadyExists`] if the pair and tier already have
    ///   a pool.
    pub fn create_pool(&mut self, config: &PoolConfig) -> Result<Pool, AmmError> {
        config.validate()?;
        let Some(spacing) = self.fee_amount_tick_spacing(config.fee()) else {
            return Err(AmmError::InvalidFee("fee tier not enabled"));
        };
        if spacing != config.tick_spacing() {
            return Err(AmmError::InvalidConfiguration(
                "tick spacing does not match the fee tier",
            ));
        }
        let pair = config.token_pair();
        let key = (pair.token0(), pair.token1(), config.fee());
        if self.pools.contains_key(&key) {
            return Err(AmmError::PoolAlreadyExists);
        }

        let pool = Pool::from_config(config)?;
        self.pools.insert(key, config.address());
        tracing::info!(
            token0 = %pair.token0(),
            token1 = %pair.token1(),
            fee = config.fee().pips(),
            tick_spacing = spacing,
            pool = %config.address(),
            "PoolCreated"
        );
        Ok(pool)
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), AmmError> {
        if caller == self.owner {
            Ok(())
        } else {
            tracing::debug!(%caller, owner = %self.owner, "factory call rejected");
            Err(AmmError::Unauthorized)
        }
    }
}

impl OwnerAuthority for PoolFactory {
    fn owner(&self) -> Address {
        self.owner
    }
}

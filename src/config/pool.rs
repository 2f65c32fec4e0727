//! Configuration for a concentrated-liquidity pool.

use crate::domain::{Address, FeeTier, TokenPair, FEE_DENOMINATOR};
use crate::error::AmmError;

/// Largest accepted tick spacing (exclusive).
pub const MAX_TICK_SPACING: i32 = 16_384;

/// Immutable parameters of a concentrated-liquidity pool.
///
/// # Validation
///
/// - The fee must be below 100% (`1_000_000` pips).
/// - `tick_spacing` must lie in `1..16_384`. Larger spacings would let a
///   single tick-bitmap word cover the whole price range.
/// - The token pair is validated at [`TokenPair`] construction time.
///
/// # Examples
///
/// ```
/// use hydra_clmm::config::PoolConfig;
/// use hydra_clmm::domain::{Address, FeeTier, TokenPair};
///
/// let pair = TokenPair::new(Address::repeat_byte(1), Address::repeat_byte(2)).expect("distinct");
/// let config = PoolConfig::new(Address::repeat_byte(0xee), pair, FeeTier::MEDIUM, 60)
///     .expect("valid config");
/// assert_eq!(config.tick_spacing(), 60);
/// assert!(PoolConfig::new(Address::repeat_byte(0xee), pair, FeeTier::MEDIUM, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    address: Address,
    token_pair: TokenPair,
    fee: FeeTier,
    tick_spacing: i32,
}

impl PoolConfig {
    /// Creates a validated `PoolConfig`.
    ///
    /// # Arguments
    ///
    /// - `address`: the pool's own account in the host ledger.
    /// - `tick_spacing`: granularity of initializable ticks (standard
    ///   values: 1, 10, 60, 200).
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(
        address: Address,
        token_pair: TokenPair,
        fee: FeeTier,
        tick_spacing: i32,
    ) -> Result<Self, AmmError> {
        let config = Self {
            address,
            token_pair,
            fee,
            tick_spacing,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidFee`] if the fee is not below `1_000_000` pips.
    /// - [`AmmError::InvalidConfiguration`] if `tick_spacing` is outside
    ///   `1..16_384`.
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.fee.pips() >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee("fee must be below 1_000_000 pips"));
        }
        if self.tick_spacing <= 0 {
            return Err(AmmError::InvalidConfiguration(
                "tick spacing must be greater than zero",
            ));
        }
        if self.tick_spacing >= MAX_TICK_SPACING {
            return Err(AmmError::InvalidConfiguration(
                "tick spacing must be below 16384",
            ));
        }
        Ok(())
    }

    /// Returns the pool address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the token pair.
    #[must_use]
    pub const fn token_pair(&self) -> &TokenPair {
        &self.token_pair
    }

    /// Returns the fee tier.
    #[must_use]
    pub const fn fee(&self) -> FeeTier {
        self.fee
    }

    /// Returns the tick spacing.
    #[must_use]
    pub const fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }
}

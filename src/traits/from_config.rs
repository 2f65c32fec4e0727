//! Construction of a pool from its declarative configuration.
//!
//! [`FromConfig`] is the seam between [`PoolConfig`](crate::config::PoolConfig)
//! and [`Pool`](crate::pool::Pool). The [`PoolFactory`](crate::factory::PoolFactory)
//! validates its own fee-tier table and then delegates here:
//!
//! ```text
//! PoolFactory::create_pool(&config) => Pool::from_config(&config)
//! ```
//!
//! # Validation Contract
//!
//! Implementations **must** validate the configuration during
//! construction. A successfully constructed pool has valid immutables and
//! is uninitialized: it has no price until `initialize` is called.

use crate::error::AmmError;

/// Builds a value from a configuration struct, validating it first.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] (or a more specific
/// variant) if the configuration is invalid.
pub trait FromConfig<C> {
    /// Creates a new instance from `config`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if the tick spacing is out of
    ///   range.
    /// - [`AmmError::InvalidFee`] if the fee is not below 100%.
    fn from_config(config: &C) -> Result<Self, AmmError>
    where
        Self: Sized;
}

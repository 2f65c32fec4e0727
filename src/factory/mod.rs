//! Pool creation and fee-tier governance.
//!
//! [`PoolFactory`] holds the owner address and the table of enabled fee
//! tiers, validates a [`PoolConfig`] against that table and hands back an
//! uninitialized [`Pool`]. The factory doubles as the
//! [`OwnerAuthority`] consulted by the pool's administrative operations.
//!
//! [`PoolConfig`]: crate::config::PoolConfig
//! [`Pool`]: crate::pool::Pool
//! [`OwnerAuthority`]: crate::traits::OwnerAuthority

mod pool_factory;

pub use pool_factory::PoolFactory;

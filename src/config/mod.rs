//! Declarative pool parameters.
//!
//! [`PoolConfig`] carries everything a pool fixes at creation: its
//! address, token pair, fee and tick spacing. It is validated on
//! construction and consumed by [`PoolFactory`](crate::factory::PoolFactory)
//! and [`FromConfig`](crate::traits::FromConfig).

mod pool;

pub use pool::{PoolConfig, MAX_TICK_SPACING};

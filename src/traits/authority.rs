//! Access control for administrative pool operations.

use crate::domain::Address;

/// Source of truth for who may administer a pool.
///
/// Implemented by [`PoolFactory`](crate::factory::PoolFactory); the pool
/// compares the caller of `set_fee_protocol` and `collect_protocol` with
/// [`owner`](Self::owner).
pub trait OwnerAuthority {
    /// The current owner.
    fn owner(&self) -> Address;
}

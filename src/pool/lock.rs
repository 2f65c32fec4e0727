//! Scoped acquisition of the pool lock.
//!
//! [`LockGuard`] clears `Slot::unlocked` when acquired and sets it again
//! when dropped, so the lock is released on every exit path including
//! early `?` returns.

use core::ops::{Deref, DerefMut};

use crate::error::AmmError;
use crate::pool::Pool;

/// Exclusive access to a pool for the duration of one operation.
#[derive(Debug)]
pub(crate) struct LockGuard<'a> {
    pool: &'a mut Pool,
}

impl<'a> LockGuard<'a> {
    /// Locks `pool`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::NotInitialized`] if the pool has no price yet.
    /// - [`AmmError::Locked`] if another operation holds the lock.
    pub(crate) fn acquire(pool: &'a mut Pool) -> Result<Self, AmmError> {
        pool.ensure_unlocked()?;
        pool.slot.unlocked = false;
        Ok(Self { pool })
    }
}

impl Deref for LockGuard<'_> {
    type Target = Pool;

    fn deref(&self) -> &Pool {
        self.pool
    }
}

impl DerefMut for LockGuard<'_> {
    fn deref_mut(&mut self) -> &mut Pool {
        self.pool
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.pool.slot.unlocked = true;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::Q96;
    use crate::memory::MemoryHost;
    use crate::pool::tests::{config, initialized_pool};
    use crate::domain::FeeTier;

    #[test]
    fn acquire_and_release() {
        let host = MemoryHost::new(0);
        let mut pool = initialized_pool(&host, Q96);
        {
            let Ok(guard) = LockGuard::acquire(&mut pool) else {
                panic!("expected Ok");
            };
            assert!(!guard.slot().unlocked);
            assert_eq!(guard.ensure_unlocked(), Err(AmmError::Locked));
        }
        assert!(pool.slot().unlocked);
    }

    #[test]
    fn nested_acquire_fails() {
        let host = MemoryHost::new(0);
        let mut pool = initialized_pool(&host, Q96);
        let Ok(mut guard) = LockGuard::acquire(&mut pool) else {
            panic!("expected Ok");
        };
        let Err(err) = LockGuard::acquire(&mut guard) else {
            panic!("expected Locked");
        };
        assert_eq!(err, AmmError::Locked);
    }

    #[test]
    fn uninitialized_pool_cannot_be_locked() {
        let Ok(mut pool) = Pool::new(&config(FeeTier::MEDIUM, 60)) else {
            panic!("expected Ok");
        };
        let Err(err) = LockGuard::acquire(&mut pool) else {
            panic!("expected NotInitialized");
        };
        assert_eq!(err, AmmError::NotInitialized);
    }
}

//! Payment callbacks invoked by the pool while it holds the lock.

use alloy_primitives::{I256, U256};

use crate::error::AmmError;
use crate::pool::Pool;
use crate::traits::Host;

/// The counterparty that pays the pool.
///
/// Each pool operation that needs tokens in return calls exactly one of
/// these methods, after it has sent out whatever it owes and before it
/// checks its own balances. The implementor must transfer at least the
/// owed amounts to the pool address through `host`.
///
/// The callback receives the locked pool: reading state is fine, while
/// any state-mutating call fails with [`AmmError::Locked`].
///
/// `data` is passed through unchanged from the originating call.
pub trait PaymentCallback<H: Host> {
    /// Called by [`Pool::mint`](crate::pool::Pool::mint) with the amounts
    /// owed for the new liquidity.
    ///
    /// # Errors
    ///
    /// Any error aborts and rolls back the mint.
    fn mint_callback(
        &mut self,
        pool: &mut Pool,
        host: &mut H,
        amount0_owed: U256,
        amount1_owed: U256,
        data: &[u8],
    ) -> Result<(), AmmError>;

    /// Called by [`Pool::swap`](crate::pool::Pool::swap) with the pool's
    /// balance deltas. The positive side is what the pool must receive.
    ///
    /// # Errors
    ///
    /// Any error aborts and rolls back the swap.
    fn swap_callback(
        &mut self,
        pool: &mut Pool,
        host: &mut H,
        amount0_delta: I256,
        amount1_delta: I256,
        data: &[u8],
    ) -> Result<(), AmmError>;

    /// Called by [`Pool::flash`](crate::pool::Pool::flash) with the fees
    /// due on top of the borrowed amounts.
    ///
    /// # Errors
    ///
    /// Any error aborts and rolls back the flash loan.
    fn flash_callback(
        &mut self,
        pool: &mut Pool,
        host: &mut H,
        fee0: U256,
        fee1: U256,
        data: &[u8],
    ) -> Result<(), AmmError>;
}

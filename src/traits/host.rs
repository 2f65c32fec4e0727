//! The execution environment a pool runs inside.
//!
//! A pool never holds token balances itself. It asks the [`Host`] for the
//! current block time, for balances, and to move assets between accounts.
//! Every state-mutating operation opens a host checkpoint first, so that a
//! failed operation can put back every transfer it already made.

use alloy_primitives::U256;

use crate::domain::Address;
use crate::error::AmmError;

/// Clock and asset ledger seen by a pool.
///
/// # Contract
///
/// - `block_timestamp` is truncated to 32 bits; the oracle handles
///   wraparound.
/// - `transfer` returns `Ok(false)` (or an error) when the move did not
///   happen. The pool treats both the same way, see [`safe_transfer`].
/// - Checkpoints nest. [`revert`](Self::revert) undoes every ledger change
///   made since the matching [`checkpoint`](Self::checkpoint), including
///   those of inner checkpoints that were already committed.
pub trait Host {
    /// Marker returned by [`checkpoint`](Self::checkpoint).
    type Checkpoint;

    /// Current block time in seconds.
    fn block_timestamp(&self) -> u32;

    /// Balance of `asset` held by `account`.
    fn balance_of(&self, asset: Address, account: Address) -> U256;

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Implementation-defined. Any error is reported to the pool caller as
    /// [`AmmError::TransferFailed`].
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, AmmError>;

    /// Starts recording ledger changes.
    fn checkpoint(&mut self) -> Self::Checkpoint;

    /// Keeps the changes made since `checkpoint`.
    fn commit(&mut self, checkpoint: Self::Checkpoint);

    /// Undoes the changes made since `checkpoint`.
    fn revert(&mut self, checkpoint: Self::Checkpoint);
}

/// Performs a transfer, failing unless the host confirms it.
///
/// # Errors
///
/// Returns [`AmmError::TransferFailed`] if the host reports `false` or an
/// error.
pub fn safe_transfer<H: Host>(
    host: &mut H,
    asset: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<(), AmmError> {
    match host.transfer(asset, from, to, amount) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => {
            tracing::debug!(%asset, %to, %amount, "transfer rejected by host");
            Err(AmmError::TransferFailed)
        }
    }
}

//! Administrative operations: protocol fee split and collection, oracle
//! capacity.

use alloy_primitives::U256;

use super::Pool;
use crate::domain::Address;
use crate::error::AmmError;
use crate::traits::{safe_transfer, Host, OwnerAuthority};

/// Returns `true` for an accepted protocol fee denominator.
const fn valid_fee_protocol(fee_protocol: u8) -> bool {
    matches!(fee_protocol, 0 | 4..=10)
}

fn ensure_owner<A: OwnerAuthority + ?Sized>(authority: &A, caller: Address) -> Result<(), AmmError> {
    if caller == authority.owner() {
        Ok(())
    } else {
        tracing::debug!(%caller, "administrative call rejected");
        Err(AmmError::Unauthorized)
    }
}

impl Pool {
    /// Sets the share of swap and flash fees diverted to the protocol.
    ///
    /// Each denominator is `0` (off) or in `4..=10`, meaning `1/n` of the
    /// fee.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::Unauthorized`] unless `caller` is the owner.
    /// - [`AmmError::InvalidFee`] for a denominator outside the accepted
    ///   values.
    pub fn set_fee_protocol<H, A>(
        &mut self,
        host: &mut H,
        authority: &A,
        caller: Address,
        fee_protocol_0: u8,
        fee_protocol_1: u8,
    ) -> Result<(), AmmError>
    where
        H: Host,
        A: OwnerAuthority + ?Sized,
    {
        self.locked(host, "set_fee_protocol", |pool, _| {
            ensure_owner(authority, caller)?;
            if !valid_fee_protocol(fee_protocol_0) || !valid_fee_protocol(fee_protocol_1) {
                return Err(AmmError::InvalidFee(
                    "protocol fee denominator must be 0 or between 4 and 10",
                ));
            }
            let old = pool.slot;
            pool.slot.fee_protocol = fee_protocol_0 + (fee_protocol_1 << 4);
            tracing::info!(
                pool = %pool.immutables.address,
                old_0 = old.fee_protocol_0(),
                old_1 = old.fee_protocol_1(),
                new_0 = fee_protocol_0,
                new_1 = fee_protocol_1,
                "SetFeeProtocol"
            );
            Ok(())
        })
    }

    /// Sends accrued protocol fees to `recipient`, at most the requested
    /// amounts. Returns the amounts sent.
    ///
    /// One unit of each token is always left behind when the full balance
    /// is requested.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::Unauthorized`] unless `caller` is the owner.
    /// - [`AmmError::TransferFailed`] if the host rejects a payout.
    pub fn collect_protocol<H, A>(
        &mut self,
        host: &mut H,
        authority: &A,
        caller: Address,
        recipient: Address,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), AmmError>
    where
        H: Host,
        A: OwnerAuthority + ?Sized,
    {
        self.locked(host, "collect_protocol", |pool, host| {
            ensure_owner(authority, caller)?;
            let mut amount0 = amount0_requested.min(pool.protocol_fees.token0);
            let mut amount1 = amount1_requested.min(pool.protocol_fees.token1);

            let pool_address = pool.immutables.address;
            if amount0 > 0 {
                if amount0 == pool.protocol_fees.token0 {
                    amount0 -= 1;
                }
                pool.protocol_fees.token0 -= amount0;
                if amount0 > 0 {
                    safe_transfer(
                        host,
                        pool.immutables.token0(),
                        pool_address,
                        recipient,
                        U256::from(amount0),
                    )?;
                }
            }
            if amount1 > 0 {
                if amount1 == pool.protocol_fees.token1 {
                    amount1 -= 1;
                }
                pool.protocol_fees.token1 -= amount1;
                if amount1 > 0 {
                    safe_transfer(
                        host,
                        pool.immutables.token1(),
                        pool_address,
                        recipient,
                        U256::from(amount1),
                    )?;
                }
            }

            tracing::info!(
                pool = %pool_address,
                %caller,
                %recipient,
                amount0,
                amount1,
                "CollectProtocol"
            );
            Ok((amount0, amount1))
        })
    }

    /// Grows the oracle so it can hold at least `observation_cardinality_next`
    /// observations.
    ///
    /// The new slots become usable as the ring wraps into them. Smaller
    /// values than the current capacity are ignored.
    ///
    /// # Errors
    ///
    /// [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    pub fn increase_observation_cardinality_next<H: Host>(
        &mut self,
        host: &mut H,
        observation_cardinality_next: u16,
    ) -> Result<(), AmmError> {
        self.locked(host, "increase_observation_cardinality_next", |pool, _| {
            let old = pool.slot.observation_cardinality_next;
            let new = pool.oracle.grow(old, observation_cardinality_next)?;
            pool.slot.observation_cardinality_next = new;
            if old != new {
                tracing::info!(
                    pool = %pool.immutables.address,
                    old,
                    new,
                    "IncreaseObservationCardinalityNext"
                );
            }
            Ok(())
        })
    }
}

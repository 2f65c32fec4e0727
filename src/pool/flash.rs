//! Flash loans against the pool's balances.

use alloy_primitives::U256;

use super::modify_position::paid_short;
use super::Pool;
use crate::domain::{FlashParams, FEE_DENOMINATOR};
use crate::error::AmmError;
use crate::math::{mul_div_floor, mul_div_rounding_up, to_u128, Q128};
use crate::traits::{safe_transfer, Host, PaymentCallback};

impl Pool {
    /// Lends `params.amount0` / `params.amount1` to `params.recipient`
    /// for the duration of [`PaymentCallback::flash_callback`].
    ///
    /// The callback must return the principal plus a fee of
    /// `ceil(amount * fee / 1e6)` per token. Anything paid on top of the
    /// principal is distributed to in-range liquidity as fees, minus the
    /// protocol share. Returns the amounts actually paid on top of the
    /// principal.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::InsufficientLiquidity`] if there is no in-range
    ///   liquidity to earn the fee.
    /// - [`AmmError::InsufficientPayment`] (`"F0"` / `"F1"`) if the loan
    ///   plus fee was not repaid.
    /// - [`AmmError::TransferFailed`] if the pool cannot send the loan.
    pub fn flash<H, C>(
        &mut self,
        host: &mut H,
        callback: &mut C,
        params: FlashParams,
        data: &[u8],
    ) -> Result<(U256, U256), AmmError>
    where
        H: Host,
        C: PaymentCallback<H>,
    {
        self.locked(host, "flash", |pool, host| {
            let liquidity = pool.liquidity;
            if liquidity == 0 {
                return Err(AmmError::InsufficientLiquidity);
            }

            let fee = U256::from(pool.immutables.fee.pips());
            let denominator = U256::from(FEE_DENOMINATOR);
            let fee0 = mul_div_rounding_up(params.amount0, fee, denominator)?;
            let fee1 = mul_div_rounding_up(params.amount1, fee, denominator)?;
            let balance0_before = pool.balance0(host);
            let balance1_before = pool.balance1(host);

            let pool_address = pool.immutables.address;
            if !params.amount0.is_zero() {
                safe_transfer(
                    host,
                    pool.immutables.token0(),
                    pool_address,
                    params.recipient,
                    params.amount0,
                )?;
            }
            if !params.amount1.is_zero() {
                safe_transfer(
                    host,
                    pool.immutables.token1(),
                    pool_address,
                    params.recipient,
                    params.amount1,
                )?;
            }

            callback.flash_callback(pool, host, fee0, fee1, data)?;

            let balance0_after = pool.balance0(host);
            let balance1_after = pool.balance1(host);
            if paid_short(balance0_before, fee0, balance0_after)? {
                return Err(AmmError::InsufficientPayment("F0"));
            }
            if paid_short(balance1_before, fee1, balance1_after)? {
                return Err(AmmError::InsufficientPayment("F1"));
            }

            let paid0 = balance0_after - balance0_before;
            let paid1 = balance1_after - balance1_before;
            let liquidity = U256::from(liquidity);

            if !paid0.is_zero() {
                let fee_protocol = pool.slot.fee_protocol_0();
                let protocol0 = if fee_protocol == 0 {
                    U256::ZERO
                } else {
                    paid0 / U256::from(fee_protocol)
                };
                pool.protocol_fees.token0 = pool
                    .protocol_fees
                    .token0
                    .saturating_add(to_u128(protocol0).unwrap_or(u128::MAX));
                pool.fee_growth_global_0_x128 = pool
                    .fee_growth_global_0_x128
                    .wrapping_add(mul_div_floor(paid0 - protocol0, Q128, liquidity)?);
            }
            if !paid1.is_zero() {
                let fee_protocol = pool.slot.fee_protocol_1();
                let protocol1 = if fee_protocol == 0 {
                    U256::ZERO
                } else {
                    paid1 / U256::from(fee_protocol)
                };
                pool.protocol_fees.token1 = pool
                    .protocol_fees
                    .token1
                    .saturating_add(to_u128(protocol1).unwrap_or(u128::MAX));
                pool.fee_growth_global_1_x128 = pool
                    .fee_growth_global_1_x128
                    .wrapping_add(mul_div_floor(paid1 - protocol1, Q128, liquidity)?);
            }

            tracing::info!(
                pool = %pool_address,
                recipient = %params.recipient,
                amount0 = %params.amount0,
                amount1 = %params.amount1,
                %paid0,
                %paid1,
                "Flash"
            );
            Ok((paid0, paid1))
        })
    }
}

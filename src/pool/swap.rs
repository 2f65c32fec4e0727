//! The swap state machine.
//!
//! A swap walks the price from one initialized tick to the next. Each
//! step is priced by [`compute_swap_step`] against the liquidity in
//! range; when a step ends exactly on an initialized tick the tick is
//! crossed and its net liquidity applied. Fees accrue per step into the
//! global fee-growth accumulator of the input token.

use alloy_primitives::{I256, U256};

use super::modify_position::paid_short;
use super::Pool;
use crate::domain::{BalanceDelta, SwapParams};
use crate::error::AmmError;
use crate::math::{
    add_delta, compute_swap_step, mul_div_floor, sqrt_price_at_tick, tick_at_sqrt_price, to_i256,
    to_u128, CheckedArithmetic, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, Q128,
};
use crate::state::{Accumulators, ObserveContext, Slot};
use crate::traits::{safe_transfer, Host, PaymentCallback};

/// Values fixed for the duration of one swap.
#[derive(Debug)]
struct SwapCache {
    slot_start: Slot,
    liquidity_start: u128,
    block_timestamp: u32,
    fee_protocol: u8,
    /// Oracle cumulatives as of now, computed on the first tick crossing.
    latest_observation: Option<(i64, U256)>,
}

/// Running state of a swap.
#[derive(Debug)]
struct SwapState {
    amount_specified_remaining: I256,
    amount_calculated: I256,
    sqrt_price_x96: U256,
    tick: i32,
    fee_growth_global_x128: U256,
    protocol_fee: u128,
    liquidity: u128,
}

fn checked_add(a: I256, b: I256) -> Result<I256, AmmError> {
    a.checked_add(b).ok_or(AmmError::Overflow("swap amount overflow"))
}

fn checked_sub(a: I256, b: I256) -> Result<I256, AmmError> {
    a.checked_sub(b).ok_or(AmmError::Overflow("swap amount overflow"))
}

impl Pool {
    /// Swaps token0 for token1 (`zero_for_one`) or back.
    ///
    /// A positive `amount_specified` is an exact input, a negative one an
    /// exact output. The swap stops when the amount is used up or the
    /// price reaches `sqrt_price_limit_x96`, whichever comes first.
    ///
    /// The output is sent to `params.recipient` before
    /// [`PaymentCallback::swap_callback`] runs; the callback must then pay
    /// the input. The returned deltas are from the pool's point of view:
    /// positive means received.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::InvalidQuantity`] if `amount_specified` is zero.
    /// - [`AmmError::InvalidPriceLimit`] if the limit is not strictly
    ///   between the current price and the global bound in the swap
    ///   direction.
    /// - [`AmmError::InsufficientPayment`] (`"IIA"`) if the callback paid
    ///   less than the input owed.
    /// - [`AmmError::TransferFailed`] if the output transfer fails.
    pub fn swap<H, C>(
        &mut self,
        host: &mut H,
        callback: &mut C,
        params: SwapParams,
        data: &[u8],
    ) -> Result<BalanceDelta, AmmError>
    where
        H: Host,
        C: PaymentCallback<H>,
    {
        self.locked(host, "swap", |pool, host| {
            pool.execute_swap(host, callback, &params, data)
        })
    }

    fn execute_swap<H, C>(
        &mut self,
        host: &mut H,
        callback: &mut C,
        params: &SwapParams,
        data: &[u8],
    ) -> Result<BalanceDelta, AmmError>
    where
        H: Host,
        C: PaymentCallback<H>,
    {
        if params.amount_specified.is_zero() {
            return Err(AmmError::InvalidQuantity("swap amount must be non-zero"));
        }
        let zero_for_one = params.zero_for_one;
        let limit = params.sqrt_price_limit_x96;
        let slot_start = self.slot;
        let limit_ok = if zero_for_one {
            limit < slot_start.sqrt_price_x96 && limit > MIN_SQRT_RATIO
        } else {
            limit > slot_start.sqrt_price_x96 && limit < MAX_SQRT_RATIO
        };
        if !limit_ok {
            return Err(AmmError::InvalidPriceLimit(
                "limit must lie between the current price and the bound in the swap direction",
            ));
        }

        let mut cache = SwapCache {
            slot_start,
            liquidity_start: self.liquidity,
            block_timestamp: host.block_timestamp(),
            fee_protocol: slot_start.fee_protocol_for(zero_for_one),
            latest_observation: None,
        };
        let exact_input = params.amount_specified.is_positive();
        let mut state = SwapState {
            amount_specified_remaining: params.amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: slot_start.sqrt_price_x96,
            tick: slot_start.tick,
            fee_growth_global_x128: if zero_for_one {
                self.fee_growth_global_0_x128
            } else {
                self.fee_growth_global_1_x128
            },
            protocol_fee: 0,
            liquidity: cache.liquidity_start,
        };

        while !state.amount_specified_remaining.is_zero() && state.sqrt_price_x96 != limit {
            self.swap_step(&mut cache, &mut state, zero_for_one, exact_input, limit)?;
        }

        self.finish_swap(&cache, &state, zero_for_one)?;

        let consumed = checked_sub(params.amount_specified, state.amount_specified_remaining)?;
        let (amount0, amount1) = if zero_for_one == exact_input {
            (consumed, state.amount_calculated)
        } else {
            (state.amount_calculated, consumed)
        };

        self.settle_swap(host, callback, params, data, amount0, amount1)?;

        tracing::info!(
            pool = %self.immutables.address,
            recipient = %params.recipient,
            %amount0,
            %amount1,
            sqrt_price_x96 = %state.sqrt_price_x96,
            liquidity = state.liquidity,
            tick = state.tick,
            "Swap"
        );
        Ok(BalanceDelta::new(amount0, amount1))
    }

    /// One iteration: move to the next initialized tick, the limit, or
    /// as far as the remaining amount allows.
    fn swap_step(
        &mut self,
        cache: &mut SwapCache,
        state: &mut SwapState,
        zero_for_one: bool,
        exact_input: bool,
        limit: U256,
    ) -> Result<(), AmmError> {
        let sqrt_price_start_x96 = state.sqrt_price_x96;
        let (tick_next, initialized) = self.tick_bitmap.next_initialized_tick_within_one_word(
            state.tick,
            self.immutables.tick_spacing,
            zero_for_one,
        )?;
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = sqrt_price_at_tick(tick_next)?;

        let target = if (zero_for_one && sqrt_price_next_x96 < limit)
            || (!zero_for_one && sqrt_price_next_x96 > limit)
        {
            limit
        } else {
            sqrt_price_next_x96
        };
        let step = compute_swap_step(
            state.sqrt_price_x96,
            target,
            state.liquidity,
            state.amount_specified_remaining,
            self.immutables.fee.pips(),
        )?;
        state.sqrt_price_x96 = step.sqrt_price_next_x96;

        let paid_in = to_i256(
            step.amount_in
                .checked_add(step.fee_amount)
                .ok_or(AmmError::Overflow("swap amount overflow"))?,
        )?;
        let paid_out = to_i256(step.amount_out)?;
        if exact_input {
            state.amount_specified_remaining = checked_sub(state.amount_specified_remaining, paid_in)?;
            state.amount_calculated = checked_sub(state.amount_calculated, paid_out)?;
        } else {
            state.amount_specified_remaining = checked_add(state.amount_specified_remaining, paid_out)?;
            state.amount_calculated = checked_add(state.amount_calculated, paid_in)?;
        }

        let mut fee_amount = step.fee_amount;
        if cache.fee_protocol > 0 {
            let protocol_share = fee_amount / U256::from(cache.fee_protocol);
            fee_amount -= protocol_share;
            state.protocol_fee = state.protocol_fee.safe_add(&to_u128(protocol_share)?)?;
        }
        if state.liquidity > 0 {
            state.fee_growth_global_x128 = state.fee_growth_global_x128.wrapping_add(mul_div_floor(
                fee_amount,
                Q128,
                U256::from(state.liquidity),
            )?);
        }

        tracing::trace!(
            tick_next,
            initialized,
            sqrt_price_x96 = %state.sqrt_price_x96,
            amount_in = %step.amount_in,
            amount_out = %step.amount_out,
            fee_amount = %step.fee_amount,
            "swap step"
        );

        if state.sqrt_price_x96 == sqrt_price_next_x96 {
            if initialized {
                let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                    match cache.latest_observation {
                        Some(observation) => observation,
                        None => {
                            let observation = self.oracle.observe_single(
                                &ObserveContext {
                                    time: cache.block_timestamp,
                                    tick: cache.slot_start.tick,
                                    liquidity: cache.liquidity_start,
                                    index: cache.slot_start.observation_index,
                                    cardinality: cache.slot_start.observation_cardinality,
                                },
                                0,
                            )?;
                            cache.latest_observation = Some(observation);
                            observation
                        }
                    };
                let (fee_growth_global_0_x128, fee_growth_global_1_x128) = if zero_for_one {
                    (state.fee_growth_global_x128, self.fee_growth_global_1_x128)
                } else {
                    (self.fee_growth_global_0_x128, state.fee_growth_global_x128)
                };
                let globals = Accumulators {
                    fee_growth_global_0_x128,
                    fee_growth_global_1_x128,
                    seconds_per_liquidity_cumulative_x128,
                    tick_cumulative,
                    time: cache.block_timestamp,
                };
                self.journal_tick(tick_next);
                let liquidity_net = self.ticks.cross(tick_next, &globals);
                // moving left, the net liquidity is applied in reverse
                let liquidity_net = if zero_for_one {
                    liquidity_net
                        .checked_neg()
                        .ok_or(AmmError::Overflow("tick liquidity_net overflow"))?
                } else {
                    liquidity_net
                };
                state.liquidity = add_delta(state.liquidity, liquidity_net)?;
            }
            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x96 != sqrt_price_start_x96 {
            state.tick = tick_at_sqrt_price(state.sqrt_price_x96)?;
        }
        Ok(())
    }

    /// Writes the swap's effects on price, oracle, liquidity and fees.
    fn finish_swap(
        &mut self,
        cache: &SwapCache,
        state: &SwapState,
        zero_for_one: bool,
    ) -> Result<(), AmmError> {
        let slot_start = cache.slot_start;
        if state.tick != slot_start.tick {
            self.journal_oracle_write(&slot_start);
            let (index, cardinality) = self.oracle.write(
                slot_start.observation_index,
                cache.block_timestamp,
                slot_start.tick,
                cache.liquidity_start,
                slot_start.observation_cardinality,
                slot_start.observation_cardinality_next,
            )?;
            self.slot.sqrt_price_x96 = state.sqrt_price_x96;
            self.slot.tick = state.tick;
            self.slot.observation_index = index;
            self.slot.observation_cardinality = cardinality;
        } else {
            self.slot.sqrt_price_x96 = state.sqrt_price_x96;
        }

        if cache.liquidity_start != state.liquidity {
            self.liquidity = state.liquidity;
        }

        if zero_for_one {
            self.fee_growth_global_0_x128 = state.fee_growth_global_x128;
            self.protocol_fees.token0 = self.protocol_fees.token0.saturating_add(state.protocol_fee);
        } else {
            self.fee_growth_global_1_x128 = state.fee_growth_global_x128;
            self.protocol_fees.token1 = self.protocol_fees.token1.saturating_add(state.protocol_fee);
        }
        Ok(())
    }

    /// Sends the output, runs the callback and checks the input arrived.
    fn settle_swap<H, C>(
        &mut self,
        host: &mut H,
        callback: &mut C,
        params: &SwapParams,
        data: &[u8],
        amount0: I256,
        amount1: I256,
    ) -> Result<(), AmmError>
    where
        H: Host,
        C: PaymentCallback<H>,
    {
        let pool_address = self.immutables.address;
        if params.zero_for_one {
            if amount1.is_negative() {
                safe_transfer(
                    host,
                    self.immutables.token1(),
                    pool_address,
                    params.recipient,
                    amount1.unsigned_abs(),
                )?;
            }
            let balance0_before = self.balance0(host);
            callback.swap_callback(self, host, amount0, amount1, data)?;
            let owed = if amount0.is_positive() { amount0.unsigned_abs() } else { U256::ZERO };
            if paid_short(balance0_before, owed, self.balance0(host))? {
                return Err(AmmError::InsufficientPayment("IIA"));
            }
        } else {
            if amount0.is_negative() {
                safe_transfer(
                    host,
                    self.immutables.token0(),
                    pool_address,
                    params.recipient,
                    amount0.unsigned_abs(),
                )?;
            }
            let balance1_before = self.balance1(host);
            callback.swap_callback(self, host, amount0, amount1, data)?;
            let owed = if amount1.is_positive() { amount1.unsigned_abs() } else { U256::ZERO };
            if paid_short(balance1_before, owed, self.balance1(host))? {
                return Err(AmmError::InsufficientPayment("IIA"));
            }
        }
        Ok(())
    }
}

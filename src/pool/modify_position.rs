//! Adding and removing liquidity, and collecting what positions are owed.

use alloy_primitives::{I256, U256};

use super::Pool;
use crate::domain::{Address, CollectParams, MintParams, PositionKey, RangePosition, TickRange};
use crate::error::AmmError;
use crate::math::{
    add_delta, amount0_delta_signed, amount1_delta_signed, sqrt_price_at_tick, to_u128,
};
use crate::state::Accumulators;
use crate::traits::{safe_transfer, Host, PaymentCallback};

impl Pool {
    /// Adds `params.amount` liquidity to `params.recipient`'s position.
    ///
    /// The amounts owed are requested through
    /// [`PaymentCallback::mint_callback`] and verified against the pool's
    /// balances afterwards. Returns the amounts paid.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::InvalidQuantity`] if `params.amount` is zero.
    /// - [`AmmError::InvalidTickRange`] if a bound is not a multiple of
    ///   the tick spacing.
    /// - [`AmmError::TickLiquidityOverflow`] if a bound would exceed the
    ///   per-tick liquidity cap.
    /// - [`AmmError::InsufficientPayment`] (`"M0"` / `"M1"`) if the
    ///   callback paid less than owed.
    pub fn mint<H, C>(
        &mut self,
        host: &mut H,
        callback: &mut C,
        params: MintParams,
        data: &[u8],
    ) -> Result<(U256, U256), AmmError>
    where
        H: Host,
        C: PaymentCallback<H>,
    {
        self.locked(host, "mint", |pool, host| {
            if params.amount == 0 {
                return Err(AmmError::InvalidQuantity("mint amount must be positive"));
            }
            let liquidity_delta = i128::try_from(params.amount)
                .map_err(|_| AmmError::Overflow("liquidity amount exceeds int128"))?;
            let (amount0, amount1) =
                pool.modify_position(host, params.recipient, params.range, liquidity_delta)?;
            let amount0 = amount0.unsigned_abs();
            let amount1 = amount1.unsigned_abs();

            let balance0_before = pool.balance0(host);
            let balance1_before = pool.balance1(host);
            callback.mint_callback(pool, host, amount0, amount1, data)?;
            if !amount0.is_zero() && paid_short(balance0_before, amount0, pool.balance0(host))? {
                return Err(AmmError::InsufficientPayment("M0"));
            }
            if !amount1.is_zero() && paid_short(balance1_before, amount1, pool.balance1(host))? {
                return Err(AmmError::InsufficientPayment("M1"));
            }

            tracing::info!(
                pool = %pool.immutables.address,
                owner = %params.recipient,
                range = %params.range,
                liquidity = params.amount,
                %amount0,
                %amount1,
                "Mint"
            );
            Ok((amount0, amount1))
        })
    }

    /// Removes `amount` liquidity from `owner`'s position.
    ///
    /// Nothing is transferred: the released principal is added to the
    /// position's owed balances and paid out by [`collect`](Self::collect).
    /// A zero `amount` only settles accrued fees.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::NoLiquidityToPoke`] for a zero `amount` on an empty
    ///   position.
    /// - [`AmmError::Underflow`] if `amount` exceeds the position's
    ///   liquidity.
    pub fn burn<H: Host>(
        &mut self,
        host: &mut H,
        owner: Address,
        range: TickRange,
        amount: u128,
    ) -> Result<(U256, U256), AmmError> {
        self.locked(host, "burn", |pool, host| {
            let liquidity_delta = i128::try_from(amount)
                .map_err(|_| AmmError::Overflow("liquidity amount exceeds int128"))?;
            let (amount0, amount1) = pool.modify_position(host, owner, range, -liquidity_delta)?;
            let amount0 = amount0.unsigned_abs();
            let amount1 = amount1.unsigned_abs();

            if !amount0.is_zero() || !amount1.is_zero() {
                let key = PositionKey::new(owner, range);
                pool.journal_position(key);
                if let Some(position) = pool.positions.get_mut(&key) {
                    position.tokens_owed_0 = position
                        .tokens_owed_0
                        .saturating_add(to_u128(amount0).unwrap_or(u128::MAX));
                    position.tokens_owed_1 = position
                        .tokens_owed_1
                        .saturating_add(to_u128(amount1).unwrap_or(u128::MAX));
                }
            }

            tracing::info!(
                pool = %pool.immutables.address,
                %owner,
                %range,
                liquidity = amount,
                %amount0,
                %amount1,
                "Burn"
            );
            Ok((amount0, amount1))
        })
    }

    /// Pays out up to the requested amounts of what `owner`'s position is
    /// owed, to `params.recipient`. Returns the amounts transferred.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Locked`] / [`AmmError::NotInitialized`].
    /// - [`AmmError::TransferFailed`] if the host rejects a payout.
    pub fn collect<H: Host>(
        &mut self,
        host: &mut H,
        owner: Address,
        params: CollectParams,
    ) -> Result<(u128, u128), AmmError> {
        self.locked(host, "collect", |pool, host| {
            let key = PositionKey::new(owner, params.range);
            pool.journal_position(key);
            let (amount0, amount1) = match pool.positions.get_mut(&key) {
                Some(position) => {
                    let amount0 = params.amount0_requested.min(position.tokens_owed_0);
                    let amount1 = params.amount1_requested.min(position.tokens_owed_1);
                    position.tokens_owed_0 -= amount0;
                    position.tokens_owed_1 -= amount1;
                    (amount0, amount1)
                }
                None => (0, 0),
            };

            let pool_address = pool.immutables.address;
            if amount0 > 0 {
                safe_transfer(
                    host,
                    pool.immutables.token0(),
                    pool_address,
                    params.recipient,
                    U256::from(amount0),
                )?;
            }
            if amount1 > 0 {
                safe_transfer(
                    host,
                    pool.immutables.token1(),
                    pool_address,
                    params.recipient,
                    U256::from(amount1),
                )?;
            }

            tracing::info!(
                pool = %pool_address,
                %owner,
                recipient = %params.recipient,
                range = %params.range,
                amount0,
                amount1,
                "Collect"
            );
            Ok((amount0, amount1))
        })
    }

    /// Applies a liquidity change to a position and returns the token
    /// amounts it implies. Positive amounts are owed to the pool.
    fn modify_position<H: Host>(
        &mut self,
        host: &H,
        owner: Address,
        range: TickRange,
        liquidity_delta: i128,
    ) -> Result<(I256, I256), AmmError> {
        let spacing = self.immutables.tick_spacing;
        if range.lower() % spacing != 0 || range.upper() % spacing != 0 {
            return Err(AmmError::InvalidTickRange(
                "range bounds must be multiples of the tick spacing",
            ));
        }

        let time = host.block_timestamp();
        let slot = self.slot;
        self.update_position(owner, range, liquidity_delta, slot.tick, time)?;

        if liquidity_delta == 0 {
            return Ok((I256::ZERO, I256::ZERO));
        }

        let sqrt_lower = sqrt_price_at_tick(range.lower())?;
        let sqrt_upper = sqrt_price_at_tick(range.upper())?;
        match range.locate(slot.tick) {
            RangePosition::Below => Ok((
                amount0_delta_signed(sqrt_lower, sqrt_upper, liquidity_delta)?,
                I256::ZERO,
            )),
            RangePosition::Inside => {
                self.journal_oracle_write(&slot);
                let (index, cardinality) = self.oracle.write(
                    slot.observation_index,
                    time,
                    slot.tick,
                    self.liquidity,
                    slot.observation_cardinality,
                    slot.observation_cardinality_next,
                )?;
                self.slot.observation_index = index;
                self.slot.observation_cardinality = cardinality;

                let amount0 = amount0_delta_signed(slot.sqrt_price_x96, sqrt_upper, liquidity_delta)?;
                let amount1 = amount1_delta_signed(sqrt_lower, slot.sqrt_price_x96, liquidity_delta)?;
                self.liquidity = add_delta(self.liquidity, liquidity_delta)?;
                Ok((amount0, amount1))
            }
            RangePosition::Above => Ok((
                I256::ZERO,
                amount1_delta_signed(sqrt_lower, sqrt_upper, liquidity_delta)?,
            )),
        }
    }

    /// Updates both bound ticks, the bitmap and the position record.
    fn update_position(
        &mut self,
        owner: Address,
        range: TickRange,
        liquidity_delta: i128,
        tick: i32,
        time: u32,
    ) -> Result<(), AmmError> {
        let (lower, upper) = (range.lower(), range.upper());
        let fee_growth_global_0_x128 = self.fee_growth_global_0_x128;
        let fee_growth_global_1_x128 = self.fee_growth_global_1_x128;
        let spacing = self.immutables.tick_spacing;

        let mut flipped_lower = false;
        let mut flipped_upper = false;
        if liquidity_delta != 0 {
            let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                self.oracle.observe_single(&self.observe_context(time), 0)?;
            let globals = Accumulators {
                fee_growth_global_0_x128,
                fee_growth_global_1_x128,
                seconds_per_liquidity_cumulative_x128,
                tick_cumulative,
                time,
            };
            let max_liquidity = self.immutables.max_liquidity_per_tick;
            self.journal_tick(lower);
            self.journal_tick(upper);
            flipped_lower =
                self.ticks
                    .update(lower, tick, liquidity_delta, &globals, false, max_liquidity)?;
            flipped_upper =
                self.ticks
                    .update(upper, tick, liquidity_delta, &globals, true, max_liquidity)?;
            if flipped_lower {
                self.journal_tick_word(lower);
                self.tick_bitmap.flip_tick(lower, spacing)?;
            }
            if flipped_upper {
                self.journal_tick_word(upper);
                self.tick_bitmap.flip_tick(upper, spacing)?;
            }
        }

        let (fee_growth_inside_0_x128, fee_growth_inside_1_x128) = self.ticks.fee_growth_inside(
            lower,
            upper,
            tick,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
        );
        let key = PositionKey::new(owner, range);
        self.journal_position(key);
        self.positions
            .get_mut_or_default(key)
            .update(liquidity_delta, fee_growth_inside_0_x128, fee_growth_inside_1_x128)?;

        // ticks only flip off when liquidity is removed
        if liquidity_delta < 0 {
            if flipped_lower {
                self.ticks.clear(lower);
            }
            if flipped_upper {
                self.ticks.clear(upper);
            }
        }
        Ok(())
    }
}

/// `true` if `after` is below `before + owed`.
pub(super) fn paid_short(before: U256, owed: U256, after: U256) -> Result<bool, AmmError> {
    let required = before
        .checked_add(owed)
        .ok_or(AmmError::Overflow("pool balance overflow"))?;
    Ok(after < required)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::FeeTier;
    use crate::math::{sqrt_price_at_tick, Q96};
    use crate::memory::MemoryHost;
    use crate::pool::tests::{config, initialized_pool, range, TOKEN0, TOKEN1};

    const LP: Address = Address::repeat_byte(0x11);

    /// Pays exactly what the pool asks for, out of `payer`'s balance.
    struct Payer {
        payer: Address,
        shortfall: U256,
        calls: u32,
    }

    impl Payer {
        fn new() -> Self {
            Self {
                payer: LP,
                shortfall: U256::ZERO,
                calls: 0,
            }
        }
    }

    impl PaymentCallback<MemoryHost> for Payer {
        fn mint_callback(
            &mut self,
            pool: &mut Pool,
            host: &mut MemoryHost,
            amount0_owed: U256,
            amount1_owed: U256,
            _data: &[u8],
        ) -> Result<(), AmmError> {
            self.calls += 1;
            let to = pool.immutables().address;
            let pair = pool.immutables().token_pair;
            let amount0 = amount0_owed.saturating_sub(self.shortfall);
            host.transfer(pair.token0(), self.payer, to, amount0)?;
            host.transfer(pair.token1(), self.payer, to, amount1_owed)?;
            Ok(())
        }

        fn swap_callback(
            &mut self,
            _pool: &mut Pool,
            _host: &mut MemoryHost,
            _amount0_delta: I256,
            _amount1_delta: I256,
            _data: &[u8],
        ) -> Result<(), AmmError> {
            panic!("unexpected swap callback");
        }

        fn flash_callback(
            &mut self,
            _pool: &mut Pool,
            _host: &mut MemoryHost,
            _fee0: U256,
            _fee1: U256,
            _data: &[u8],
        ) -> Result<(), AmmError> {
            panic!("unexpected flash callback");
        }
    }

    fn funded_host() -> MemoryHost {
        let mut host = MemoryHost::new(1_000);
        host.mint(TOKEN0, LP, U256::from(u128::MAX));
        host.mint(TOKEN1, LP, U256::from(u128::MAX));
        host
    }

    fn mint(pool: &mut Pool, host: &mut MemoryHost, r: TickRange, amount: u128) -> (U256, U256) {
        let Ok(amounts) = pool.mint(host, &mut Payer::new(), MintParams::new(LP, r, amount), &[])
        else {
            panic!("expected Ok");
        };
        amounts
    }

    // -- mint ---------------------------------------------------------------

    #[test]
    fn mint_in_range_is_symmetric_at_one() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let (amount0, amount1) = mint(&mut pool, &mut host, range(-60, 60), 1_000);
        assert_eq!(amount0, U256::from(3u8));
        assert_eq!(amount1, U256::from(3u8));
        assert_eq!(pool.liquidity(), 1_000);
        assert_eq!(pool.balance0(&host), amount0);
        assert_eq!(pool.balance1(&host), amount1);
    }

    #[test]
    fn mint_below_range_takes_token0_only() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let (amount0, amount1) = mint(&mut pool, &mut host, range(60, 120), 1_000_000);
        assert!(amount0 > U256::ZERO);
        assert_eq!(amount1, U256::ZERO);
        assert_eq!(pool.liquidity(), 0);
    }

    #[test]
    fn mint_above_range_takes_token1_only() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let (amount0, amount1) = mint(&mut pool, &mut host, range(-120, -60), 1_000_000);
        assert_eq!(amount0, U256::ZERO);
        assert!(amount1 > U256::ZERO);
        assert_eq!(pool.liquidity(), 0);
    }

    #[test]
    fn mint_initializes_ticks_and_bitmap() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let _ = mint(&mut pool, &mut host, range(-60, 60), 500);
        let Some(lower) = pool.tick(-60) else {
            panic!("expected lower tick");
        };
        assert_eq!(lower.liquidity_gross, 500);
        assert_eq!(lower.liquidity_net, 500);
        let Some(upper) = pool.tick(60) else {
            panic!("expected upper tick");
        };
        assert_eq!(upper.liquidity_net, -500);
        assert_eq!(pool.tick_bitmap().is_initialized(-60, 60), Ok(true));
        assert_eq!(pool.tick_bitmap().is_initialized(60, 60), Ok(true));
    }

    #[test]
    fn mint_zero_fails() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let result = pool.mint(&mut host, &mut Payer::new(), MintParams::new(LP, range(-60, 60), 0), &[]);
        let Err(AmmError::InvalidQuantity(_)) = result else {
            panic!("expected InvalidQuantity");
        };
    }

    #[test]
    fn mint_unaligned_range_fails() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let result = pool.mint(&mut host, &mut Payer::new(), MintParams::new(LP, range(-61, 60), 10), &[]);
        let Err(AmmError::InvalidTickRange(_)) = result else {
            panic!("expected InvalidTickRange");
        };
    }

    #[test]
    fn mint_before_initialize_fails() {
        let mut host = funded_host();
        let Ok(mut pool) = Pool::new(&config(FeeTier::MEDIUM, 60)) else {
            panic!("expected Ok");
        };
        let mut payer = Payer::new();
        let result = pool.mint(&mut host, &mut payer, MintParams::new(LP, range(-60, 60), 10), &[]);
        assert_eq!(result, Err(AmmError::NotInitialized));
        assert_eq!(payer.calls, 0);
    }

    #[test]
    fn mint_underpayment_rolls_back() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let before = pool.clone();
        let mut payer = Payer {
            shortfall: U256::from(1u8),
            ..Payer::new()
        };
        let result = pool.mint(&mut host, &mut payer, MintParams::new(LP, range(-60, 60), 1_000), &[]);
        assert_eq!(result, Err(AmmError::InsufficientPayment("M0")));
        assert_eq!(payer.calls, 1);
        assert_eq!(pool, before);
        assert_eq!(pool.balance0(&host), U256::ZERO);
        assert_eq!(pool.balance1(&host), U256::ZERO);
    }

    #[test]
    fn mint_over_tick_cap_fails() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let cap = pool.immutables().max_liquidity_per_tick;
        let result = pool.mint(&mut host, &mut Payer::new(), MintParams::new(LP, range(-60, 60), cap + 1), &[]);
        assert_eq!(result, Err(AmmError::TickLiquidityOverflow));
    }

    // -- burn ---------------------------------------------------------------

    #[test]
    fn burn_credits_tokens_owed() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let r = range(-60, 60);
        let _ = mint(&mut pool, &mut host, r, 1_000);
        let Ok((amount0, amount1)) = pool.burn(&mut host, LP, r, 1_000) else {
            panic!("expected Ok");
        };
        // burning rounds down, minting rounds up
        assert_eq!(amount0, U256::from(2u8));
        assert_eq!(amount1, U256::from(2u8));
        let Some(position) = pool.position(&PositionKey::new(LP, r)) else {
            panic!("expected position");
        };
        assert_eq!(position.liquidity, 0);
        assert_eq!(position.tokens_owed_0, 2);
        assert_eq!(position.tokens_owed_1, 2);
        assert_eq!(pool.liquidity(), 0);
        // both ticks were cleared with the last liquidity
        assert!(pool.tick(-60).is_none());
        assert!(pool.tick(60).is_none());
        assert_eq!(pool.tick_bitmap_word(-1), U256::ZERO);
        assert_eq!(pool.tick_bitmap_word(0), U256::ZERO);
    }

    #[test]
    fn burn_more_than_owned_fails() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let r = range(-60, 60);
        let _ = mint(&mut pool, &mut host, r, 100);
        let before = pool.clone();
        let Err(AmmError::Underflow(_)) = pool.burn(&mut host, LP, r, 101) else {
            panic!("expected Underflow");
        };
        assert_eq!(pool, before);
    }

    #[test]
    fn poke_without_position_fails() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        assert_eq!(
            pool.burn(&mut host, LP, range(-60, 60), 0),
            Err(AmmError::NoLiquidityToPoke)
        );
        assert!(pool.positions().is_empty());
    }

    #[test]
    fn shared_tick_stays_initialized() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let _ = mint(&mut pool, &mut host, range(-60, 60), 100);
        let _ = mint(&mut pool, &mut host, range(60, 120), 100);
        let Ok(_) = pool.burn(&mut host, LP, range(-60, 60), 100) else {
            panic!("expected Ok");
        };
        assert!(pool.tick(-60).is_none());
        let Some(shared) = pool.tick(60) else {
            panic!("expected shared tick");
        };
        assert_eq!(shared.liquidity_gross, 100);
        assert_eq!(shared.liquidity_net, 100);
    }

    // -- collect ------------------------------------------------------------

    #[test]
    fn collect_pays_out_owed_amounts() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let r = range(-60, 60);
        let _ = mint(&mut pool, &mut host, r, 1_000);
        let _ = pool.burn(&mut host, LP, r, 1_000);

        let recipient = Address::repeat_byte(0x22);
        let Ok((amount0, amount1)) =
            pool.collect(&mut host, LP, CollectParams::new(recipient, r, 1, u128::MAX))
        else {
            panic!("expected Ok");
        };
        assert_eq!((amount0, amount1), (1, 2));
        assert_eq!(host.balance_of(TOKEN0, recipient), U256::from(1u8));
        assert_eq!(host.balance_of(TOKEN1, recipient), U256::from(2u8));
        let Some(position) = pool.position(&PositionKey::new(LP, r)) else {
            panic!("expected position");
        };
        assert_eq!(position.tokens_owed_0, 1);
        assert_eq!(position.tokens_owed_1, 0);
    }

    #[test]
    fn collect_without_position_is_noop() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let Ok(amounts) = pool.collect(&mut host, LP, CollectParams::all(LP, range(-60, 60))) else {
            panic!("expected Ok");
        };
        assert_eq!(amounts, (0, 0));
        assert!(pool.positions().is_empty());
    }

    #[test]
    fn collect_failed_transfer_rolls_back() {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let r = range(-60, 60);
        let _ = mint(&mut pool, &mut host, r, 1_000);
        let _ = pool.burn(&mut host, LP, r, 1_000);
        let before = pool.clone();

        host.set_transfers_disabled(true);
        assert_eq!(
            pool.collect(&mut host, LP, CollectParams::all(LP, r)),
            Err(AmmError::TransferFailed)
        );
        assert_eq!(pool, before);
    }

    // -- properties ---------------------------------------------------------

    #[test]
    fn mint_and_burn_amounts_match_up_to_rounding() {
        let mut host = funded_host();
        let Ok(price) = sqrt_price_at_tick(37) else {
            panic!("expected Ok");
        };
        let mut pool = initialized_pool(&host, price);
        let r = range(-600, 1_200);
        let (in0, in1) = mint(&mut pool, &mut host, r, 123_456_789);
        let Ok((out0, out1)) = pool.burn(&mut host, LP, r, 123_456_789) else {
            panic!("expected Ok");
        };
        assert!(out0 <= in0 && in0 - out0 <= U256::from(1u8));
        assert!(out1 <= in1 && in1 - out1 <= U256::from(1u8));
    }
}

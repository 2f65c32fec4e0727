//! Property-based tests for pool-level invariants.
//!
//! 1. **Mint/burn rounding**: burning what was minted never returns more
//!    than was paid in.
//! 2. **Exact input**: an exact-input swap that is not price-limited
//!    consumes exactly the specified amount.
//! 3. **Exact output**: an exact-output swap with enough liquidity
//!    delivers exactly the requested amount, also across tick crossings.
//! 4. **Round trip**: selling the output of a swap back never returns more
//!    than the original input.
//! 5. **Tick bookkeeping**: ticks and bitmap stay in sync through mints
//!    and burns, and no tick exceeds the per-tick liquidity cap.
//! 6. **Solvency**: after arbitrary swaps, every position can burn and
//!    collect in full and the protocol fees remain covered.

use alloy_primitives::{I256, U256};
use proptest::prelude::*;

use super::tests::{initialized_pool, range, POOL, TOKEN0, TOKEN1};
use super::Pool;
use crate::domain::{Address, CollectParams, MintParams, PositionKey, SwapParams, TickRange};
use crate::error::AmmError;
use crate::math::{MAX_TICK, MIN_TICK, Q96};
use crate::memory::MemoryHost;
use crate::traits::{Host, PaymentCallback};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const LP: Address = Address::repeat_byte(0x77);
const SPACING: i32 = 60;

/// Pays exactly what the pool asks for.
struct Payer;

impl PaymentCallback<MemoryHost> for Payer {
    fn mint_callback(
        &mut self,
        pool: &mut Pool,
        host: &mut MemoryHost,
        amount0_owed: U256,
        amount1_owed: U256,
        _data: &[u8],
    ) -> Result<(), AmmError> {
        let to = pool.immutables().address;
        host.transfer(TOKEN0, LP, to, amount0_owed)?;
        host.transfer(TOKEN1, LP, to, amount1_owed)?;
        Ok(())
    }

    fn swap_callback(
        &mut self,
        pool: &mut Pool,
        host: &mut MemoryHost,
        amount0_delta: I256,
        amount1_delta: I256,
        _data: &[u8],
    ) -> Result<(), AmmError> {
        let to = pool.immutables().address;
        if amount0_delta.is_positive() {
            host.transfer(TOKEN0, LP, to, amount0_delta.unsigned_abs())?;
        }
        if amount1_delta.is_positive() {
            host.transfer(TOKEN1, LP, to, amount1_delta.unsigned_abs())?;
        }
        Ok(())
    }

    fn flash_callback(
        &mut self,
        _pool: &mut Pool,
        _host: &mut MemoryHost,
        _fee0: U256,
        _fee1: U256,
        _data: &[u8],
    ) -> Result<(), AmmError> {
        Ok(())
    }
}

fn funded_host() -> MemoryHost {
    let mut host = MemoryHost::new(1_000);
    host.mint(TOKEN0, LP, U256::from(u128::MAX));
    host.mint(TOKEN1, LP, U256::from(u128::MAX));
    host
}

fn full_range() -> TickRange {
    range(MIN_TICK / SPACING * SPACING, MAX_TICK / SPACING * SPACING)
}

fn mint(pool: &mut Pool, host: &mut MemoryHost, r: TickRange, liquidity: u128) -> (U256, U256) {
    let Ok(amounts) = pool.mint(host, &mut Payer, MintParams::new(LP, r, liquidity), &[]) else {
        panic!("mint failed");
    };
    amounts
}

fn swap(pool: &mut Pool, host: &mut MemoryHost, zero_for_one: bool, amount_in: u128) -> Option<I256> {
    let Ok(params) = SwapParams::exact_input(LP, zero_for_one, U256::from(amount_in)) else {
        return None;
    };
    let delta = pool.swap(host, &mut Payer, params, &[]).ok()?;
    Some(if zero_for_one {
        delta.amount1
    } else {
        delta.amount0
    })
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Spacing-aligned ranges within ten spacings of the price.
fn range_strategy() -> impl Strategy<Value = TickRange> {
    (-10i32..10, 1i32..=10).prop_map(|(lower, width)| {
        range(lower * SPACING, (lower + width) * SPACING)
    })
}

fn liquidity_strategy() -> impl Strategy<Value = u128> {
    1_000u128..=1_000_000_000_000u128
}

fn swap_strategy() -> impl Strategy<Value = (bool, u128)> {
    (any::<bool>(), 1u128..=1_000_000_000u128)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_burn_never_returns_more_than_minted(
        r in range_strategy(),
        liquidity in liquidity_strategy(),
    ) {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        let (paid0, paid1) = mint(&mut pool, &mut host, r, liquidity);
        let Ok((out0, out1)) = pool.burn(&mut host, LP, r, liquidity) else {
            panic!("burn failed");
        };
        prop_assert!(out0 <= paid0, "token0: burned {} > minted {}", out0, paid0);
        prop_assert!(out1 <= paid1, "token1: burned {} > minted {}", out1, paid1);
    }

    #[test]
    fn prop_exact_input_is_consumed_exactly(
        liquidity in 1_000_000_000_000u128..=1_000_000_000_000_000u128,
        (zero_for_one, amount_in) in swap_strategy(),
    ) {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        mint(&mut pool, &mut host, full_range(), liquidity);
        let Ok(params) = SwapParams::exact_input(LP, zero_for_one, U256::from(amount_in)) else {
            panic!("valid params");
        };
        let Ok(delta) = pool.swap(&mut host, &mut Payer, params, &[]) else {
            panic!("swap failed");
        };
        let input = if zero_for_one { delta.amount0 } else { delta.amount1 };
        let output = if zero_for_one { delta.amount1 } else { delta.amount0 };
        prop_assert_eq!(input, I256::from_raw(U256::from(amount_in)));
        prop_assert!(!output.is_positive());
    }

    #[test]
    fn prop_exact_output_is_delivered_exactly_across_ticks(
        full_liquidity in 100_000_000_000u128..=1_000_000_000_000u128,
        extra in prop::collection::vec(
            (range_strategy(), 1_000_000_000u128..=100_000_000_000u128),
            0..4,
        ),
        zero_for_one in any::<bool>(),
        amount_out in 20_000_000_000u128..=50_000_000_000u128,
    ) {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        mint(&mut pool, &mut host, full_range(), full_liquidity);
        mint(&mut pool, &mut host, range(-SPACING, SPACING), 10_000_000_000);
        for (r, liquidity) in extra {
            mint(&mut pool, &mut host, r, liquidity);
        }

        let Ok(params) = SwapParams::exact_output(LP, zero_for_one, U256::from(amount_out)) else {
            panic!("valid params");
        };
        let Ok(delta) = pool.swap(&mut host, &mut Payer, params, &[]) else {
            panic!("swap failed");
        };
        let input = if zero_for_one { delta.amount0 } else { delta.amount1 };
        let output = if zero_for_one { delta.amount1 } else { delta.amount0 };
        prop_assert_eq!(output, -I256::from_raw(U256::from(amount_out)));
        prop_assert!(input.is_positive());
        // the narrow position's bound was crossed on the way
        if zero_for_one {
            prop_assert!(pool.slot().tick < -SPACING, "tick {}", pool.slot().tick);
        } else {
            prop_assert!(pool.slot().tick >= SPACING, "tick {}", pool.slot().tick);
        }
    }

    #[test]
    fn prop_round_trip_loses_value(
        liquidity in 1_000_000_000_000u128..=1_000_000_000_000_000u128,
        (zero_for_one, amount_in) in swap_strategy(),
    ) {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        mint(&mut pool, &mut host, full_range(), liquidity);
        let Some(received) = swap(&mut pool, &mut host, zero_for_one, amount_in) else {
            return Ok(());
        };
        let received = received.unsigned_abs();
        if received.is_zero() {
            return Ok(());
        }
        let Ok(received) = u128::try_from(received) else {
            return Ok(());
        };
        let Some(back) = swap(&mut pool, &mut host, !zero_for_one, received) else {
            return Ok(());
        };
        prop_assert!(
            back.unsigned_abs() <= U256::from(amount_in),
            "round trip returned {} for {}",
            back, amount_in
        );
    }

    #[test]
    fn prop_ticks_and_bitmap_stay_in_sync(
        ops in prop::collection::vec((range_strategy(), liquidity_strategy(), any::<bool>()), 1..12),
    ) {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        for (r, liquidity, burn) in ops {
            mint(&mut pool, &mut host, r, liquidity);
            if burn {
                let Ok(_) = pool.burn(&mut host, LP, r, liquidity) else {
                    panic!("burn failed");
                };
            }
        }

        let cap = pool.immutables().max_liquidity_per_tick;
        for (tick, info) in pool.ticks().iter() {
            prop_assert!(info.initialized);
            prop_assert!(info.liquidity_gross > 0);
            prop_assert!(info.liquidity_gross <= cap);
            let Ok(flipped) = pool.tick_bitmap().is_initialized(tick, SPACING) else {
                panic!("aligned tick");
            };
            prop_assert!(flipped, "tick {} missing from bitmap", tick);
        }
        for tick in (-20..=20).map(|i| i * SPACING) {
            let Ok(flipped) = pool.tick_bitmap().is_initialized(tick, SPACING) else {
                panic!("aligned tick");
            };
            prop_assert_eq!(flipped, pool.tick(tick).is_some(), "tick {}", tick);
        }
    }

    #[test]
    fn prop_positions_stay_collectable(
        positions in prop::collection::vec((range_strategy(), liquidity_strategy()), 1..4),
        swaps in prop::collection::vec(swap_strategy(), 1..8),
        fee_protocol in prop_oneof![Just(0u8), 4u8..=10],
    ) {
        let mut host = funded_host();
        let mut pool = initialized_pool(&host, Q96);
        pool.slot.fee_protocol = fee_protocol + (fee_protocol << 4);
        for &(r, liquidity) in &positions {
            mint(&mut pool, &mut host, r, liquidity);
        }
        for (zero_for_one, amount_in) in swaps {
            let _ = swap(&mut pool, &mut host, zero_for_one, amount_in);
        }

        for &(r, _) in &positions {
            let Some(info) = pool.position(&PositionKey::new(LP, r)) else {
                panic!("position exists");
            };
            let liquidity = info.liquidity;
            if liquidity > 0 {
                let Ok(_) = pool.burn(&mut host, LP, r, liquidity) else {
                    panic!("burn failed");
                };
            }
            let collected = pool.collect(&mut host, LP, CollectParams::all(LP, r));
            prop_assert!(collected.is_ok(), "collect failed: {:?}", collected);
        }

        let fees = pool.protocol_fees();
        prop_assert!(host.balance_of(TOKEN0, POOL) >= U256::from(fees.token0));
        prop_assert!(host.balance_of(TOKEN1, POOL) >= U256::from(fees.token1));
        prop_assert_eq!(pool.liquidity(), 0);
    }
}

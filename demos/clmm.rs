//! Concentrated liquidity walkthrough (Uniswap v3 style).
//!
//! Creates a pool through the factory, provides liquidity in two ranges,
//! swaps across a range boundary, reads the TWAP oracle, then burns and
//! collects a position.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=hydra_clmm=info cargo run --example clmm
//! ```

use alloy_primitives::{I256, U256};
use tracing_subscriber::EnvFilter;

use hydra_clmm::config::PoolConfig;
use hydra_clmm::domain::{
    Address, CollectParams, FeeTier, MintParams, SwapParams, TickRange, TokenPair,
};
use hydra_clmm::error::AmmError;
use hydra_clmm::factory::PoolFactory;
use hydra_clmm::math::{price_from_sqrt_price, Q96};
use hydra_clmm::memory::MemoryHost;
use hydra_clmm::pool::Pool;
use hydra_clmm::state::arithmetic_mean_tick;
use hydra_clmm::traits::{Host, PaymentCallback};

const TRADER: Address = Address::repeat_byte(0x77);

/// Settles every payment from [`TRADER`]'s balance.
struct Wallet;

impl PaymentCallback<MemoryHost> for Wallet {
    fn mint_callback(
        &mut self,
        pool: &mut Pool,
        host: &mut MemoryHost,
        amount0_owed: U256,
        amount1_owed: U256,
        _data: &[u8],
    ) -> Result<(), AmmError> {
        let pool_address = pool.immutables().address;
        host.transfer(pool.immutables().token0(), TRADER, pool_address, amount0_owed)?;
        host.transfer(pool.immutables().token1(), TRADER, pool_address, amount1_owed)?;
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
        let pool_address = pool.immutables().address;
        if amount0_delta.is_positive() {
            let token = pool.immutables().token0();
            host.transfer(token, TRADER, pool_address, amount0_delta.unsigned_abs())?;
        }
        if amount1_delta.is_positive() {
            let token = pool.immutables().token1();
            host.transfer(token, TRADER, pool_address, amount1_delta.unsigned_abs())?;
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
        Err(AmmError::InsufficientPayment("wallet does not take flash loans"))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Concentrated Liquidity Pool ===\n");

    // ── 1. Fund a trader ────────────────────────────────────────────────
    let usdc = Address::repeat_byte(1);
    let weth = Address::repeat_byte(2);
    let mut host = MemoryHost::new(1_700_000_000);
    host.mint(usdc, TRADER, U256::from(10_000_000_000u64));
    host.mint(weth, TRADER, U256::from(10_000_000_000u64));

    // ── 2. Create and initialize the pool ───────────────────────────────
    let mut factory = PoolFactory::new(Address::repeat_byte(0xaa));
    let pair = TokenPair::new(usdc, weth)?;
    let config = PoolConfig::new(Address::repeat_byte(0xee), pair, FeeTier::MEDIUM, 60)?;
    let mut pool = factory.create_pool(&config)?;
    pool.initialize(&host, Q96)?;
    pool.increase_observation_cardinality_next(&mut host, 16)?;

    println!("Pool {}", pool.immutables().address);
    println!("  Fee:           {} pips", pool.immutables().fee.pips());
    println!("  Tick spacing:  {}", pool.immutables().tick_spacing);
    println!("  Start tick:    {}", pool.slot().tick);

    // ── 3. Provide liquidity in a narrow and a wide range ───────────────
    let narrow = TickRange::new(-120, 120)?;
    let wide = TickRange::new(-3_000, 3_000)?;
    let (n0, n1) = pool.mint(&mut host, &mut Wallet, MintParams::new(TRADER, narrow, 50_000_000), &[])?;
    let (w0, w1) = pool.mint(&mut host, &mut Wallet, MintParams::new(TRADER, wide, 10_000_000), &[])?;
    println!("\n--- Mint ---");
    println!("  Narrow {narrow}: paid {n0} / {n1}");
    println!("  Wide   {wide}: paid {w0} / {w1}");
    println!("  Active liquidity: {}", pool.liquidity());

    // ── 4. Swap through the narrow range's lower bound ──────────────────
    host.advance(60);
    let params = SwapParams::exact_input(TRADER, true, U256::from(1_000_000u32))?;
    let delta = pool.swap(&mut host, &mut Wallet, params, &[])?;
    println!("\n--- Swap: sell 1 000 000 token0 ---");
    println!("  Delta:            {delta}");
    println!("  Tick after:       {}", pool.slot().tick);
    println!(
        "  Price after:      {:.6}",
        price_from_sqrt_price(pool.slot().sqrt_price_x96)
    );
    println!("  Active liquidity: {}", pool.liquidity());

    // ── 5. Read the oracle ──────────────────────────────────────────────
    host.advance(60);
    let (tick_cumulatives, _) = pool.observe(&host, &[60, 0])?;
    if let (Some(&start), Some(&end)) = (tick_cumulatives.first(), tick_cumulatives.last()) {
        println!("\n--- Oracle ---");
        println!("  TWAP tick over the last minute: {}", arithmetic_mean_tick(start, end, 60)?);
    }

    // ── 6. Burn and collect the wide position ───────────────────────────
    let (b0, b1) = pool.burn(&mut host, TRADER, wide, 10_000_000)?;
    let (c0, c1) = pool.collect(&mut host, TRADER, CollectParams::all(TRADER, wide))?;
    println!("\n--- Burn + Collect (wide) ---");
    println!("  Principal released: {b0} / {b1}");
    println!("  Collected:          {c0} / {c1}");
    println!(
        "  Trader balances:    {} / {}",
        host.balance_of(usdc, TRADER),
        host.balance_of(weth, TRADER)
    );

    println!("\n=== Done ===");
    Ok(())
}

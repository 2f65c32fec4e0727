//! # Hydra CLMM
//!
//! Concentrated-liquidity AMM engine: liquidity providers deposit into
//! price ranges, swaps walk across initialized ticks, fees accrue per unit
//! of in-range liquidity, and a ring-buffer oracle records time-weighted
//! tick and liquidity accumulators.
//!
//! All state-changing arithmetic is integer-only: Q64.96 sqrt-prices,
//! Q128.128 fee-growth accumulators and 128-bit liquidity, built on
//! [`alloy_primitives`] 256-bit integers.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | no | `Serialize`/`Deserialize` on value and state types |
//!
//! # Quick Start
//!
//! A pool never moves assets itself. It reads balances and sends payouts
//! through a [`Host`](traits::Host) ledger, and collects payment by
//! invoking a [`PaymentCallback`](traits::PaymentCallback) and checking
//! its balance afterwards.
//!
//! ```rust
//! use hydra_clmm::prelude::*;
//! use hydra_clmm::math::Q96;
//! use alloy_primitives::{I256, U256};
//!
//! const LP: Address = Address::repeat_byte(0x77);
//!
//! struct Payer;
//!
//! impl PaymentCallback<MemoryHost> for Payer {
//!     fn mint_callback(
//!         &mut self,
//!         pool: &mut Pool,
//!         host: &mut MemoryHost,
//!         amount0: U256,
//!         amount1: U256,
//!         _data: &[u8],
//!     ) -> Result<()> {
//!         let to = pool.immutables().address;
//!         host.transfer(pool.immutables().token0(), LP, to, amount0)?;
//!         host.transfer(pool.immutables().token1(), LP, to, amount1)?;
//!         Ok(())
//!     }
//!
//!     fn swap_callback(
//!         &mut self,
//!         pool: &mut Pool,
//!         host: &mut MemoryHost,
//!         amount0: I256,
//!         amount1: I256,
//!         _data: &[u8],
//!     ) -> Result<()> {
//!         let to = pool.immutables().address;
//!         if amount0.is_positive() {
//!             host.transfer(pool.immutables().token0(), LP, to, amount0.unsigned_abs())?;
//!         }
//!         if amount1.is_positive() {
//!             host.transfer(pool.immutables().token1(), LP, to, amount1.unsigned_abs())?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn flash_callback(
//!         &mut self,
//!         _pool: &mut Pool,
//!         _host: &mut MemoryHost,
//!         _fee0: U256,
//!         _fee1: U256,
//!         _data: &[u8],
//!     ) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let token0 = Address::repeat_byte(1);
//! let token1 = Address::repeat_byte(2);
//! let mut host = MemoryHost::new(1_000);
//! host.mint(token0, LP, U256::from(1_000_000u32));
//! host.mint(token1, LP, U256::from(1_000_000u32));
//!
//! // 1. Register and initialize a 0.3% pool at price 1.0
//! let mut factory = PoolFactory::new(Address::repeat_byte(0xaa));
//! let pair = TokenPair::new(token0, token1).expect("distinct tokens");
//! let config = PoolConfig::new(Address::repeat_byte(0xee), pair, FeeTier::MEDIUM, 60)
//!     .expect("valid config");
//! let mut pool = factory.create_pool(&config).expect("pool created");
//! pool.initialize(&host, Q96).expect("initialized");
//!
//! // 2. Provide liquidity around the current price
//! let range = TickRange::new(-600, 600).expect("valid range");
//! let (paid0, paid1) = pool
//!     .mint(&mut host, &mut Payer, MintParams::new(LP, range, 100_000), &[])
//!     .expect("minted");
//! assert!(!paid0.is_zero() && !paid1.is_zero());
//!
//! // 3. Sell 1 000 units of token0
//! let params = SwapParams::exact_input(LP, true, U256::from(1_000u32)).expect("valid amount");
//! let delta = pool.swap(&mut host, &mut Payer, params, &[]).expect("swapped");
//! assert_eq!(delta.amount0, I256::from_raw(U256::from(1_000u32)));
//! assert!(delta.amount1.is_negative());
//! assert!(pool.slot().tick < 0);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  PoolFactory │  fee tiers, owner, pool registry
//! └──────┬───────┘
//!        │ create_pool(&PoolConfig)
//!        ▼
//! ┌──────────────┐      Host: balances, transfers, time
//! │     Pool     │◄───► PaymentCallback: pays for mint / swap / flash
//! └──────┬───────┘
//!        │ ticks, bitmap, positions, oracle
//!        ▼
//! ┌──────────────┐
//! │    State     │  per-tick records, fee accounting, observations
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │     Math     │  Q64.96 prices, 512-bit mul-div, swap steps
//! └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Address`](domain::Address), [`FeeTier`](domain::FeeTier), [`TickRange`](domain::TickRange), operation parameters |
//! | [`math`]   | Tick math, sqrt-price math, swap steps, full-precision mul-div |
//! | [`state`]  | Ticks, tick bitmap, positions, oracle, slot |
//! | [`pool`]   | [`Pool`](pool::Pool): initialize, mint, burn, collect, swap, flash, admin |
//! | [`traits`] | Host, payment callback and owner-authority seams |
//! | [`config`] | [`PoolConfig`](config::PoolConfig) validated construction parameters |
//! | [`factory`] | [`PoolFactory`](factory::PoolFactory) tier registry and pool creation |
//! | [`memory`] | [`MemoryHost`](memory::MemoryHost) in-memory ledger |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod math;
pub mod memory;
pub mod pool;
pub mod prelude;
pub mod state;
pub mod traits;

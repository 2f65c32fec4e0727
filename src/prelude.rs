//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hydra_clmm::prelude::*;
//! ```

pub use crate::domain::{
    Address, BalanceDelta, CollectParams, FeeTier, FlashParams, MintParams, PositionKey,
    Rounding, SwapKind, SwapParams, TickRange, TokenPair,
};

pub use crate::traits::{FromConfig, Host, OwnerAuthority, PaymentCallback};

pub use crate::config::PoolConfig;

pub use crate::error::{AmmError, Result};

pub use crate::factory::PoolFactory;

pub use crate::memory::MemoryHost;

pub use crate::pool::Pool;

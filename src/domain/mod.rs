//! Value types shared by the pool engine.
//!
//! Addresses, the ordered token pair, fee tiers, tick ranges, position
//! keys and the parameter/result structs of the pool entry points. Types
//! with invariants expose validated constructors.

mod address;
mod balance_delta;
mod fee_tier;
mod position;
mod position_params;
mod rounding;
mod swap_params;
mod tick;
mod token_pair;

pub use address::Address;
pub use balance_delta::BalanceDelta;
pub use fee_tier::{FeeTier, FEE_DENOMINATOR};
pub use position::PositionKey;
pub use position_params::{CollectParams, FlashParams, MintParams};
pub use rounding::Rounding;
pub use swap_params::{SwapKind, SwapParams};
pub use tick::{RangePosition, TickRange};
pub use token_pair::TokenPair;

//! Storage structures owned by a pool.
//!
//! - [`Ticks`] and [`TickBitmap`]: the sparse tick index. The bitmap bit
//!   for a tick is set exactly when its record has non-zero gross
//!   liquidity; the two are only changed together.
//! - [`Positions`]: the position ledger.
//! - [`Oracle`]: the observation ring buffer.
//! - [`Slot`] and [`ProtocolFees`]: the hot state.

mod oracle;
mod position;
mod slot;
mod tick;
mod tick_bitmap;

pub use oracle::{arithmetic_mean_tick, lte, Observation, ObserveContext, Oracle};
pub use position::{PositionInfo, Positions};
pub use slot::{ProtocolFees, Slot};
pub use tick::{max_liquidity_per_tick, Accumulators, TickInfo, Ticks};
pub use tick_bitmap::TickBitmap;

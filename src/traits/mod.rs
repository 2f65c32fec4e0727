//! Seams between a pool and the world around it.
//!
//! - [`Host`]: block time and the asset ledger.
//! - [`PaymentCallback`]: the counterparty that pays for mints, swaps
//!   and flash loans.
//! - [`OwnerAuthority`]: who may run administrative operations.
//! - [`FromConfig`]: construction from a validated configuration.

mod authority;
mod callback;
mod from_config;
mod host;

pub use authority::OwnerAuthority;
pub use callback::PaymentCallback;
pub use from_config::FromConfig;
pub use host::{safe_transfer, Host};

//! Unified error types for the Hydra CLMM engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type, ensuring a consistent error handling experience for consumers.
//! Every failure aborts the whole operation: the pool rolls back any state
//! it touched before the error surfaces, so callers never observe partial
//! effects.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Every failure the engine can report.
///
/// Variants carrying a `&'static str` include a short, stable context
/// string describing which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AmmError {
    // -- Preconditions ------------------------------------------------------
    /// Tick index outside the valid range or not aligned to tick spacing.
    #[error("invalid tick: {0}")]
    InvalidTick(&'static str),

    /// Lower/upper tick pair is unordered or outside bounds.
    #[error("invalid tick range: {0}")]
    InvalidTickRange(&'static str),

    /// A sqrt-price outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    /// Swap price limit on the wrong side of the current price or outside
    /// the global bounds.
    #[error("invalid price limit: {0}")]
    InvalidPriceLimit(&'static str),

    /// A zero or otherwise unusable quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// Fee rate outside the supported range.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// Pool or factory parameter outside the supported range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Token pair is degenerate (same asset twice).
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// `initialize` called on a pool that already has a price.
    #[error("pool already initialized")]
    AlreadyInitialized,

    /// Operation requires an initialized pool.
    #[error("pool not initialized")]
    NotInitialized,

    /// Operation requires in-range liquidity (flash loans).
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    // -- Lock ---------------------------------------------------------------
    /// The pool is busy executing another operation (reentrancy).
    #[error("pool is locked")]
    Locked,

    // -- Access control -----------------------------------------------------
    /// Administrative operation invoked by someone other than the owner.
    #[error("caller is not the owner")]
    Unauthorized,

    // -- Arithmetic safety --------------------------------------------------
    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A tick's gross liquidity would exceed `max_liquidity_per_tick`.
    #[error("tick liquidity exceeds the per-tick maximum")]
    TickLiquidityOverflow,

    /// Zero-delta update on a position that holds no liquidity.
    #[error("cannot poke a position with zero liquidity")]
    NoLiquidityToPoke,

    // -- Payment verification -----------------------------------------------
    /// Balance delta after the payment callback is short of what is owed.
    #[error("insufficient payment: {0}")]
    InsufficientPayment(&'static str),

    /// An asset transfer reported failure.
    #[error("asset transfer failed")]
    TransferFailed,

    // -- Factory ------------------------------------------------------------
    /// A pool for this pair and fee tier is already registered.
    #[error("pool already exists")]
    PoolAlreadyExists,

    // -- Oracle -------------------------------------------------------------
    /// Requested timestamp predates the oldest retained observation.
    #[error("requested observation is older than the oldest retained one")]
    ObservationTooOld,

    /// Oracle has not been initialized.
    #[error("oracle not initialized")]
    OracleNotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let e = AmmError::InsufficientPayment("IIA");
        assert_eq!(e.to_string(), "insufficient payment: IIA");
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(AmmError::Locked, AmmError::Locked);
        assert_ne!(AmmError::Locked, AmmError::NotInitialized);
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&AmmError::DivisionByZero);
    }
}

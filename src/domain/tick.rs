//! Validated tick ranges for concentrated liquidity positions.

use core::fmt;

use crate::error::AmmError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};

/// A half-open price range `[lower, upper)` expressed in ticks.
///
/// # Invariants
///
/// - `lower < upper`
/// - `lower >= MIN_TICK` and `upper <= MAX_TICK`
///
/// Tick-spacing alignment is a pool property and is checked by the tick
/// bitmap when the bounds are first initialized.
///
/// # Examples
///
/// ```
/// use hydra_clmm::domain::TickRange;
///
/// let range = TickRange::new(-60, 60).expect("ordered and in bounds");
/// assert!(range.contains(0));
/// assert!(!range.contains(60));
/// assert!(TickRange::new(60, -60).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRange {
    lower: i32,
    upper: i32,
}

impl TickRange {
    /// Creates a validated tick range.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidTickRange`] if `lower >= upper`, if
    /// `lower < MIN_TICK`, or if `upper > MAX_TICK`.
    pub const fn new(lower: i32, upper: i32) -> crate::error::Result<Self> {
        if lower >= upper {
            return Err(AmmError::InvalidTickRange(
                "lower tick must be less than upper tick",
            ));
        }
        if lower < MIN_TICK {
            return Err(AmmError::InvalidTickRange("lower tick below MIN_TICK"));
        }
        if upper > MAX_TICK {
            return Err(AmmError::InvalidTickRange("upper tick above MAX_TICK"));
        }
        Ok(Self { lower, upper })
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub const fn lower(&self) -> i32 {
        self.lower
    }

    /// Upper bound (exclusive).
    #[must_use]
    pub const fn upper(&self) -> i32 {
        self.upper
    }

    /// Returns `true` if `tick` is inside `[lower, upper)`.
    #[must_use]
    pub const fn contains(&self, tick: i32) -> bool {
        tick >= self.lower && tick < self.upper
    }

    /// Where `tick` sits relative to the range.
    #[must_use]
    pub const fn locate(&self, tick: i32) -> RangePosition {
        if tick < self.lower {
            RangePosition::Below
        } else if tick < self.upper {
            RangePosition::Inside
        } else {
            RangePosition::Above
        }
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}

/// Position of the current tick relative to a [`TickRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangePosition {
    /// Current tick is below the range: only token0 is held.
    Below,
    /// Current tick is inside the range: both tokens are held.
    Inside,
    /// Current tick is at or above the upper bound: only token1 is held.
    Above,
}

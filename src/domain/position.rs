//! Content-addressed key of a liquidity position.

use core::fmt;

use super::{Address, TickRange};

/// Identifies a position by `(owner, lower tick, upper tick)`.
///
/// Two mints by the same owner into the same range accumulate into one
/// position; there is no sequential id.
///
/// # Examples
///
/// ```
/// use hydra_clmm::domain::{Address, PositionKey, TickRange};
///
/// let owner = Address::repeat_byte(9);
/// let range = TickRange::new(-60, 60).expect("valid range");
/// let key = PositionKey::new(owner, range);
/// assert_eq!(key.tick_lower(), -60);
/// assert_eq!(key, PositionKey::new(owner, range));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionKey {
    owner: Address,
    range: TickRange,
}

impl PositionKey {
    /// Creates a key for `owner` over `range`.
    #[must_use]
    pub const fn new(owner: Address, range: TickRange) -> Self {
        Self { owner, range }
    }

    /// The position owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// The position's tick range.
    #[must_use]
    pub const fn range(&self) -> TickRange {
        self.range
    }

    /// Lower tick bound.
    #[must_use]
    pub const fn tick_lower(&self) -> i32 {
        self.range.lower()
    }

    /// Upper tick bound.
    #[must_use]
    pub const fn tick_upper(&self) -> i32 {
        self.range.upper()
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({} {})", self.owner, self.range)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn range(lower: i32, upper: i32) -> TickRange {
        let Ok(r) = TickRange::new(lower, upper) else {
            panic!("valid range expected");
        };
        r
    }

    #[test]
    fn keys_differ_by_owner_and_range() {
        let a = PositionKey::new(Address::repeat_byte(1), range(-60, 60));
        let b = PositionKey::new(Address::repeat_byte(2), range(-60, 60));
        let c = PositionKey::new(Address::repeat_byte(1), range(-120, 60));
        let set: HashSet<_> = [a, b, c, a].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn accessors() {
        let key = PositionKey::new(Address::repeat_byte(1), range(-120, 240));
        assert_eq!(key.owner(), Address::repeat_byte(1));
        assert_eq!(key.tick_lower(), -120);
        assert_eq!(key.tick_upper(), 240);
        assert_eq!(key.range(), range(-120, 240));
    }
}

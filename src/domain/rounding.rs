//! Rounding direction for fixed-point arithmetic.

/// Which way a lossy division rounds.
///
/// Every rounding decision in the engine favours the pool: amounts the
/// pool receives round [`Up`](Self::Up), amounts it pays out round
/// [`Down`](Self::Down).
///
/// # Examples
///
/// ```
/// use hydra_clmm::domain::Rounding;
///
/// assert_eq!(Rounding::from_up(true), Rounding::Up);
/// assert!(Rounding::Down.is_down());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Towards positive infinity.
    Up,
    /// Towards zero.
    Down,
}

impl Rounding {
    /// Maps a `round_up` flag to a direction.
    #[must_use]
    pub const fn from_up(round_up: bool) -> Self {
        if round_up {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flag() {
        assert_eq!(Rounding::from_up(true), Rounding::Up);
        assert_eq!(Rounding::from_up(false), Rounding::Down);
    }

    #[test]
    fn predicates() {
        assert!(Rounding::Up.is_up());
        assert!(!Rounding::Up.is_down());
        assert!(Rounding::Down.is_down());
    }
}

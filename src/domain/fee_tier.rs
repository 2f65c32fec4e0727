//! Swap fee rates expressed in pips (hundredths of a basis point).

use core::fmt;

use crate::error::AmmError;

/// Denominator for pip-denominated fees: `1_000_000` pips = 100%.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// A swap fee rate in pips.
///
/// `3000` pips is `0.30%`. Any value strictly below
/// [`FEE_DENOMINATOR`] is accepted; [`is_standard`](Self::is_standard)
/// tells whether it matches one of the well-known tiers, and
/// [`default_tick_spacing`](Self::default_tick_spacing) returns the
/// conventional spacing for those tiers.
///
/// # Examples
///
/// ```
/// use hydra_clmm::domain::FeeTier;
///
/// let tier = FeeTier::MEDIUM;
/// assert_eq!(tier.pips(), 3_000);
/// assert_eq!(tier.default_tick_spacing(), Some(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeTier(u32);

impl FeeTier {
    /// 0.01% (1 bp), tick spacing 1.
    pub const LOWEST: Self = Self(100);

    /// 0.05% (5 bp), tick spacing 10.
    pub const LOW: Self = Self(500);

    /// 0.30% (30 bp), tick spacing 60.
    pub const MEDIUM: Self = Self(3_000);

    /// 1.00% (100 bp), tick spacing 200.
    pub const HIGH: Self = Self(10_000);

    /// Creates a fee tier from a pip value.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if `pips >= 1_000_000`.
    pub const fn new(pips: u32) -> crate::error::Result<Self> {
        if pips >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee("fee must be below 1_000_000 pips"));
        }
        Ok(Self(pips))
    }

    /// Returns the fee in pips.
    #[must_use]
    pub const fn pips(&self) -> u32 {
        self.0
    }

    /// Returns `true` for one of the four standard presets.
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        matches!(self.0, 100 | 500 | 3_000 | 10_000)
    }

    /// Conventional tick spacing for the standard presets.
    #[must_use]
    pub const fn default_tick_spacing(&self) -> Option<i32> {
        match self.0 {
            100 => Some(1),
            500 => Some(10),
            3_000 => Some(60),
            10_000 => Some(200),
            _ => None,
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}%", self.0 / 10_000, self.0 % 10_000)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(FeeTier::LOWEST.pips(), 100);
        assert_eq!(FeeTier::LOW.pips(), 500);
        assert_eq!(FeeTier::MEDIUM.pips(), 3_000);
        assert_eq!(FeeTier::HIGH.pips(), 10_000);
        assert!(FeeTier::MEDIUM.is_standard());
    }

    #[test]
    fn rejects_full_fee() {
        let Err(e) = FeeTier::new(1_000_000) else {
            panic!("expected Err");
        };
        assert_eq!(e, AmmError::InvalidFee("fee must be below 1_000_000 pips"));
        assert!(FeeTier::new(999_999).is_ok());
    }

    #[test]
    fn non_standard_has_no_default_spacing() {
        let Ok(tier) = FeeTier::new(42) else {
            panic!("expected Ok");
        };
        assert!(!tier.is_standard());
        assert_eq!(tier.default_tick_spacing(), None);
    }

    #[test]
    fn display_as_percent() {
        assert_eq!(FeeTier::MEDIUM.to_string(), "0.3000%");
        assert_eq!(FeeTier::HIGH.to_string(), "1.0000%");
    }
}

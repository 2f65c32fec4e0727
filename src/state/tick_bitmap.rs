//! Packed bitmap of initialized ticks.
//!
//! Tick indices are first compressed by the pool's tick spacing, then
//! split into a 16-bit word position and an 8-bit bit position. A swap
//! looks for the next initialized tick one 256-bit word at a time, which
//! bounds the work per step regardless of how sparse liquidity is.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::error::AmmError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};

/// One bit per spacing-compressed tick, grouped in 256-bit words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickBitmap {
    words: BTreeMap<i16, U256>,
}

/// Splits a compressed tick into `(word, bit)`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, (compressed & 0xff) as u8)
}

/// `tick / spacing`, rounded towards negative infinity.
#[inline]
fn compress(tick: i32, tick_spacing: i32) -> i32 {
    let compressed = tick / tick_spacing;
    if tick < 0 && tick % tick_spacing != 0 {
        compressed - 1
    } else {
        compressed
    }
}

fn ensure_spacing(tick_spacing: i32) -> Result<(), AmmError> {
    if tick_spacing <= 0 {
        return Err(AmmError::InvalidConfiguration(
            "tick spacing must be positive",
        ));
    }
    Ok(())
}

impl TickBitmap {
    /// Creates an empty bitmap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw 256-bit word at `word_pos`; zero if never touched.
    #[must_use]
    pub fn word(&self, word_pos: i16) -> U256 {
        self.words.get(&word_pos).copied().unwrap_or_default()
    }

    /// Returns `true` if the bit for `tick` is set.
    ///
    /// # Errors
    ///
    /// Same as [`flip_tick`](Self::flip_tick).
    pub fn is_initialized(&self, tick: i32, tick_spacing: i32) -> Result<bool, AmmError> {
        ensure_spacing(tick_spacing)?;
        if tick % tick_spacing != 0 {
            return Err(AmmError::InvalidTick("tick not aligned to tick spacing"));
        }
        let (word, bit) = position(tick / tick_spacing);
        Ok(self.word(word).bit(usize::from(bit)))
    }

    /// Word holding the bit of `tick`.
    pub(crate) fn word_position(tick: i32, tick_spacing: i32) -> i16 {
        position(compress(tick, tick_spacing)).0
    }

    /// Puts back a word saved before an aborted change.
    pub(crate) fn restore_word(&mut self, word_pos: i16, word: U256) {
        if word.is_zero() {
            self.words.remove(&word_pos);
        } else {
            self.words.insert(word_pos, word);
        }
    }

    /// Toggles the initialized bit of `tick`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if `tick_spacing <= 0`.
    /// - [`AmmError::InvalidTick`] if `tick` is not a multiple of
    ///   `tick_spacing`.
    pub fn flip_tick(&mut self, tick: i32, tick_spacing: i32) -> Result<(), AmmError> {
        ensure_spacing(tick_spacing)?;
        if tick % tick_spacing != 0 {
            return Err(AmmError::InvalidTick("tick not aligned to tick spacing"));
        }
        let (word, bit) = position(tick / tick_spacing);
        let mask = U256::from(1u8) << usize::from(bit);
        let entry = self.words.entry(word).or_default();
        *entry ^= mask;
        if entry.is_zero() {
            self.words.remove(&word);
        }
        Ok(())
    }

    /// Finds the next initialized tick in the same word as `tick`.
    ///
    /// With `lte` the search goes left and includes `tick` itself;
    /// otherwise it goes right starting strictly after `tick`. If no bit is
    /// set the word boundary in the search direction is returned with
    /// `false`, so callers can step word by word.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if `tick_spacing <= 0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydra_clmm::state::TickBitmap;
    ///
    /// let mut bitmap = TickBitmap::new();
    /// bitmap.flip_tick(-60, 60).expect("aligned");
    /// assert_eq!(bitmap.next_initialized_tick_within_one_word(-30, 60, true), Ok((-60, true)));
    /// assert_eq!(bitmap.next_initialized_tick_within_one_word(-60, 60, false), Ok((15_300, false)));
    /// ```
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> Result<(i32, bool), AmmError> {
        ensure_spacing(tick_spacing)?;
        let compressed = compress(tick, tick_spacing);
        let one = U256::from(1u8);

        if lte {
            let (word, bit) = position(compressed);
            let bit_mask = one << usize::from(bit);
            // bit and everything to its right
            let masked = self.word(word) & ((bit_mask - one) + bit_mask);
            if masked.is_zero() {
                Ok(((compressed - i32::from(bit)) * tick_spacing, false))
            } else {
                let msb = most_significant_bit(masked)?;
                Ok((
                    (compressed - i32::from(bit - msb)) * tick_spacing,
                    true,
                ))
            }
        } else {
            let (word, bit) = position(compressed + 1);
            // bit and everything to its left
            let masked = self.word(word) & !((one << usize::from(bit)) - one);
            if masked.is_zero() {
                Ok((
                    (compressed + 1 + i32::from(u8::MAX - bit)) * tick_spacing,
                    false,
                ))
            } else {
                let lsb = least_significant_bit(masked)?;
                Ok((
                    (compressed + 1 + i32::from(lsb - bit)) * tick_spacing,
                    true,
                ))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bitmap_with(ticks: &[i32], spacing: i32) -> TickBitmap {
        let mut bitmap = TickBitmap::new();
        for &t in ticks {
            let Ok(()) = bitmap.flip_tick(t, spacing) else {
                panic!("aligned tick {t}");
            };
        }
        bitmap
    }

    fn sample() -> TickBitmap {
        bitmap_with(&[-200, -55, -4, 70, 78, 84, 139, 240, 535], 1)
    }

    fn next(bitmap: &TickBitmap, tick: i32, lte: bool) -> (i32, bool) {
        let Ok(r) = bitmap.next_initialized_tick_within_one_word(tick, 1, lte) else {
            panic!("expected Ok");
        };
        r
    }

    // -- flip_tick ----------------------------------------------------------

    #[test]
    fn flip_sets_and_clears() {
        let mut bitmap = bitmap_with(&[-230], 1);
        assert_eq!(bitmap.is_initialized(-230, 1), Ok(true));
        assert_eq!(bitmap.is_initialized(-231, 1), Ok(false));
        assert_eq!(bitmap.is_initialized(-229, 1), Ok(false));
        assert_eq!(bitmap.is_initialized(-230 + 256, 1), Ok(false));
        let Ok(()) = bitmap.flip_tick(-230, 1) else {
            panic!("expected Ok");
        };
        assert_eq!(bitmap.is_initialized(-230, 1), Ok(false));
        assert_eq!(bitmap, TickBitmap::new());
    }

    #[test]
    fn flip_rejects_unaligned() {
        let mut bitmap = TickBitmap::new();
        assert_eq!(
            bitmap.flip_tick(61, 60),
            Err(AmmError::InvalidTick("tick not aligned to tick spacing"))
        );
        assert!(bitmap.flip_tick(60, 0).is_err());
    }

    #[test]
    fn words_are_split_by_compressed_tick() {
        let bitmap = bitmap_with(&[-1, 0, 255, 256], 1);
        assert_eq!(bitmap.word(-1), U256::from(1u8) << 255);
        assert_eq!(bitmap.word(0), U256::from(1u8) | (U256::from(1u8) << 255));
        assert_eq!(bitmap.word(1), U256::from(1u8));
    }

    // -- search right -------------------------------------------------------

    #[test]
    fn gt_returns_next_in_word() {
        let b = sample();
        assert_eq!(next(&b, 78, false), (84, true));
        assert_eq!(next(&b, -55, false), (-4, true));
        assert_eq!(next(&b, 77, false), (78, true));
        assert_eq!(next(&b, -56, false), (-55, true));
    }

    #[test]
    fn gt_stops_at_word_boundary() {
        let b = sample();
        assert_eq!(next(&b, 255, false), (511, false));
        assert_eq!(next(&b, 383, false), (511, false));
        assert_eq!(next(&b, 508, false), (511, false));
        assert_eq!(next(&b, -257, false), (-200, true));
    }

    // -- search left --------------------------------------------------------

    #[test]
    fn lte_includes_current() {
        let b = sample();
        assert_eq!(next(&b, 78, true), (78, true));
        assert_eq!(next(&b, 79, true), (78, true));
        assert_eq!(next(&b, 72, true), (70, true));
    }

    #[test]
    fn lte_stops_at_word_boundary() {
        let b = sample();
        assert_eq!(next(&b, 258, true), (256, false));
        assert_eq!(next(&b, 256, true), (256, false));
        assert_eq!(next(&b, 329, true), (256, false));
        assert_eq!(next(&b, 900, true), (768, false));
        assert_eq!(next(&b, 1023, true), (768, false));
        assert_eq!(next(&b, -257, true), (-512, false));
    }

    #[test]
    fn negative_unaligned_ticks_round_down() {
        let b = bitmap_with(&[-120], 60);
        // -61 compresses to -2, the word containing -120
        assert_eq!(b.next_initialized_tick_within_one_word(-61, 60, true), Ok((-120, true)));
        assert_eq!(b.next_initialized_tick_within_one_word(-121, 60, false), Ok((-120, true)));
    }

    proptest! {
        #[test]
        fn search_stays_within_one_word(tick in -887_272i32..887_272, lte: bool, spacing in 1i32..200) {
            let b = bitmap_with(&[], spacing);
            let Ok((found, initialized)) = b.next_initialized_tick_within_one_word(tick, spacing, lte) else {
                panic!("expected Ok");
            };
            prop_assert!(!initialized);
            let distance = (found - tick).abs();
            prop_assert!(distance <= 256 * spacing);
            if lte {
                prop_assert!(found <= tick);
            } else {
                prop_assert!(found > tick);
            }
        }
    }
}

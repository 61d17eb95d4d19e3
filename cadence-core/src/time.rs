// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Tick-based musical time algebra.
//!
//! Everything in the sequencer measures position in [`Tick`]s, an integer
//! offset into the pattern timeline. [`TimeSignature`] converts between
//! ticks and musical notation (bar/beat/tick) and knows where bar lines
//! fall; it does not know about wall-clock time at all — that's
//! [`crate`]'s sibling crate's job.

use serde::{Deserialize, Serialize};

/// The atomic time unit of the pattern timeline.
pub type Tick = u64;

/// A musical time signature, plus the tick resolution it's measured in.
///
/// `denominator` is the literal bottom number of the signature (4, 8, 16,
/// ...), not a reciprocal or exponent. `ticks_per_quarter_note` is the
/// session's chosen tick resolution (PPQ), independent of the signature
/// itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
    pub ticks_per_quarter_note: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
            ticks_per_quarter_note: 4,
        }
    }
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32, ticks_per_quarter_note: u32) -> Self {
        Self {
            numerator,
            denominator,
            ticks_per_quarter_note,
        }
    }

    /// Ticks spanned by a single `denominator`-note, e.g. a single eighth
    /// note when `denominator == 8`.
    ///
    /// `ticks_per_quarter_note * 4 / denominator`, which is exact as long as
    /// `denominator <= 4 * ticks_per_quarter_note`.
    pub fn ticks_per_denominator(&self) -> Tick {
        (self.ticks_per_quarter_note as Tick * 4) / self.denominator as Tick
    }

    /// Ticks spanned by one full bar.
    pub fn ticks_per_bar(&self) -> Tick {
        self.ticks_per_denominator() * self.numerator as Tick
    }

    /// Whether `tick` falls exactly on a bar boundary.
    pub fn is_tick_start_of_bar(&self, tick: Tick) -> bool {
        tick % self.ticks_per_bar() == 0
    }

    /// Converts a bar/beat/tick musical position to an absolute tick.
    pub fn musical_time_to_ticks(&self, bar: Tick, beat: Tick, tick: Tick) -> Tick {
        bar * self.ticks_per_bar() + beat * self.ticks_per_denominator() + tick
    }
}

/// Wraps a signed offset into `[0, modulus)`, used by
/// [`crate::edit::RotateSample`] to rotate event positions around the loop.
///
/// Unlike Rust's `%`, this never returns a negative result: a negative
/// `value` is repeatedly pushed up by `modulus` until it lands in range,
/// matching musical "rotate backwards past the start of the loop" intuition.
pub fn wrap(value: i64, modulus: Tick) -> Tick {
    let modulus = modulus as i64;
    let wrapped = value.rem_euclid(modulus);
    wrapped as Tick
}

#[cfg(test)]
mod wrap_tests {
    use super::wrap;
    use more_asserts::assert_lt;

    #[test]
    fn non_negative_values_are_plain_modulo() {
        assert_eq!(wrap(5, 8), 5);
        assert_eq!(wrap(8, 8), 0);
        assert_eq!(wrap(13, 8), 5);
    }

    #[test]
    fn negative_values_wrap_upward() {
        assert_eq!(wrap(-1, 8), 7);
        assert_eq!(wrap(-8, 8), 0);
        assert_eq!(wrap(-9, 8), 7);
    }

    #[test]
    fn always_lands_in_range() {
        for v in -50..50 {
            assert_lt!(wrap(v, 16), 16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_common_time() {
        let ts = TimeSignature::default();
        assert_eq!(ts.ticks_per_denominator(), 4);
        assert_eq!(ts.ticks_per_bar(), 16);
    }

    #[test]
    fn bar_boundaries() {
        let ts = TimeSignature::new(4, 4, 4);
        assert!(ts.is_tick_start_of_bar(0));
        assert!(!ts.is_tick_start_of_bar(15));
        assert!(ts.is_tick_start_of_bar(16));
        assert!(ts.is_tick_start_of_bar(32));
    }

    #[test]
    fn musical_time_conversion() {
        let ts = TimeSignature::new(4, 4, 4);
        assert_eq!(ts.musical_time_to_ticks(0, 0, 0), 0);
        assert_eq!(ts.musical_time_to_ticks(1, 0, 0), 16);
        assert_eq!(ts.musical_time_to_ticks(0, 1, 2), 6);
    }

    #[test]
    fn musical_time_to_ticks_start_of_bar_is_always_true() {
        let ts = TimeSignature::new(5, 4, 2);
        for bar in 0..20 {
            assert!(ts.is_tick_start_of_bar(ts.musical_time_to_ticks(bar, 0, 0)));
        }
    }

    #[test]
    fn odd_time_signature() {
        // numerator=5, denominator=4, tpqn=2 -> ticks_per_denominator=2, ticks_per_bar=10
        let ts = TimeSignature::new(5, 4, 2);
        assert_eq!(ts.ticks_per_denominator(), 2);
        assert_eq!(ts.ticks_per_bar(), 10);
    }
}

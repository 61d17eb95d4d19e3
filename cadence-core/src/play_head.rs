// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! The playback position cursor, with optional looping.

use crate::time::Tick;

/// Tracks the current playback position and, optionally, a loop range.
///
/// While looping, `advance` wraps the position back to `range_start` once it
/// reaches `range_end` (an exclusive upper bound).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayHead {
    position: Tick,
    range_start: Tick,
    range_end: Option<Tick>,
}

impl PlayHead {
    /// A fresh playhead at tick 0, not looping.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Tick {
        self.position
    }

    pub fn range_start(&self) -> Tick {
        self.range_start
    }

    pub fn range_end(&self) -> Option<Tick> {
        self.range_end
    }

    pub fn is_looping(&self) -> bool {
        self.range_end.is_some()
    }

    /// Resets the position to the start of the timeline. Does not affect
    /// the loop range.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Enables looping between `range_start` (inclusive) and `range_end`
    /// (exclusive).
    pub fn set_looping(&mut self, range_start: Tick, range_end: Tick) {
        self.range_start = range_start;
        self.range_end = Some(range_end);
    }

    pub fn stop_looping(&mut self) {
        self.range_end = None;
    }

    /// Advances the position by one tick, wrapping to `range_start` if
    /// looping and the end of the range has been reached.
    pub fn advance(&mut self) {
        self.position += 1;
        if let Some(range_end) = self.range_end {
            if self.position >= range_end {
                self.position = self.range_start;
            }
        }
    }
}

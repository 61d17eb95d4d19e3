// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! A deadline-based tick pacer, tolerant of scheduling jitter.
//!
//! The deadline always advances from the *previous* deadline, never from
//! "now" — this is what keeps the clock from accumulating drift across a
//! long-running pattern, at the cost of firing immediately (rather than
//! catching up with a burst) if the caller falls behind by more than one
//! period.

use std::thread;
use std::time::{Duration, Instant};

/// Paces ticks at a configurable period, in milliseconds.
#[derive(Debug)]
pub struct Clock {
    tick_period: Duration,
    deadline: Instant,
}

impl Clock {
    /// A clock that hasn't been started yet. Call [`Self::start`] before
    /// the first [`Self::block_until_next_tick`].
    pub fn new(tick_time_ms: f64) -> Self {
        Self {
            tick_period: duration_from_ms(tick_time_ms),
            deadline: Instant::now(),
        }
    }

    /// Arms the first deadline at `now + period`.
    pub fn start(&mut self) {
        self.deadline = Instant::now() + self.tick_period;
    }

    /// Changes the tick period for subsequent deadlines. The deadline
    /// already outstanding still fires at its originally scheduled time —
    /// this does not reset phase.
    pub fn update_tick_time_ms(&mut self, tick_time_ms: f64) {
        self.tick_period = duration_from_ms(tick_time_ms);
    }

    /// Whether the deadline has arrived. Does not advance the deadline —
    /// callers that want the "block, then advance" behavior should use
    /// [`Self::block_until_next_tick`]; callers that need to interleave
    /// polling with other work (notably a sequencer thread that must not
    /// sleep while holding a shared lock) should call this repeatedly and
    /// call [`Self::advance_deadline`] themselves once it returns `true`.
    pub fn is_deadline_reached(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Advances the deadline by exactly one tick period. If the caller was
    /// late by more than one period, this does not attempt to "catch up" —
    /// the next deadline is still just one period past the one that just
    /// fired.
    pub fn advance_deadline(&mut self) {
        self.deadline += self.tick_period;
    }

    /// Blocks (sleeping in ~1ms slices to avoid busy-spinning) until the
    /// current deadline arrives, then advances to the next one.
    ///
    /// The sequencer's worker loop does not call this directly — it cannot
    /// hold the `SequencerState` lock while sleeping, so it reimplements this
    /// same poll/advance pair as the free function
    /// `sequencer::block_until_next_tick`, lock-and-release per iteration
    /// instead of across the whole wait. Keep the two in sync.
    pub fn block_until_next_tick(&mut self) {
        while !self.is_deadline_reached() {
            thread::sleep(Duration::from_millis(1));
        }
        self.advance_deadline();
    }
}

fn duration_from_ms(ms: f64) -> Duration {
    Duration::from_secs_f64((ms.max(0.0)) * 0.001)
}

/// `tick_time_ms = 60_000 / (ticks_per_quarter_note * tempo_bpm)`: how many
/// milliseconds one tick spans at a given tempo and tick resolution.
pub fn tick_time_ms(ticks_per_quarter_note: u32, tempo_bpm: f64) -> f64 {
    60_000.0 / (ticks_per_quarter_note as f64 * tempo_bpm)
}

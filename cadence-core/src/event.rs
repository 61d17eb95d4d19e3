// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Events: a sample triggered at a particular tick.

use crate::time::Tick;
use serde::{Deserialize, Serialize};

/// A single trigger of a [`Sample`](crate::sample::Sample), identified by
/// that sample's name rather than a pointer or index — this is what keeps
/// JSON round-tripping trivial and avoids dangling references across a
/// session's lifetime.
///
/// Identity and equality are `(sample_name, time_stamp)` alone; `duration`,
/// `midi_note`, and `velocity` are metadata that travels with the event but
/// doesn't distinguish it from another event at the same place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub sample_name: String,
    pub time_stamp: Tick,
    /// Duration in beats. Defaults to a quarter note (see `SPEC_FULL.md` §9,
    /// Open Question 4).
    pub duration: f64,
    pub midi_note: u8,
    pub velocity: u8,
}

impl Event {
    pub const DEFAULT_DURATION: f64 = 0.25;
    pub const DEFAULT_MIDI_NOTE: u8 = 60;
    pub const DEFAULT_VELOCITY: u8 = 127;

    /// Creates an event with the sequencer's default metadata. Most callers
    /// — the edit primitives, the euclidean generator — only ever need to
    /// specify the sample and the tick.
    pub fn new(sample_name: impl Into<String>, time_stamp: Tick) -> Self {
        Self {
            sample_name: sample_name.into(),
            time_stamp,
            duration: Self::DEFAULT_DURATION,
            midi_note: Self::DEFAULT_MIDI_NOTE,
            velocity: Self::DEFAULT_VELOCITY,
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.sample_name == other.sample_name && self.time_stamp == other.time_stamp
    }
}
impl Eq for Event {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_metadata() {
        let mut a = Event::new("kick", 0);
        let mut b = Event::new("kick", 0);
        a.velocity = 10;
        b.velocity = 120;
        assert_eq!(a, b);
    }

    #[test]
    fn different_time_stamps_are_not_equal() {
        let a = Event::new("kick", 0);
        let b = Event::new("kick", 4);
        assert_ne!(a, b);
    }

    #[test]
    fn default_duration_is_a_quarter_note() {
        assert_eq!(Event::new("kick", 0).duration, 0.25);
    }
}

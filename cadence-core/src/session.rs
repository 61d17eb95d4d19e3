// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! The session aggregate: samples, events, tempo, and time signature, with
//! synchronous change notifications.
//!
//! Every mutation that should be visible to a playing [`Sequencer`] — or any
//! other interested party — **must** go through one of [`Session`]'s mutator
//! methods. Writing directly to a field (which Rust's visibility rules
//! prevent outside this module) would silently desynchronize playback.
//!
//! [`Sequencer`]: https://docs.rs/cadence-services (not a dependency of this
//! crate; referenced here only in documentation)

use crate::event::Event;
use crate::sample::Sample;
use crate::time::{Tick, TimeSignature};

/// Receives synchronous notifications of [`Session`] state changes.
///
/// Notifications fire on the caller's thread, while the mutator that
/// triggered them still logically owns the aggregate. Implementations must
/// not call back into any `Session` mutator, must not block on I/O, and must
/// not join any other thread — doing so from inside a notification would
/// reenter or deadlock the caller.
///
/// All methods have empty default bodies so an observer can implement only
/// the notifications it cares about.
pub trait SessionObserver: Send {
    fn sample_added(&mut self, _sample: &Sample) {}
    fn sample_removed(&mut self, _sample: &Sample) {}
    fn event_added(&mut self, _event: &Event) {}
    fn event_removed(&mut self, _event: &Event) {}
    fn time_signature_changed(&mut self, _time_signature: &TimeSignature) {}
    fn tempo_changed(&mut self, _tempo_bpm: f64) {}
}

/// The aggregate root of a pattern: its samples, its events, and the musical
/// context (time signature, tempo) they're interpreted in.
///
/// # Invariants
/// - Every event's `sample_name` names a sample present in [`Self::samples`].
/// - No two samples share a name; no two events share `(sample_name, time_stamp)`.
#[derive(Default)]
pub struct Session {
    samples: Vec<Sample>,
    events: Vec<Event>,
    time_signature: TimeSignature,
    tempo_bpm: f64,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl Session {
    /// An empty session: no samples, no events, common time, 120 BPM.
    pub fn new() -> Self {
        Self {
            tempo_bpm: 120.0,
            ..Default::default()
        }
    }

    /// Constructs a session directly from its parts, bypassing the mutator
    /// API and its notifications.
    ///
    /// This is only sound before any observer has been attached — document
    /// deserialization is the intended caller. Once a [`Sequencer`] or any
    /// other observer is watching, all further changes must go through the
    /// mutator methods.
    pub fn from_parts(
        samples: Vec<Sample>,
        events: Vec<Event>,
        time_signature: TimeSignature,
        tempo_bpm: f64,
    ) -> Self {
        Self {
            samples,
            events,
            time_signature,
            tempo_bpm,
            observers: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn contains_sample(&self, sample: &Sample) -> bool {
        self.samples.contains(sample)
    }

    pub fn contains_event(&self, event: &Event) -> bool {
        self.events.contains(event)
    }

    pub fn find_sample(&self, name: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Events whose `time_stamp` is exactly `tick`.
    pub fn events_at(&self, tick: Tick) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.time_stamp == tick)
    }

    /// Events that reference `sample`, in session order.
    pub fn events_with_sample(&self, sample: &Sample) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.sample_name == sample.name)
            .cloned()
            .collect()
    }

    /// The highest `time_stamp` among current events, or 0 if there are
    /// none.
    pub fn highest_time_stamp(&self) -> Tick {
        self.events.iter().map(|e| e.time_stamp).max().unwrap_or(0)
    }

    /// Registers an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Appends `sample` if no sample with the same name is already present.
    /// No-op (and no notification) if one is.
    pub fn add_sample(&mut self, sample: Sample) {
        if self.contains_sample(&sample) {
            return;
        }
        self.samples.push(sample);
        let added = self.samples.last().unwrap().clone();
        for observer in &mut self.observers {
            observer.sample_added(&added);
        }
    }

    /// Removes `sample` and every event that references it. No-op if the
    /// sample isn't present.
    ///
    /// Fires one `event_removed` per cascaded event, in session order, then
    /// exactly one `sample_removed`.
    pub fn remove_sample(&mut self, sample: &Sample) {
        if !self.contains_sample(sample) {
            return;
        }
        self.remove_all_events_with_sample(sample);
        self.samples.retain(|s| s != sample);
        for observer in &mut self.observers {
            observer.sample_removed(sample);
        }
    }

    /// Appends `event` if its sample is present and it isn't a duplicate of
    /// an existing event. No-op (and no notification) otherwise.
    pub fn add_event(&mut self, event: Event) {
        let sample_present = self.samples.iter().any(|s| s.name == event.sample_name);
        if !sample_present || self.contains_event(&event) {
            return;
        }
        self.events.push(event);
        let added = self.events.last().unwrap().clone();
        for observer in &mut self.observers {
            observer.event_added(&added);
        }
    }

    /// Removes `event`. No-op if it isn't present.
    pub fn remove_event(&mut self, event: &Event) {
        if !self.contains_event(event) {
            return;
        }
        self.events.retain(|e| e != event);
        for observer in &mut self.observers {
            observer.event_removed(event);
        }
    }

    /// Removes every event referencing `sample`, firing one `event_removed`
    /// per removed event. Collects the victims first so the notification
    /// loop doesn't mutate the list it's iterating.
    fn remove_all_events_with_sample(&mut self, sample: &Sample) {
        let to_remove: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.sample_name == sample.name)
            .cloned()
            .collect();
        for event in &to_remove {
            self.remove_event(event);
        }
    }

    /// Replaces the time signature and notifies observers.
    pub fn change_time_signature(&mut self, time_signature: TimeSignature) {
        self.time_signature = time_signature;
        for observer in &mut self.observers {
            observer.time_signature_changed(&time_signature);
        }
    }

    /// Changes a sample's spectral classification in place. Returns `true`
    /// if `name` resolved and the position differed (a no-op change to the
    /// same position still returns `true`, since the sample was found).
    ///
    /// Spectral position is metadata, not identity (see [`Sample`]'s
    /// equality), so this isn't a structural edit: it doesn't appear in the
    /// mutator table alongside add/remove, and it fires no observer
    /// notification — nothing downstream (the sequencer, an event handler)
    /// keys its behavior off spectral position, only the euclidean generator
    /// and MIDI export do, and both read it fresh each time they run.
    pub fn set_spectral_position(
        &mut self,
        name: &str,
        spectral_position: crate::sample::SpectralPosition,
    ) -> bool {
        let Some(sample) = self.samples.iter_mut().find(|s| s.name == name) else {
            return false;
        };
        sample.spectral_position = spectral_position;
        true
    }

    /// Replaces the tempo if `tempo_bpm > 0`; no-op otherwise.
    pub fn change_tempo(&mut self, tempo_bpm: f64) {
        if tempo_bpm <= 0.0 {
            return;
        }
        self.tempo_bpm = tempo_bpm;
        for observer in &mut self.observers {
            observer.tempo_changed(tempo_bpm);
        }
    }
}

impl PartialEq for Session {
    /// Structural equality: samples, events, time signature, and tempo must
    /// match. Observers are not part of the comparison — they're
    /// infrastructure, not state.
    fn eq(&self, other: &Self) -> bool {
        self.samples == other.samples
            && self.events == other.events
            && self.time_signature == other.time_signature
            && self.tempo_bpm == other.tempo_bpm
    }
}

impl std::fmt::Debug for Session {
    /// Observers aren't `Debug` (they're trait objects), so they're shown
    /// only as a count.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("samples", &self.samples)
            .field("events", &self.events)
            .field("time_signature", &self.time_signature)
            .field("tempo_bpm", &self.tempo_bpm)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// The smallest bar boundary at or after the highest event time stamp, with
/// the policy that an event sitting exactly on a bar line still reserves a
/// full trailing bar. Loop start is always 0.
pub fn compute_loop_end(session: &Session) -> Tick {
    loop_end_for(session.highest_time_stamp(), session.time_signature())
}

/// As [`compute_loop_end`], but for an arbitrary high-water mark rather than
/// a live session — used by [`crate::edit::RotateSample`] to recompute the
/// wrap point after its own edits, and directly testable in isolation.
pub fn loop_end_for(highest_time_stamp: Tick, time_signature: TimeSignature) -> Tick {
    let ticks_per_bar = time_signature.ticks_per_bar();
    if highest_time_stamp % ticks_per_bar == 0 {
        highest_time_stamp + ticks_per_bar
    } else {
        // Smallest multiple of ticks_per_bar strictly greater than
        // highest_time_stamp.
        (highest_time_stamp / ticks_per_bar + 1) * ticks_per_bar
    }
}

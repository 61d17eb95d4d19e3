// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Reversible edit primitives and the undo/redo stack that replays them.
//!
//! Every user-facing mutation to a [`Session`] is expressed as an [`Edit`]:
//! a small self-contained command that knows how to apply itself and how to
//! reverse itself. [`EditManager`] is nothing more than two stacks of these.

use crate::euclidean;
use crate::event::Event;
use crate::rng::Rng;
use crate::sample::{Sample, SpectralPosition};
use crate::session::{compute_loop_end, Session};
use crate::time::{wrap, TimeSignature};

/// A reversible session mutation.
///
/// `perform` and `undo` are mirror images: calling one then the other must
/// return the session to bit-for-bit the state it started in (modulo the
/// tolerant-refusal semantics of [`Session`]'s own mutators, which `Edit`
/// impls inherit).
pub trait Edit: Send {
    fn perform(&mut self, session: &mut Session);
    fn undo(&mut self, session: &mut Session);
}

/// Removes every event referencing `sample`, returning exactly the events it
/// removed (in session order) so a caller can restore them later.
fn take_events_with_sample(session: &mut Session, sample: &Sample) -> Vec<Event> {
    let victims = session.events_with_sample(sample);
    for e in &victims {
        session.remove_event(e);
    }
    victims
}

/// Removes every event in the session, returning exactly what it removed.
fn take_all_events(session: &mut Session) -> Vec<Event> {
    let victims = session.events().to_vec();
    for e in &victims {
        session.remove_event(e);
    }
    victims
}

fn restore_events(session: &mut Session, events: &[Event]) {
    for e in events {
        session.add_event(e.clone());
    }
}

pub struct AddEvent {
    event: Event,
}
impl AddEvent {
    pub fn new(event: Event) -> Self {
        Self { event }
    }
}
impl Edit for AddEvent {
    fn perform(&mut self, session: &mut Session) {
        session.add_event(self.event.clone());
    }
    fn undo(&mut self, session: &mut Session) {
        session.remove_event(&self.event);
    }
}

pub struct RemoveEvent {
    event: Event,
}
impl RemoveEvent {
    pub fn new(event: Event) -> Self {
        Self { event }
    }
}
impl Edit for RemoveEvent {
    fn perform(&mut self, session: &mut Session) {
        session.remove_event(&self.event);
    }
    fn undo(&mut self, session: &mut Session) {
        session.add_event(self.event.clone());
    }
}

pub struct AddSample {
    sample: Sample,
}
impl AddSample {
    pub fn new(sample: Sample) -> Self {
        Self { sample }
    }
}
impl Edit for AddSample {
    fn perform(&mut self, session: &mut Session) {
        session.add_sample(self.sample.clone());
    }
    fn undo(&mut self, session: &mut Session) {
        session.remove_sample(&self.sample);
    }
}

/// Removes a sample and, via [`Session::remove_sample`]'s cascade, every
/// event that referenced it. Snapshots those cascaded events so undo can
/// bring them all back.
pub struct RemoveSample {
    sample: Sample,
    removed_events: Vec<Event>,
}
impl RemoveSample {
    pub fn new(sample: Sample) -> Self {
        Self {
            sample,
            removed_events: Vec::new(),
        }
    }
}
impl Edit for RemoveSample {
    fn perform(&mut self, session: &mut Session) {
        self.removed_events = session.events_with_sample(&self.sample);
        session.remove_sample(&self.sample);
    }
    fn undo(&mut self, session: &mut Session) {
        session.add_sample(self.sample.clone());
        restore_events(session, &self.removed_events);
    }
}

/// Clears every event in the session.
pub struct RemoveAllEvents {
    removed_events: Vec<Event>,
}
impl RemoveAllEvents {
    pub fn new() -> Self {
        Self {
            removed_events: Vec::new(),
        }
    }
}
impl Default for RemoveAllEvents {
    fn default() -> Self {
        Self::new()
    }
}
impl Edit for RemoveAllEvents {
    fn perform(&mut self, session: &mut Session) {
        self.removed_events = take_all_events(session);
    }
    fn undo(&mut self, session: &mut Session) {
        restore_events(session, &self.removed_events);
    }
}

/// Clears every event that references a particular sample.
pub struct RemoveAllEventsWithSample {
    sample: Sample,
    removed_events: Vec<Event>,
}
impl RemoveAllEventsWithSample {
    pub fn new(sample: Sample) -> Self {
        Self {
            sample,
            removed_events: Vec::new(),
        }
    }
}
impl Edit for RemoveAllEventsWithSample {
    fn perform(&mut self, session: &mut Session) {
        self.removed_events = take_events_with_sample(session, &self.sample);
    }
    fn undo(&mut self, session: &mut Session) {
        restore_events(session, &self.removed_events);
    }
}

/// Swaps the tempo with its previous value. Self-inverting: `undo` is
/// implemented as a second `perform`, since performing it twice restores the
/// original tempo.
pub struct ChangeTempo {
    tempo_bpm: f64,
}
impl ChangeTempo {
    pub fn new(tempo_bpm: f64) -> Self {
        Self { tempo_bpm }
    }
}
impl Edit for ChangeTempo {
    fn perform(&mut self, session: &mut Session) {
        let previous = session.tempo_bpm();
        session.change_tempo(self.tempo_bpm);
        self.tempo_bpm = previous;
    }
    fn undo(&mut self, session: &mut Session) {
        self.perform(session);
    }
}

/// Swaps the time signature with its previous value. See [`ChangeTempo`] for
/// why `undo` just calls `perform` again.
pub struct ChangeTimeSignature {
    time_signature: TimeSignature,
}
impl ChangeTimeSignature {
    pub fn new(time_signature: TimeSignature) -> Self {
        Self { time_signature }
    }
}
impl Edit for ChangeTimeSignature {
    fn perform(&mut self, session: &mut Session) {
        let previous = session.time_signature();
        session.change_time_signature(self.time_signature);
        self.time_signature = previous;
    }
    fn undo(&mut self, session: &mut Session) {
        self.perform(session);
    }
}

/// Swaps a sample's spectral position with its previous value, by name. See
/// [`ChangeTempo`] for why `undo` just calls `perform` again.
///
/// If `sample_name` no longer resolves (the sample was removed by a later
/// edit before this one is undone), both `perform` and `undo` are silent
/// no-ops, matching [`Session::set_spectral_position`]'s own tolerance.
pub struct ChangeSpectralPosition {
    sample_name: String,
    spectral_position: SpectralPosition,
}
impl ChangeSpectralPosition {
    pub fn new(sample_name: impl Into<String>, spectral_position: SpectralPosition) -> Self {
        Self {
            sample_name: sample_name.into(),
            spectral_position,
        }
    }
}
impl Edit for ChangeSpectralPosition {
    fn perform(&mut self, session: &mut Session) {
        let Some(previous) = session
            .find_sample(&self.sample_name)
            .map(|s| s.spectral_position)
        else {
            return;
        };
        session.set_spectral_position(&self.sample_name, self.spectral_position);
        self.spectral_position = previous;
    }
    fn undo(&mut self, session: &mut Session) {
        self.perform(session);
    }
}

/// Rotates every event referencing `sample` forward by `amount` ticks,
/// wrapping around the session's current loop end.
///
/// The loop end is recomputed fresh at the time of `perform` (and again at
/// the time of `undo`, from whatever state the session is in then) rather
/// than cached, since other edits may have changed the loop length in
/// between.
pub struct RotateSample {
    sample: Sample,
    amount: i64,
}
impl RotateSample {
    pub fn new(sample: Sample, amount: i64) -> Self {
        Self { sample, amount }
    }

    fn rotate_by(&self, session: &mut Session, amount: i64) {
        let events = session.events_with_sample(&self.sample);
        take_events_with_sample(session, &self.sample);
        let loop_end = compute_loop_end(session);
        for mut e in events {
            e.time_stamp = wrap(e.time_stamp as i64 + amount, loop_end.max(1));
            session.add_event(e);
        }
    }
}
impl Edit for RotateSample {
    fn perform(&mut self, session: &mut Session) {
        self.rotate_by(session, self.amount);
    }
    fn undo(&mut self, session: &mut Session) {
        self.rotate_by(session, -self.amount);
    }
}

/// Replaces every event referencing `sample` with a fresh euclidean
/// distribution of `num_events` spread over one bar.
///
/// Undo restores the exact pre-`perform` event set: it removes exactly the
/// events this edit added, then restores exactly the events it removed,
/// rather than recomputing a distribution and hoping it matches (see
/// `SPEC_FULL.md` §9, Open Question 3).
pub struct EuclideanForSample {
    sample: Sample,
    num_events: u32,
    removed_events: Vec<Event>,
    added_events: Vec<Event>,
}
impl EuclideanForSample {
    pub fn new(sample: Sample, num_events: u32) -> Self {
        Self {
            sample,
            num_events,
            removed_events: Vec::new(),
            added_events: Vec::new(),
        }
    }
}
impl Edit for EuclideanForSample {
    fn perform(&mut self, session: &mut Session) {
        self.removed_events = take_events_with_sample(session, &self.sample);
        let num_ticks = session.time_signature().ticks_per_bar() as u32;
        let distribution = euclidean::distribute(num_ticks, self.num_events);
        self.added_events.clear();
        for (tick, &on) in distribution.iter().enumerate() {
            if on {
                let event = Event::new(self.sample.name.clone(), tick as u64);
                session.add_event(event.clone());
                self.added_events.push(event);
            }
        }
    }
    fn undo(&mut self, session: &mut Session) {
        for e in &self.added_events {
            session.remove_event(e);
        }
        self.added_events.clear();
        restore_events(session, &self.removed_events);
    }
}

/// Clears the whole session and generates a fresh randomized pattern: a
/// euclidean distribution per sample, density-scaled by spectral position,
/// with mid and high samples additionally rotated by a random offset.
///
/// Undo clears whatever was generated and restores the pre-`perform` event
/// set, mirroring the composed clear-then-restore shape of the other
/// composed edits rather than trying to invert the randomized generation
/// step by step.
pub struct GenerateSequence {
    rng: Rng,
    backup: Vec<Event>,
}
impl GenerateSequence {
    pub fn new(rng: Rng) -> Self {
        Self {
            rng,
            backup: Vec::new(),
        }
    }
}
impl Edit for GenerateSequence {
    fn perform(&mut self, session: &mut Session) {
        self.backup = take_all_events(session);

        let num_ticks = session.time_signature().ticks_per_bar();
        let low_density = (self.rng.rand_range(0..num_ticks + 1) as f64 / 4.0).ceil() as u32;
        let mid_density = (self.rng.rand_range(0..num_ticks + 1) as f64 / 4.0).ceil() as u32;
        let high_density = self.rng.rand_range(0..num_ticks.saturating_sub(4) + 1) as u32;

        let samples = session.samples().to_vec();
        for sample in &samples {
            match sample.spectral_position {
                SpectralPosition::Low => {
                    EuclideanForSample::new(sample.clone(), low_density).perform(session);
                }
                SpectralPosition::Mid => {
                    EuclideanForSample::new(sample.clone(), mid_density).perform(session);
                    let lower = 4.min(num_ticks.saturating_sub(4));
                    let upper = num_ticks.saturating_sub(4).max(lower);
                    let amount = self.rng.rand_range(lower..upper + 1) as i64;
                    RotateSample::new(sample.clone(), amount).perform(session);
                }
                SpectralPosition::High => {
                    EuclideanForSample::new(sample.clone(), high_density).perform(session);
                    let amount = self.rng.rand_range(0..num_ticks + 1) as i64;
                    RotateSample::new(sample.clone(), amount).perform(session);
                }
            }
        }
    }
    fn undo(&mut self, session: &mut Session) {
        take_all_events(session);
        restore_events(session, &self.backup);
    }
}

/// Two stacks of performed [`Edit`]s, providing linear undo/redo.
///
/// Performing a fresh edit clears the redo stack (diverging from the source
/// material here is deliberate — see `SPEC_FULL.md` §9, Open Question 1).
#[derive(Default)]
pub struct EditManager {
    undo_stack: Vec<Box<dyn Edit>>,
    redo_stack: Vec<Box<dyn Edit>>,
}

impl EditManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn perform(&mut self, mut edit: Box<dyn Edit>, session: &mut Session) {
        edit.perform(session);
        self.undo_stack.push(edit);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, session: &mut Session) {
        let Some(mut edit) = self.undo_stack.pop() else {
            return;
        };
        edit.undo(session);
        self.redo_stack.push(edit);
    }

    pub fn redo(&mut self, session: &mut Session) {
        let Some(mut edit) = self.redo_stack.pop() else {
            return;
        };
        edit.perform(session);
        self.undo_stack.push(edit);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SpectralPosition;

    fn kick() -> Sample {
        Sample::new("kick", "kick.wav", SpectralPosition::Low)
    }

    #[test]
    fn add_then_undo_event_round_trips() {
        let mut session = Session::new();
        session.add_sample(kick());
        let mut manager = EditManager::new();
        manager.perform(Box::new(AddEvent::new(Event::new("kick", 0))), &mut session);
        assert_eq!(session.events().len(), 1);
        manager.undo(&mut session);
        assert_eq!(session.events().len(), 0);
        manager.redo(&mut session);
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn redo_stack_is_cleared_by_a_fresh_perform() {
        let mut session = Session::new();
        session.add_sample(kick());
        let mut manager = EditManager::new();
        manager.perform(Box::new(AddEvent::new(Event::new("kick", 0))), &mut session);
        manager.undo(&mut session);
        assert!(manager.can_redo());
        manager.perform(Box::new(AddEvent::new(Event::new("kick", 4))), &mut session);
        assert!(!manager.can_redo());
    }

    #[test]
    fn undo_redo_on_empty_stacks_is_a_no_op() {
        let mut session = Session::new();
        let mut manager = EditManager::new();
        manager.undo(&mut session);
        manager.redo(&mut session);
        assert_eq!(session.events().len(), 0);
    }

    #[test]
    fn remove_sample_cascade_round_trips_via_undo() {
        let mut session = Session::new();
        session.add_sample(kick());
        session.add_event(Event::new("kick", 0));
        session.add_event(Event::new("kick", 4));

        let mut manager = EditManager::new();
        manager.perform(Box::new(RemoveSample::new(kick())), &mut session);
        assert_eq!(session.samples().len(), 0);
        assert_eq!(session.events().len(), 0);

        manager.undo(&mut session);
        assert_eq!(session.samples().len(), 1);
        assert_eq!(session.events().len(), 2);
    }

    #[test]
    fn euclidean_for_sample_then_undo_restores_prior_events() {
        let mut session = Session::new();
        session.add_sample(kick());
        session.add_event(Event::new("kick", 2));

        let mut manager = EditManager::new();
        manager.perform(
            Box::new(EuclideanForSample::new(kick(), 4)),
            &mut session,
        );
        assert_eq!(session.events().len(), 4);

        manager.undo(&mut session);
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.events()[0].time_stamp, 2);
    }

    #[test]
    fn rotate_sample_round_trips() {
        let mut session = Session::new();
        session.add_sample(kick());
        session.add_event(Event::new("kick", 0));
        session.add_event(Event::new("kick", 4));

        let before: Vec<u64> = {
            let mut ts: Vec<u64> = session.events().iter().map(|e| e.time_stamp).collect();
            ts.sort();
            ts
        };

        let mut manager = EditManager::new();
        manager.perform(Box::new(RotateSample::new(kick(), 3)), &mut session);
        manager.undo(&mut session);

        let after: Vec<u64> = {
            let mut ts: Vec<u64> = session.events().iter().map(|e| e.time_stamp).collect();
            ts.sort();
            ts
        };
        assert_eq!(before, after);
    }

    #[test]
    fn change_tempo_swaps_and_undo_restores() {
        let mut session = Session::new();
        let mut manager = EditManager::new();
        assert_eq!(session.tempo_bpm(), 120.0);
        manager.perform(Box::new(ChangeTempo::new(140.0)), &mut session);
        assert_eq!(session.tempo_bpm(), 140.0);
        manager.undo(&mut session);
        assert_eq!(session.tempo_bpm(), 120.0);
    }

    #[test]
    fn change_spectral_position_swaps_and_undo_restores() {
        let mut session = Session::new();
        session.add_sample(kick());
        let mut manager = EditManager::new();
        manager.perform(
            Box::new(ChangeSpectralPosition::new("kick", SpectralPosition::High)),
            &mut session,
        );
        assert_eq!(
            session.find_sample("kick").unwrap().spectral_position,
            SpectralPosition::High
        );
        manager.undo(&mut session);
        assert_eq!(
            session.find_sample("kick").unwrap().spectral_position,
            SpectralPosition::Low
        );
    }

    #[test]
    fn generate_sequence_round_trips_to_prior_state() {
        let mut session = Session::new();
        session.add_sample(Sample::new("kick", "kick.wav", SpectralPosition::Low));
        session.add_sample(Sample::new("snare", "snare.wav", SpectralPosition::Mid));
        session.add_sample(Sample::new("hat", "hat.wav", SpectralPosition::High));
        session.add_event(Event::new("kick", 0));

        let mut manager = EditManager::new();
        manager.perform(
            Box::new(GenerateSequence::new(Rng::new_with_seed(99))),
            &mut session,
        );

        manager.undo(&mut session);
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.events()[0].sample_name, "kick");
    }
}

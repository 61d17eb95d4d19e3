// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! The high-level editing façade: translates sample-name-and-musical-time
//! intent into [`Edit`] primitives routed through an [`EditManager`].

use crate::edit::{
    AddEvent, AddSample, ChangeSpectralPosition, ChangeTempo, ChangeTimeSignature, Edit,
    EditManager, EuclideanForSample, GenerateSequence, RemoveAllEvents,
    RemoveAllEventsWithSample, RemoveEvent, RemoveSample, RotateSample,
};
use crate::event::Event;
use crate::rng::Rng;
use crate::sample::{Sample, SpectralPosition};
use crate::session::{compute_loop_end, Session, SessionObserver};
use crate::time::TimeSignature;

/// Fronts a [`Session`] with name-based commands instead of raw [`Edit`]
/// construction, and owns the [`EditManager`] that makes them undoable.
///
/// Commands that reference an unknown sample name are silently ignored —
/// there is no error channel here by design; callers that need to know
/// whether a name resolved should check [`Self::find_sample`] first.
pub struct SessionEditor {
    session: Session,
    edit_manager: EditManager,
}

impl SessionEditor {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            edit_manager: EditManager::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replaces the session wholesale (used when loading a document).
    /// Clears undo/redo history, since it no longer applies to the new
    /// session.
    pub fn replace_session(&mut self, session: Session) {
        self.session = session;
        self.edit_manager = EditManager::new();
    }

    pub fn find_sample(&self, name: &str) -> Option<&Sample> {
        self.session.find_sample(name)
    }

    /// Registers an observer directly on the underlying session. Exposed so
    /// a real-time consumer (a sequencer) can watch for mutations without
    /// this crate needing to know anything about threads.
    pub fn add_session_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.session.add_observer(observer);
    }

    fn perform(&mut self, edit: Box<dyn Edit>) {
        self.edit_manager.perform(edit, &mut self.session);
    }

    pub fn undo(&mut self) {
        self.edit_manager.undo(&mut self.session);
    }

    pub fn redo(&mut self) {
        self.edit_manager.redo(&mut self.session);
    }

    pub fn can_undo(&self) -> bool {
        self.edit_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.edit_manager.can_redo()
    }

    /// No-op if a sample with `name` already exists.
    pub fn add_sample(
        &mut self,
        name: impl Into<String>,
        file_path: impl Into<String>,
        spectral_position: SpectralPosition,
    ) {
        let name = name.into();
        if self.find_sample(&name).is_some() {
            return;
        }
        let sample = Sample::new(name, file_path, spectral_position);
        self.perform(Box::new(AddSample::new(sample)));
    }

    /// No-op if `name` doesn't resolve to a sample.
    pub fn remove_sample(&mut self, name: &str) {
        let Some(sample) = self.find_sample(name).cloned() else {
            return;
        };
        self.perform(Box::new(RemoveSample::new(sample)));
    }

    /// No-op if `sample_name` doesn't resolve.
    pub fn add_event(&mut self, sample_name: &str, bar: u64, beat: u64, tick: u64) {
        let Some(sample) = self.find_sample(sample_name).cloned() else {
            return;
        };
        let time_stamp = self
            .session
            .time_signature()
            .musical_time_to_ticks(bar, beat, tick);
        self.perform(Box::new(AddEvent::new(Event::new(sample.name, time_stamp))));
    }

    /// No-op if `sample_name` doesn't resolve.
    pub fn remove_event(&mut self, sample_name: &str, bar: u64, beat: u64, tick: u64) {
        let Some(sample) = self.find_sample(sample_name).cloned() else {
            return;
        };
        let time_stamp = self
            .session
            .time_signature()
            .musical_time_to_ticks(bar, beat, tick);
        self.perform(Box::new(RemoveEvent::new(Event::new(
            sample.name,
            time_stamp,
        ))));
    }

    pub fn remove_all_events(&mut self) {
        self.perform(Box::new(RemoveAllEvents::new()));
    }

    /// No-op if `sample_name` doesn't resolve.
    pub fn remove_all_events_with_sample(&mut self, sample_name: &str) {
        let Some(sample) = self.find_sample(sample_name).cloned() else {
            return;
        };
        self.perform(Box::new(RemoveAllEventsWithSample::new(sample)));
    }

    /// No-op (and ignored) if `tempo_bpm <= 0`; the underlying mutator
    /// refuses the change but the edit is still pushed to the undo stack as
    /// a harmless identity, mirroring the tolerant-refusal posture of
    /// `Session` itself.
    pub fn change_tempo(&mut self, tempo_bpm: f64) {
        self.perform(Box::new(ChangeTempo::new(tempo_bpm)));
    }

    pub fn change_time_signature(&mut self, numerator: u32, denominator: u32, ticks_per_quarter_note: u32) {
        let ts = TimeSignature::new(numerator, denominator, ticks_per_quarter_note);
        self.perform(Box::new(ChangeTimeSignature::new(ts)));
    }

    /// No-op if `sample_name` doesn't resolve.
    pub fn euclidean_for_sample(&mut self, sample_name: &str, num_events: u32) {
        let Some(sample) = self.find_sample(sample_name).cloned() else {
            return;
        };
        self.perform(Box::new(EuclideanForSample::new(sample, num_events)));
    }

    /// No-op if `sample_name` doesn't resolve. Positive `amount` rotates
    /// forward (later in the loop), negative rotates backward.
    pub fn rotate_sample(&mut self, sample_name: &str, amount: i64) {
        let Some(sample) = self.find_sample(sample_name).cloned() else {
            return;
        };
        self.perform(Box::new(RotateSample::new(sample, amount)));
    }

    pub fn generate_sequence(&mut self) {
        self.perform(Box::new(GenerateSequence::new(Rng::default())));
    }

    /// No-op if `sample_name` doesn't resolve.
    pub fn change_spectral_position(
        &mut self,
        sample_name: &str,
        spectral_position: SpectralPosition,
    ) {
        if self.find_sample(sample_name).is_none() {
            return;
        }
        self.perform(Box::new(ChangeSpectralPosition::new(
            sample_name,
            spectral_position,
        )));
    }

    /// Renders the session as a human-readable grid: a header with tempo
    /// and time signature, then one line per sample showing its events
    /// across the loop.
    pub fn to_formatted_string(&self) -> String {
        session_to_formatted_string(&self.session)
    }
}

fn session_to_formatted_string(session: &Session) -> String {
    let mut out = format!("tempo: {} bpm\n", session.tempo_bpm());
    let ts = session.time_signature();
    out.push_str(&format!("time signature: {}/{}\n\n", ts.numerator, ts.denominator));

    let lines: Vec<String> = session
        .samples()
        .iter()
        .map(|s| {
            let label = format!("{}({})", s.name, s.spectral_position.abbreviation());
            let label = pad_to(&label, 8);
            format!("{label}{}", events_with_sample_to_string(session, s))
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

fn pad_to(s: &str, width: usize) -> String {
    if s.chars().count() >= width {
        s.to_string()
    } else {
        let mut s = s.to_string();
        s.push_str(&" ".repeat(width - s.chars().count()));
        s
    }
}

/// Renders one sample's events as a bar-by-bar grid, e.g.
/// `|x... .x.. |..x. ...x|`.
fn events_with_sample_to_string(session: &Session, sample: &Sample) -> String {
    let ts = session.time_signature();
    let num_ticks = compute_loop_end(session);
    let ticks_per_denominator = ts.ticks_per_denominator();
    let ticks_per_bar = ts.ticks_per_bar();
    let num_bars = num_ticks / ticks_per_bar;

    let mut grid = vec![false; num_ticks as usize];
    for event in session.events_with_sample(sample) {
        if (event.time_stamp as usize) < grid.len() {
            grid[event.time_stamp as usize] = true;
        }
    }

    let mut out = String::from("|");
    for bar in 0..num_bars {
        for beat in 0..ts.numerator as u64 {
            for tick in 0..ticks_per_denominator {
                let index = bar * ticks_per_bar + beat * ticks_per_denominator + tick;
                out.push(if grid[index as usize] { 'x' } else { '.' });
            }
            out.push(' ');
        }
        out.pop();
        out.push('|');
    }
    out
}

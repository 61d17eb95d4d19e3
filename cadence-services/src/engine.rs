// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! The lifecycle owner: wires a [`SessionEditor`] to a [`Sequencer`] and an
//! [`EventHandler`], and gives a caller one place to drive the whole system
//! from.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use cadence_core::editor::SessionEditor;
use cadence_core::sample::SpectralPosition;
use cadence_core::session::Session;

use crate::document;
use crate::event_handler::EventHandler;
use crate::midi_export;
use crate::sequencer::{Sequencer, SharedEditor, SharedEventHandler};

/// Owns the session (via its editor façade), the sequencer thread, and the
/// event handler, and exposes the full command surface a console UI or any
/// other caller would drive: start/stop playback, every editing operation,
/// undo/redo, and session replacement.
pub struct Engine {
    editor: SharedEditor,
    sequencer: Option<Sequencer>,
}

impl Engine {
    /// `event_handler` is boxed, not shared, on the way in: the `Engine`
    /// alone decides when and how it's installed (via [`Sequencer`]'s shared
    /// slot), so callers never hold a second handle to it that could be
    /// mutated out from under the sequencer.
    pub fn new(session: Session, event_handler: Box<dyn EventHandler>) -> Self {
        let editor: SharedEditor = Arc::new(Mutex::new(SessionEditor::new(session)));
        let event_handler: SharedEventHandler = Arc::new(Mutex::new(event_handler));
        let sequencer = Sequencer::new(Arc::clone(&editor), event_handler);
        Self {
            editor,
            sequencer: Some(sequencer),
        }
    }

    pub fn start_playback(&self) {
        self.sequencer().start_playback();
    }

    pub fn stop_playback(&self) {
        self.sequencer().stop_playback();
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer().is_playing()
    }

    pub fn rewind(&self) {
        self.sequencer().rewind();
    }

    /// Swaps in a whole new session, following the sequencer's atomic-swap
    /// protocol (pause, detach, notify the handler, reattach, resume).
    pub fn load_session(&self, session: Session) {
        self.sequencer().load_session(session);
    }

    pub fn add_sample(&self, name: &str, file_path: &str, spectral_position: SpectralPosition) {
        self.editor
            .lock()
            .unwrap()
            .add_sample(name, file_path, spectral_position);
    }

    pub fn remove_sample(&self, name: &str) {
        self.editor.lock().unwrap().remove_sample(name);
    }

    pub fn add_event(&self, sample_name: &str, bar: u64, beat: u64, tick: u64) {
        self.editor
            .lock()
            .unwrap()
            .add_event(sample_name, bar, beat, tick);
    }

    pub fn remove_event(&self, sample_name: &str, bar: u64, beat: u64, tick: u64) {
        self.editor
            .lock()
            .unwrap()
            .remove_event(sample_name, bar, beat, tick);
    }

    pub fn remove_all_events(&self) {
        self.editor.lock().unwrap().remove_all_events();
    }

    pub fn remove_all_events_with_sample(&self, sample_name: &str) {
        self.editor
            .lock()
            .unwrap()
            .remove_all_events_with_sample(sample_name);
    }

    pub fn change_tempo(&self, tempo_bpm: f64) {
        self.editor.lock().unwrap().change_tempo(tempo_bpm);
    }

    pub fn change_time_signature(&self, numerator: u32, denominator: u32, ticks_per_quarter_note: u32) {
        self.editor
            .lock()
            .unwrap()
            .change_time_signature(numerator, denominator, ticks_per_quarter_note);
    }

    pub fn euclidean_for_sample(&self, sample_name: &str, num_events: u32) {
        self.editor
            .lock()
            .unwrap()
            .euclidean_for_sample(sample_name, num_events);
    }

    pub fn rotate_sample(&self, sample_name: &str, amount: i64) {
        self.editor.lock().unwrap().rotate_sample(sample_name, amount);
    }

    pub fn generate_sequence(&self) {
        self.editor.lock().unwrap().generate_sequence();
    }

    pub fn change_spectral_position(&self, sample_name: &str, spectral_position: SpectralPosition) {
        self.editor
            .lock()
            .unwrap()
            .change_spectral_position(sample_name, spectral_position);
    }

    pub fn undo(&self) {
        self.editor.lock().unwrap().undo();
    }

    pub fn redo(&self) {
        self.editor.lock().unwrap().redo();
    }

    /// Replaces the event handler and immediately informs it of every
    /// sample currently in the session. Delegates to the sequencer, which
    /// owns the shared handler slot the worker thread actually dispatches
    /// through — see [`Sequencer::set_event_handler`].
    pub fn set_event_handler(&self, event_handler: Box<dyn EventHandler>) {
        self.sequencer().set_event_handler(event_handler);
    }

    pub fn to_formatted_string(&self) -> String {
        self.editor.lock().unwrap().to_formatted_string()
    }

    /// Writes the current session to `path` as the JSON document described
    /// in `SPEC_FULL.md` §6.
    pub fn export_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let editor = self.editor.lock().unwrap();
        document::store_to_path(editor.session(), path).context("exporting session as JSON")
    }

    /// Loads a JSON document from `path` and atomically swaps it in as the
    /// live session (see [`Sequencer::load_session`]'s protocol). A parse
    /// failure never touches the live session.
    pub fn import_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let session = document::load_from_path(path).context("importing session from JSON")?;
        self.load_session(session);
        Ok(())
    }

    /// Writes the current session to `path` as a Standard MIDI File.
    pub fn export_midi(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let editor = self.editor.lock().unwrap();
        midi_export::export_to_path(editor.session(), path).context("exporting session as MIDI")
    }

    fn sequencer(&self) -> &Sequencer {
        self.sequencer
            .as_ref()
            .expect("sequencer is only taken during shut_down")
    }

    /// Signals the sequencer thread to exit and joins it. After this call,
    /// further calls to the playback-related methods are undefined — the
    /// engine is meant to be dropped immediately afterward.
    pub fn shut_down(&mut self) {
        if let Some(sequencer) = self.sequencer.take() {
            sequencer.shut_down();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::event::Event;
    use cadence_core::sample::Sample;

    struct NullHandler;
    impl EventHandler for NullHandler {
        fn add_sample(&mut self, _sample: &Sample) {}
        fn remove_sample(&mut self, _sample: &Sample) {}
        fn handle(&mut self, _event: &Event) {}
    }

    struct RecordingHandler {
        added: std::sync::mpsc::Sender<String>,
        handled: std::sync::mpsc::Sender<String>,
    }
    impl EventHandler for RecordingHandler {
        fn add_sample(&mut self, sample: &Sample) {
            let _ = self.added.send(sample.name.clone());
        }
        fn remove_sample(&mut self, _sample: &Sample) {}
        fn handle(&mut self, event: &Event) {
            let _ = self.handled.send(event.sample_name.clone());
        }
    }

    #[test]
    fn set_event_handler_replaces_the_handler_the_sequencer_dispatches_to() {
        let mut engine = Engine::new(Session::new(), Box::new(NullHandler));
        engine.add_sample("kick", "kick.wav", SpectralPosition::Low);
        engine.add_event("kick", 0, 0, 0);

        let (added_tx, added_rx) = std::sync::mpsc::channel();
        let (handled_tx, handled_rx) = std::sync::mpsc::channel();
        engine.set_event_handler(Box::new(RecordingHandler {
            added: added_tx,
            handled: handled_tx,
        }));
        // the swap itself informs the new handler of every existing sample
        assert_eq!(added_rx.try_recv().unwrap(), "kick");

        engine.start_playback();
        let received = handled_rx
            .recv_timeout(std::time::Duration::from_secs(2))
            .expect("worker thread should dispatch to the newly installed handler");
        assert_eq!(received, "kick");
        engine.shut_down();
    }

    #[test]
    fn facade_methods_reach_the_underlying_session() {
        let mut engine = Engine::new(Session::new(), Box::new(NullHandler));
        engine.add_sample("kick", "kick.wav", SpectralPosition::Low);
        engine.add_event("kick", 0, 0, 0);
        assert!(engine.to_formatted_string().contains("kick(l)"));
        engine.undo();
        engine.undo();
        assert!(!engine.to_formatted_string().contains("kick(l)"));
        engine.shut_down();
    }

    #[test]
    fn load_session_replaces_samples_and_events() {
        let mut engine = Engine::new(Session::new(), Box::new(NullHandler));
        engine.add_sample("kick", "kick.wav", SpectralPosition::Low);

        let mut next = Session::new();
        next.add_sample(Sample::new("snare", "snare.wav", SpectralPosition::Mid));
        engine.load_session(next);

        assert!(engine.to_formatted_string().contains("snare(m)"));
        assert!(!engine.to_formatted_string().contains("kick"));
        engine.shut_down();
    }

    #[test]
    fn change_spectral_position_is_reachable_from_the_engine() {
        let mut engine = Engine::new(Session::new(), Box::new(NullHandler));
        engine.add_sample("kick", "kick.wav", SpectralPosition::Low);
        engine.change_spectral_position("kick", SpectralPosition::High);
        assert!(engine.to_formatted_string().contains("kick(h)"));
        engine.shut_down();
    }

    #[test]
    fn json_export_then_import_round_trips_through_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut engine = Engine::new(Session::new(), Box::new(NullHandler));
        engine.add_sample("kick", "kick.wav", SpectralPosition::Low);
        engine.add_event("kick", 0, 0, 0);
        engine.export_json(&path).unwrap();

        let mut reloading_engine = Engine::new(Session::new(), Box::new(NullHandler));
        reloading_engine.import_json(&path).unwrap();
        assert!(reloading_engine.to_formatted_string().contains("kick(l)"));

        engine.shut_down();
        reloading_engine.shut_down();
    }

    #[test]
    fn midi_export_writes_a_parseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.mid");

        let mut engine = Engine::new(Session::new(), Box::new(NullHandler));
        engine.add_sample("kick", "kick.wav", SpectralPosition::Low);
        engine.add_event("kick", 0, 0, 0);
        engine.export_midi(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        midly::Smf::parse(&bytes).expect("exported file should be valid SMF");
        engine.shut_down();
    }
}

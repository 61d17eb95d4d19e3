// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! The real-time playback loop: a background thread that walks a
//! [`PlayHead`] across a shared session, dispatching due events to an
//! [`EventHandler`] and reacting live to session mutations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cadence_core::editor::SessionEditor;
use cadence_core::event::Event;
use cadence_core::play_head::PlayHead;
use cadence_core::sample::Sample;
use cadence_core::session::{compute_loop_end, Session, SessionObserver};
use cadence_core::time::TimeSignature;
use tracing::{debug, trace};

use crate::clock::{tick_time_ms, Clock};
use crate::event_handler::EventHandler;

/// Shared ownership of the editor (and, through it, the session it owns) —
/// the single handle both the control thread and the sequencer thread hold.
pub type SharedEditor = Arc<Mutex<SessionEditor>>;
/// A replaceable slot for the pluggable playback consumer.
///
/// Every holder — the worker thread, the [`SequencerObserver`], and
/// [`crate::engine::Engine`] — keeps a clone of the same `Arc`, so installing
/// a new handler is a matter of locking this mutex and overwriting its
/// contents, not rebinding anyone's `Arc`. A plain `Arc<Mutex<dyn
/// EventHandler>>` can't be swapped this way: reassigning one holder's `Arc`
/// only rebinds that holder's own pointer, leaving everyone else's clone
/// pointing at the old handler.
pub type SharedEventHandler = Arc<Mutex<Box<dyn EventHandler>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayState {
    Stopped,
    Playing,
}

/// Engine-internal bookkeeping: playhead, clock, cached loop end, and play
/// state. Guarded by its own mutex, independent from the one guarding the
/// session — the two are never nested, so there is no lock-ordering hazard
/// between the worker thread and the observer callback that runs on the
/// editor's thread.
struct SequencerState {
    play_state: PlayState,
    playhead: PlayHead,
    clock: Clock,
    loop_dirty: bool,
    tempo_bpm: f64,
    ticks_per_quarter_note: u32,
}

impl SequencerState {
    fn new(time_signature: TimeSignature, tempo_bpm: f64) -> Self {
        let tick_time = tick_time_ms(time_signature.ticks_per_quarter_note, tempo_bpm);
        Self {
            play_state: PlayState::Stopped,
            playhead: PlayHead::new(),
            clock: Clock::new(tick_time),
            loop_dirty: true,
            tempo_bpm,
            ticks_per_quarter_note: time_signature.ticks_per_quarter_note,
        }
    }

    fn recompute_tick_period(&mut self) {
        let tick_time = tick_time_ms(self.ticks_per_quarter_note, self.tempo_bpm);
        self.clock.update_tick_time_ms(tick_time);
    }
}

/// Registered on the [`Session`] via [`Session::add_observer`]; reacts to
/// mutations without ever touching the session lock itself — it only holds
/// clones of the sequencer's own internal `Arc`s, so it can never nest a
/// session-lock acquisition inside another lock or vice versa.
struct SequencerObserver {
    state: Arc<Mutex<SequencerState>>,
    event_handler: SharedEventHandler,
}

impl SessionObserver for SequencerObserver {
    fn sample_added(&mut self, sample: &Sample) {
        self.event_handler.lock().unwrap().add_sample(sample);
    }

    fn sample_removed(&mut self, sample: &Sample) {
        self.event_handler.lock().unwrap().remove_sample(sample);
    }

    fn event_added(&mut self, _event: &Event) {
        self.state.lock().unwrap().loop_dirty = true;
    }

    fn event_removed(&mut self, _event: &Event) {
        self.state.lock().unwrap().loop_dirty = true;
    }

    fn time_signature_changed(&mut self, time_signature: &TimeSignature) {
        let mut state = self.state.lock().unwrap();
        state.ticks_per_quarter_note = time_signature.ticks_per_quarter_note;
        state.loop_dirty = true;
        state.recompute_tick_period();
    }

    fn tempo_changed(&mut self, tempo_bpm: f64) {
        let mut state = self.state.lock().unwrap();
        state.tempo_bpm = tempo_bpm;
        state.recompute_tick_period();
    }
}

/// The handle half of the sequencer's handle/worker split. Dropping this
/// without calling [`Self::shut_down`] leaves the worker thread running
/// (detached) until the process exits — always prefer `shut_down`.
pub struct Sequencer {
    editor: SharedEditor,
    state: Arc<Mutex<SequencerState>>,
    event_handler: SharedEventHandler,
    keep_running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Sequencer {
    /// Builds a sequencer bound to `editor`'s session, spawns its worker
    /// thread, and registers its observer on that session.
    pub fn new(editor: SharedEditor, event_handler: SharedEventHandler) -> Self {
        let (time_signature, tempo_bpm) = {
            let guard = editor.lock().unwrap();
            (guard.session().time_signature(), guard.session().tempo_bpm())
        };
        let state = Arc::new(Mutex::new(SequencerState::new(time_signature, tempo_bpm)));

        Self::attach_observer(&editor, &state, &event_handler);
        Self::notify_handler_of_all_samples(&editor, &event_handler);

        let keep_running = Arc::new(AtomicBool::new(true));
        let thread = {
            let editor = Arc::clone(&editor);
            let state = Arc::clone(&state);
            let event_handler = Arc::clone(&event_handler);
            let keep_running = Arc::clone(&keep_running);
            thread::spawn(move || run(editor, state, event_handler, keep_running))
        };

        Self {
            editor,
            state,
            event_handler,
            keep_running,
            thread: Some(thread),
        }
    }

    fn attach_observer(
        editor: &SharedEditor,
        state: &Arc<Mutex<SequencerState>>,
        event_handler: &SharedEventHandler,
    ) {
        let observer = SequencerObserver {
            state: Arc::clone(state),
            event_handler: Arc::clone(event_handler),
        };
        editor
            .lock()
            .unwrap()
            .add_session_observer(Box::new(observer));
    }

    fn notify_handler_of_all_samples(editor: &SharedEditor, event_handler: &SharedEventHandler) {
        let guard = editor.lock().unwrap();
        let mut handler = event_handler.lock().unwrap();
        for sample in guard.session().samples() {
            handler.add_sample(sample);
        }
    }

    pub fn start_playback(&self) {
        let mut state = self.state.lock().unwrap();
        state.clock.start();
        state.play_state = PlayState::Playing;
    }

    pub fn stop_playback(&self) {
        self.state.lock().unwrap().play_state = PlayState::Stopped;
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().play_state == PlayState::Playing
    }

    pub fn rewind(&self) {
        self.state.lock().unwrap().playhead.rewind();
    }

    /// Installs `new_handler` in place of whatever handler is currently
    /// installed, informs it of every sample in the session, and releases
    /// the old handler. Because every holder of [`SharedEventHandler`]
    /// shares this same `Arc<Mutex<_>>` slot, the worker thread's next
    /// `handle` call and every future `sample_added`/`sample_removed`
    /// observer notification see the new handler immediately.
    pub fn set_event_handler(&self, mut new_handler: Box<dyn EventHandler>) {
        let guard = self.editor.lock().unwrap();
        for sample in guard.session().samples() {
            new_handler.add_sample(sample);
        }
        *self.event_handler.lock().unwrap() = new_handler;
    }

    /// Replaces the underlying session with `new_session`, following the
    /// atomic-swap protocol: pause playback if running, drop the old
    /// session's observer along with the session itself, tell the handler
    /// to release every old sample and load every new one, recompute loop
    /// end and tick period, rewind, and resume playback if it had been
    /// running.
    pub fn load_session(&self, new_session: Session) {
        let was_playing = self.is_playing();
        if was_playing {
            self.stop_playback();
        }

        let old_samples: Vec<Sample> = {
            let guard = self.editor.lock().unwrap();
            guard.session().samples().to_vec()
        };
        {
            let mut handler = self.event_handler.lock().unwrap();
            for sample in &old_samples {
                handler.remove_sample(sample);
            }
        }

        {
            let mut guard = self.editor.lock().unwrap();
            guard.replace_session(new_session);
        }
        Self::attach_observer(&self.editor, &self.state, &self.event_handler);
        Self::notify_handler_of_all_samples(&self.editor, &self.event_handler);

        let (time_signature, tempo_bpm) = {
            let guard = self.editor.lock().unwrap();
            (guard.session().time_signature(), guard.session().tempo_bpm())
        };
        {
            let mut state = self.state.lock().unwrap();
            state.ticks_per_quarter_note = time_signature.ticks_per_quarter_note;
            state.tempo_bpm = tempo_bpm;
            state.recompute_tick_period();
            state.loop_dirty = true;
            state.playhead.rewind();
        }

        if was_playing {
            self.start_playback();
        }
    }

    /// Signals the worker thread to exit and joins it. The thread exits
    /// within about 10ms (the stopped-state poll interval) if stopped, or
    /// within the current tick period if playing.
    pub fn shut_down(mut self) {
        self.keep_running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run(
    editor: SharedEditor,
    state: Arc<Mutex<SequencerState>>,
    event_handler: SharedEventHandler,
    keep_running: Arc<AtomicBool>,
) {
    debug!("sequencer thread starting");
    while keep_running.load(Ordering::Relaxed) {
        let play_state = state.lock().unwrap().play_state;
        if play_state != PlayState::Playing {
            thread::sleep(Duration::from_millis(10));
            continue;
        }

        refresh_loop_bounds_if_dirty(&editor, &state);

        let position = state.lock().unwrap().playhead.position();
        let due_events: Vec<Event> = {
            let guard = editor.lock().unwrap();
            guard.session().events_at(position).cloned().collect()
        };
        for event in &due_events {
            trace!(sample = %event.sample_name, tick = position, "dispatching event");
            event_handler.lock().unwrap().handle(event);
        }

        state.lock().unwrap().playhead.advance();
        block_until_next_tick(&state);
    }
    debug!("sequencer thread exiting");
}

fn refresh_loop_bounds_if_dirty(editor: &SharedEditor, state: &Arc<Mutex<SequencerState>>) {
    let is_dirty = state.lock().unwrap().loop_dirty;
    if !is_dirty {
        return;
    }
    let loop_end = {
        let guard = editor.lock().unwrap();
        compute_loop_end(guard.session())
    };
    let mut state = state.lock().unwrap();
    state.playhead.set_looping(0, loop_end);
    state.loop_dirty = false;
}

/// Steps the shared clock forward in ~1ms slices without ever holding its
/// lock while sleeping, so a tempo change from the editor thread is never
/// blocked for longer than a single slice.
fn block_until_next_tick(state: &Arc<Mutex<SequencerState>>) {
    loop {
        let reached = state.lock().unwrap().clock.is_deadline_reached();
        if reached {
            state.lock().unwrap().clock.advance_deadline();
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::sample::SpectralPosition;
    use std::sync::mpsc;

    struct RecordingHandler {
        added: mpsc::Sender<String>,
        handled: mpsc::Sender<String>,
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
    fn new_sequencer_notifies_handler_of_existing_samples() {
        let mut session = Session::new();
        session.add_sample(Sample::new("kick", "kick.wav", SpectralPosition::Low));
        let editor: SharedEditor = Arc::new(Mutex::new(SessionEditor::new(session)));

        let (added_tx, added_rx) = mpsc::channel();
        let (handled_tx, _handled_rx) = mpsc::channel();
        let handler: SharedEventHandler = Arc::new(Mutex::new(Box::new(RecordingHandler {
            added: added_tx,
            handled: handled_tx,
        })));

        let sequencer = Sequencer::new(editor, handler);
        assert_eq!(added_rx.try_recv().unwrap(), "kick");
        sequencer.shut_down();
    }

    #[test]
    fn playback_dispatches_events_at_tick_zero() {
        let mut session = Session::new();
        session.add_sample(Sample::new("kick", "kick.wav", SpectralPosition::Low));
        session.add_event(Event::new("kick", 0));
        let editor: SharedEditor = Arc::new(Mutex::new(SessionEditor::new(session)));

        let (added_tx, _added_rx) = mpsc::channel();
        let (handled_tx, handled_rx) = mpsc::channel();
        let handler: SharedEventHandler = Arc::new(Mutex::new(Box::new(RecordingHandler {
            added: added_tx,
            handled: handled_tx,
        })));

        let sequencer = Sequencer::new(editor, handler);
        sequencer.start_playback();
        let received = handled_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(received, "kick");
        sequencer.shut_down();
    }

    #[test]
    fn stopped_sequencer_does_not_advance_playhead() {
        let session = Session::new();
        let editor: SharedEditor = Arc::new(Mutex::new(SessionEditor::new(session)));
        let (added_tx, _) = mpsc::channel();
        let (handled_tx, _) = mpsc::channel();
        let handler: SharedEventHandler = Arc::new(Mutex::new(Box::new(RecordingHandler {
            added: added_tx,
            handled: handled_tx,
        })));
        let sequencer = Sequencer::new(editor, handler);
        assert!(!sequencer.is_playing());
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sequencer.state.lock().unwrap().playhead.position(), 0);
        sequencer.shut_down();
    }
}

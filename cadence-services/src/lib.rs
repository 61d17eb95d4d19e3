// Copyright (c) 2026 Cadence Authors. All rights reserved.

#![warn(missing_docs)]

//! The threaded, I/O-facing half of the Cadence step sequencer: the
//! real-time playback loop, session persistence, and MIDI export, all built
//! on top of [`cadence-core`](https://docs.rs/cadence-core)'s thread-agnostic
//! session model.

/// Deadline-based tick clock, immune to cumulative drift.
pub mod clock;
/// Document storage format for session persistence.
pub mod document;
/// The lifecycle owner: wires a [`SessionEditor`](cadence_core::editor::SessionEditor)
/// to a sequencer and an event handler.
pub mod engine;
/// The sink a sequencer dispatches due events to.
pub mod event_handler;
/// Standard MIDI File export.
pub mod midi_export;
/// The real-time playback thread.
pub mod sequencer;

/// Recommended imports for driving a session end to end.
pub mod prelude {
    pub use crate::clock::{tick_time_ms, Clock};
    pub use crate::document::{load_from_path, store_to_path, DocumentError};
    pub use crate::engine::Engine;
    pub use crate::event_handler::EventHandler;
    pub use crate::midi_export::{export_to_path, session_to_midi_bytes};
    pub use crate::sequencer::{Sequencer, SharedEditor, SharedEventHandler};
}

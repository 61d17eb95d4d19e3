// Copyright (c) 2026 Cadence Authors. All rights reserved.

#![warn(missing_docs)]

//! Session model, musical time algebra, and the undoable edit engine behind
//! the Cadence step sequencer.
//!
//! This crate has no threads, no I/O, and no clock of its own — it's the
//! pure data model that [`cadence-services`](https://docs.rs/cadence-services)
//! drives with a real-time sequencer loop and persists to disk.

/// Reversible session mutations and the undo/redo stack that replays them.
pub mod edit;
/// High-level, name-based editing façade built on top of [`edit`].
pub mod editor;
/// Bresenham-style even distribution of events over a fixed number of ticks.
pub mod euclidean;
/// Triggered samples: identity, timing, and MIDI metadata.
pub mod event;
/// Playback position cursor, with optional looping.
pub mod play_head;
/// A small seedable PRNG, used only by randomized rhythm generation.
pub mod rng;
/// Sound sources: identity and spectral classification.
pub mod sample;
/// The session aggregate and its change-notification protocol.
pub mod session;
/// Tick-based musical time arithmetic.
pub mod time;

/// Recommended imports for working with a session end to end.
pub mod prelude {
    pub use crate::edit::{Edit, EditManager};
    pub use crate::editor::SessionEditor;
    pub use crate::euclidean::distribute;
    pub use crate::event::Event;
    pub use crate::play_head::PlayHead;
    pub use crate::rng::Rng;
    pub use crate::sample::{Sample, SpectralPosition};
    pub use crate::session::{Session, SessionObserver};
    pub use crate::time::{wrap, Tick, TimeSignature};
}

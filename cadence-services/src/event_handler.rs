// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! The pluggable consumer of sample lifecycle and per-tick trigger events.
//!
//! Binding this to an actual playback library is explicitly out of scope —
//! this trait is the entire contract a real audio backend would implement.

use cadence_core::event::Event;
use cadence_core::sample::Sample;

/// Consumes sample-lifecycle notifications and per-tick trigger events.
///
/// `add_sample`/`remove_sample` are only ever invoked from the editor thread
/// (as a direct consequence of a [`Session`](cadence_core::session::Session)
/// observer notification) and may perform I/O, such as loading a wave file.
/// `handle` is only ever invoked from the sequencer thread, once per due
/// event per tick, and should be safe to call without blocking — the
/// sequencer's pacing depends on it returning promptly.
///
/// Implementations that need to guard shared per-sample resources between
/// these two call sites (e.g. a `HashMap` of loaded buffers) must do so with
/// their own internal lock; this trait makes no promise that the two call
/// sites are mutually exclusive beyond "never the same thread".
pub trait EventHandler: Send {
    fn add_sample(&mut self, sample: &Sample);
    fn remove_sample(&mut self, sample: &Sample);
    fn handle(&mut self, event: &Event);
}

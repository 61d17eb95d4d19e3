// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Standard MIDI File export.
//!
//! A session's events are rendered onto a single drum track: note numbers
//! are assigned per sample from a small fixed pool keyed by spectral
//! position, falling back to a derived note once a pool runs dry. This
//! mirrors a quirk of the original note-assignment table rather than
//! picking notes "properly" (e.g. by a full GM drum map) — the fallback
//! notes (30/31/32) sit right below the pools and can collide with pool
//! notes from a different position, which is a known wart, not a bug.

use std::collections::HashMap;
use std::io;

use cadence_core::sample::{Sample, SpectralPosition};
use cadence_core::session::Session;
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

/// 0-indexed MIDI channel reserved for drums.
const DRUM_CHANNEL: u4 = u4::new(9);

const LOW_NOTES: [u8; 3] = [35, 36, 41];
const MID_NOTES: [u8; 3] = [38, 39, 40];
const HIGH_NOTES: [u8; 4] = [42, 44, 46, 53];

/// Assigns each sample a fixed MIDI note number, drawn from a pool keyed by
/// its spectral position and consumed in sample order. A spectral position
/// with more samples than pool entries falls back to
/// `spectral_position + 30` for the overflow.
fn distribute_midi_notes(samples: &[Sample]) -> HashMap<String, u8> {
    let mut low = LOW_NOTES.iter();
    let mut mid = MID_NOTES.iter();
    let mut high = HIGH_NOTES.iter();

    samples
        .iter()
        .map(|sample| {
            let pool = match sample.spectral_position {
                SpectralPosition::Low => low.next(),
                SpectralPosition::Mid => mid.next(),
                SpectralPosition::High => high.next(),
            };
            let note = pool
                .copied()
                .unwrap_or(sample.spectral_position.to_wire() + 30);
            (sample.name.clone(), note)
        })
        .collect()
}

fn time_signature_meta(session: &Session) -> MetaMessage<'static> {
    let ts = session.time_signature();
    let denominator_power = (ts.denominator as f64).log2().round() as u8;
    MetaMessage::TimeSignature(ts.numerator as u8, denominator_power, 24, 8)
}

fn tempo_meta(session: &Session) -> MetaMessage<'static> {
    let microseconds_per_quarter = (60_000_000.0 / session.tempo_bpm()).round() as u32;
    MetaMessage::Tempo(u24::new(microseconds_per_quarter))
}

/// Renders a session to Standard MIDI File bytes: a single drum track
/// carrying a track name, the time signature, the tempo, and a note on/off
/// pair for every event. `ticks_per_quarter_note` becomes the file's pulses-
/// per-quarter-note resolution directly, since a [`Tick`](cadence_core::time::Tick)
/// is already measured at that resolution.
pub fn session_to_midi_bytes(session: &Session) -> Vec<u8> {
    let notes = distribute_midi_notes(session.samples());
    let ticks_per_quarter_note = session.time_signature().ticks_per_quarter_note;

    let mut timed: Vec<(u64, TrackEventKind<'static>)> = Vec::new();
    timed.push((0, TrackEventKind::Meta(MetaMessage::TrackName(b"cadence"))));
    timed.push((0, TrackEventKind::Meta(time_signature_meta(session))));
    timed.push((0, TrackEventKind::Meta(tempo_meta(session))));

    for event in session.events() {
        let key = u7::new(*notes.get(&event.sample_name).unwrap_or(&event.midi_note));
        let on_tick = event.time_stamp;
        let off_tick = on_tick + (event.duration * ticks_per_quarter_note as f64).round() as u64;

        timed.push((
            on_tick,
            TrackEventKind::Midi {
                channel: DRUM_CHANNEL,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(event.velocity),
                },
            },
        ));
        timed.push((
            off_tick,
            TrackEventKind::Midi {
                channel: DRUM_CHANNEL,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        ));
    }

    // Stable sort keeps the meta events (pushed at tick 0, in a fixed order)
    // ahead of any note event that also lands on tick 0.
    timed.sort_by_key(|(tick, _)| *tick);

    let mut track = Vec::with_capacity(timed.len() + 1);
    let mut last_tick = 0u64;
    for (tick, kind) in timed {
        let delta = tick - last_tick;
        track.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind,
        });
        last_tick = tick;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(ticks_per_quarter_note as u16)),
        },
        tracks: vec![track],
    };

    let mut buffer = Vec::new();
    smf.write(&mut buffer)
        .expect("writing to an in-memory buffer cannot fail");
    buffer
}

pub fn export_to_path(session: &Session, path: impl AsRef<std::path::Path>) -> io::Result<()> {
    std::fs::write(path, session_to_midi_bytes(session))
}

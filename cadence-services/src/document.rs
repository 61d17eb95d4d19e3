// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Session persistence as a structured JSON document.
//!
//! The on-disk shape is a fixed contract, including a historical misspelling
//! (`denumerator`) that must round-trip unchanged even though the in-memory
//! field is correctly spelled `denominator`.

use std::io::{Read, Write};

use cadence_core::event::Event;
use cadence_core::sample::{Sample, SpectralPosition};
use cadence_core::session::Session;
use cadence_core::time::TimeSignature;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures loading or storing a session document. Loading never installs a
/// partial session: the whole document is parsed and validated before any
/// [`Session`] is constructed, so a caller either gets a complete session or
/// an error, never something in between.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not read session document")]
    Io(#[from] std::io::Error),
    #[error("session document is malformed")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct SampleDocument {
    name: String,
    path: String,
    spectral_position: u8,
}

impl From<&Sample> for SampleDocument {
    fn from(sample: &Sample) -> Self {
        Self {
            name: sample.name.clone(),
            path: sample.file_path.clone(),
            spectral_position: sample.spectral_position.to_wire(),
        }
    }
}

impl From<SampleDocument> for Sample {
    fn from(doc: SampleDocument) -> Self {
        Sample::new(doc.name, doc.path, SpectralPosition::from_wire(doc.spectral_position))
    }
}

#[derive(Serialize, Deserialize)]
struct EventDocument {
    sample: SampleDocument,
    time_stamp: u64,
    duration: f64,
    midi_note: u8,
    velocity: u8,
}

#[derive(Serialize, Deserialize)]
struct TimeSignatureDocument {
    numerator: u32,
    #[serde(rename = "denumerator")]
    denominator: u32,
    ticks_per_quarter_note: u32,
}

impl From<TimeSignature> for TimeSignatureDocument {
    fn from(ts: TimeSignature) -> Self {
        Self {
            numerator: ts.numerator,
            denominator: ts.denominator,
            ticks_per_quarter_note: ts.ticks_per_quarter_note,
        }
    }
}

impl From<TimeSignatureDocument> for TimeSignature {
    fn from(doc: TimeSignatureDocument) -> Self {
        TimeSignature::new(doc.numerator, doc.denominator, doc.ticks_per_quarter_note)
    }
}

#[derive(Serialize, Deserialize)]
struct SessionDocument {
    samples: Vec<SampleDocument>,
    events: Vec<EventDocument>,
    time_signature: TimeSignatureDocument,
    tempo: f64,
}

impl SessionDocument {
    fn from_session(session: &Session) -> Self {
        let samples_by_name = |name: &str| session.find_sample(name);
        Self {
            samples: session.samples().iter().map(SampleDocument::from).collect(),
            events: session
                .events()
                .iter()
                .filter_map(|e| {
                    samples_by_name(&e.sample_name).map(|sample| EventDocument {
                        sample: SampleDocument::from(sample),
                        time_stamp: e.time_stamp,
                        duration: e.duration,
                        midi_note: e.midi_note,
                        velocity: e.velocity,
                    })
                })
                .collect(),
            time_signature: session.time_signature().into(),
            tempo: session.tempo_bpm(),
        }
    }

    /// Builds a session directly from parsed document parts, bypassing the
    /// observer-notifying mutator API — sound here because no observer has
    /// been attached to a document-loaded session yet.
    ///
    /// Events whose embedded sample name doesn't appear in the top-level
    /// sample list are dropped rather than rejecting the whole document —
    /// the top-level list is authoritative, and this tolerance matches the
    /// existing-sample precondition `Session::add_event` would otherwise
    /// enforce one event at a time.
    fn into_session(self) -> Session {
        let samples: Vec<Sample> = self.samples.into_iter().map(Sample::from).collect();
        let known_names: std::collections::HashSet<&str> =
            samples.iter().map(|s| s.name.as_str()).collect();
        let events: Vec<Event> = self
            .events
            .into_iter()
            .filter(|e| known_names.contains(e.sample.name.as_str()))
            .map(|e| Event {
                sample_name: e.sample.name,
                time_stamp: e.time_stamp,
                duration: e.duration,
                midi_note: e.midi_note,
                velocity: e.velocity,
            })
            .collect();
        Session::from_parts(samples, events, self.time_signature.into(), self.tempo)
    }
}

pub fn load_from_reader(reader: impl Read) -> Result<Session, DocumentError> {
    let document: SessionDocument = serde_json::from_reader(reader)?;
    Ok(document.into_session())
}

pub fn store_to_writer(session: &Session, writer: impl Write) -> Result<(), DocumentError> {
    let document = SessionDocument::from_session(session);
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Session, DocumentError> {
    let file = std::fs::File::open(path)?;
    load_from_reader(file)
}

pub fn store_to_path(session: &Session, path: impl AsRef<std::path::Path>) -> Result<(), DocumentError> {
    let file = std::fs::File::create(path)?;
    store_to_writer(session, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::sample::SpectralPosition;

    fn sample_session() -> Session {
        let mut session = Session::new();
        session.add_sample(Sample::new("kick", "kick.wav", SpectralPosition::Low));
        session.add_sample(Sample::new("snare", "snare.wav", SpectralPosition::Mid));
        session.add_event(Event::new("kick", 0));
        session.add_event(Event::new("snare", 4));
        session.change_tempo(128.0);
        session
    }

    #[test]
    fn round_trips_through_json() {
        let original = sample_session();
        let mut buffer = Vec::new();
        store_to_writer(&original, &mut buffer).unwrap();
        let reloaded = load_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn wire_format_uses_the_historical_denumerator_key() {
        let original = sample_session();
        let mut buffer = Vec::new();
        store_to_writer(&original, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("\"denumerator\""));
        assert!(!text.contains("\"denominator\""));
    }

    #[test]
    fn malformed_json_is_rejected_without_installing_a_session() {
        let result = load_from_reader("not json".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn events_referencing_unknown_samples_are_dropped_on_load() {
        let text = r#"{
            "samples": [],
            "events": [{"sample": {"name": "ghost", "path": "g.wav", "spectral_position": 0},
                        "time_stamp": 0, "duration": 0.25, "midi_note": 60, "velocity": 127}],
            "time_signature": {"numerator": 4, "denumerator": 4, "ticks_per_quarter_note": 4},
            "tempo": 120.0
        }"#;
        let session = load_from_reader(text.as_bytes()).unwrap();
        assert_eq!(session.events().len(), 0);
    }
}

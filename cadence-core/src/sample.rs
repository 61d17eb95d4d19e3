// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Samples: the sound sources a session's events trigger.

use serde::{Deserialize, Serialize};

/// Coarse pitch/frequency class of a sample.
///
/// Used only by the euclidean generator to pick densities, and by MIDI
/// export to pick a note pool — the audio engine itself never inspects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectralPosition {
    Low,
    Mid,
    High,
}

impl SpectralPosition {
    /// The persisted `0|1|2` wire encoding.
    pub fn to_wire(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Mid => 1,
            Self::High => 2,
        }
    }

    /// Inverse of [`Self::to_wire`]. Unknown values fall back to `Low`,
    /// matching the tolerant-loader posture the rest of the document format
    /// takes.
    pub fn from_wire(value: u8) -> Self {
        match value {
            1 => Self::Mid,
            2 => Self::High,
            _ => Self::Low,
        }
    }

    /// The single-letter abbreviation used in [`SessionEditor`](crate::editor::SessionEditor)'s
    /// formatted rendering: `(l)`, `(m)`, `(h)`.
    pub fn abbreviation(self) -> char {
        match self {
            Self::Low => 'l',
            Self::Mid => 'm',
            Self::High => 'h',
        }
    }
}

/// A sound source. Identity and equality are by [`name`](Self::name) alone —
/// two samples with the same name are the same sample, regardless of path or
/// spectral position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub file_path: String,
    pub spectral_position: SpectralPosition,
}

impl Sample {
    pub fn new(
        name: impl Into<String>,
        file_path: impl Into<String>,
        spectral_position: SpectralPosition,
    ) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            spectral_position,
        }
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Sample {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_path_and_spectral_position() {
        let a = Sample::new("kick", "a.wav", SpectralPosition::Low);
        let b = Sample::new("kick", "b.wav", SpectralPosition::High);
        assert_eq!(a, b);
    }

    #[test]
    fn different_names_are_not_equal() {
        let a = Sample::new("kick", "a.wav", SpectralPosition::Low);
        let b = Sample::new("snare", "a.wav", SpectralPosition::Low);
        assert_ne!(a, b);
    }

    #[test]
    fn wire_round_trip() {
        for sp in [SpectralPosition::Low, SpectralPosition::Mid, SpectralPosition::High] {
            assert_eq!(SpectralPosition::from_wire(sp.to_wire()), sp);
        }
    }
}

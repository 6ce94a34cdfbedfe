//! Data model for a generated track.
//!
//! These structures capture everything the renderer needs: the shared time
//! grid, the section layout with its chord progressions, and the merged
//! note-event list. All times are in beats from the start of the track.

use serde::{Deserialize, Serialize};

use crate::chords::Chord;

/// Instrument tag on every note event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Drums,
    Bass,
    Piano,
    Lead,
}

impl Instrument {
    /// Merge-order priority when two events share an onset:
    /// drums before bass before piano before lead.
    pub fn priority(&self) -> u8 {
        match self {
            Instrument::Drums => 0,
            Instrument::Bass => 1,
            Instrument::Piano => 2,
            Instrument::Lead => 3,
        }
    }

    /// Suggested MIDI channel for the renderer (9 = GM percussion).
    pub fn channel(&self) -> u8 {
        match self {
            Instrument::Drums => 9,
            Instrument::Bass => 2,
            Instrument::Piano => 1,
            Instrument::Lead => 0,
        }
    }

    /// Suggested General MIDI program for the renderer.
    pub fn program(&self) -> u8 {
        match self {
            Instrument::Drums => 0,
            Instrument::Bass => 33, // Electric Bass (finger)
            Instrument::Piano => 0, // Acoustic Grand Piano
            Instrument::Lead => 0,
        }
    }
}

/// A single note. Immutable once emitted — the universal output unit of
/// every generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Onset in beats (section-relative while still inside a generator,
    /// absolute from track start after grid alignment).
    pub onset: f64,
    /// Duration in beats.
    pub duration: f64,
    /// MIDI note number.
    pub pitch: u8,
    /// MIDI velocity 1..=127.
    pub velocity: u8,
    pub instrument: Instrument,
}

/// The shared tempo / meter grid, fixed once per generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub tempo_bpm: f64,
    /// Time signature numerator (beats per bar).
    pub beats_per_bar: u32,
    /// Time signature denominator.
    pub beat_unit: u32,
}

impl TimeGrid {
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo_bpm
    }

    pub fn beats_to_seconds(&self, beats: f64) -> f64 {
        beats * self.seconds_per_beat()
    }

    /// Which bar (0-based) an absolute beat position falls in.
    pub fn bar_of(&self, beat: f64) -> u32 {
        (beat / self.beats_per_bar as f64).floor() as u32
    }
}

/// Structural role of a section within the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Intro,
    Verse,
    Hook,
    Bridge,
    Outro,
}

impl SectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Verse => "verse",
            SectionKind::Hook => "hook",
            SectionKind::Bridge => "bridge",
            SectionKind::Outro => "outro",
        }
    }
}

/// One chord and how long it sounds, in beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChordSpan {
    pub chord: Chord,
    pub beats: f64,
}

/// A structural segment of the track with its own chord progression.
/// Invariant: the spans sum exactly to `bars × beats_per_bar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub bars: u32,
    /// Absolute start of the section in beats, filled in at grid alignment.
    pub start_beat: f64,
    pub progression: Vec<ChordSpan>,
}

impl Section {
    /// Length of the section in beats for the given grid.
    pub fn beats(&self, grid: &TimeGrid) -> f64 {
        (self.bars * grid.beats_per_bar) as f64
    }

    /// Sum of the chord-span durations.
    pub fn progression_beats(&self) -> f64 {
        self.progression.iter().map(|s| s.beats).sum()
    }
}

/// Per-instrument output levels (0.0–1.0), carried to the renderer and
/// already folded into event velocities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMix {
    pub drums: f64,
    pub bass: f64,
    pub piano: f64,
    pub lead: f64,
}

impl InstrumentMix {
    pub fn level(&self, instrument: Instrument) -> f64 {
        match instrument {
            Instrument::Drums => self.drums,
            Instrument::Bass => self.bass,
            Instrument::Piano => self.piano,
            Instrument::Lead => self.lead,
        }
    }
}

impl Default for InstrumentMix {
    fn default() -> Self {
        // Drums as the reference level, bass just under, comping below that.
        Self {
            drums: 1.0,
            bass: 0.9,
            piano: 0.8,
            lead: 0.95,
        }
    }
}

/// The engine's single output artifact, handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub grid: TimeGrid,
    pub key_name: String,
    pub style: String,
    pub sections: Vec<Section>,
    /// All instruments merged, sorted by onset (ties broken by instrument
    /// priority: drums, bass, piano, lead).
    pub events: Vec<NoteEvent>,
    pub mix: InstrumentMix,
}

impl Track {
    /// Total length in beats (sum of the planned sections).
    pub fn total_beats(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| (s.bars * self.grid.beats_per_bar) as f64)
            .sum()
    }

    /// Total length in bars.
    pub fn total_bars(&self) -> u32 {
        self.sections.iter().map(|s| s.bars).sum()
    }

    /// Total length in seconds for the configured tempo.
    pub fn duration_seconds(&self) -> f64 {
        self.grid.beats_to_seconds(self.total_beats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_priority_order() {
        assert!(Instrument::Drums.priority() < Instrument::Bass.priority());
        assert!(Instrument::Bass.priority() < Instrument::Piano.priority());
        assert!(Instrument::Piano.priority() < Instrument::Lead.priority());
    }

    #[test]
    fn grid_conversions() {
        let grid = TimeGrid {
            tempo_bpm: 120.0,
            beats_per_bar: 4,
            beat_unit: 4,
        };
        assert_eq!(grid.seconds_per_beat(), 0.5);
        assert_eq!(grid.beats_to_seconds(8.0), 4.0);
        assert_eq!(grid.bar_of(0.0), 0);
        assert_eq!(grid.bar_of(3.99), 0);
        assert_eq!(grid.bar_of(4.0), 1);
    }
}

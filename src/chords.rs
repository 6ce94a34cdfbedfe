//! Chord vocabulary: quality symbols, interval sets, and harmonic roles.
//!
//! Every quality maps to a fixed, ordered set of semitone offsets from the
//! root — enough to express the jazz / neo-soul / funk palettes the style
//! presets draw from.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Chord quality: the intervallic type of a chord, independent of root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Maj7,
    Maj9,
    Min7,
    Min9,
    Min6,
    Dom7,
    Dom9,
    /// Altered dominant (7#9) — the jazz-funk "Hendrix" color.
    Dom7Sharp9,
    HalfDim7,
    Dim7,
    Sus4,
    Add9,
}

impl ChordQuality {
    /// Ordered semitone offsets from the root. Never empty for a registered
    /// quality.
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ChordQuality::Maj7 => &[0, 4, 7, 11],
            ChordQuality::Maj9 => &[0, 4, 7, 11, 14],
            ChordQuality::Min7 => &[0, 3, 7, 10],
            ChordQuality::Min9 => &[0, 3, 7, 10, 14],
            ChordQuality::Min6 => &[0, 3, 7, 9],
            ChordQuality::Dom7 => &[0, 4, 7, 10],
            ChordQuality::Dom9 => &[0, 4, 7, 10, 14],
            ChordQuality::Dom7Sharp9 => &[0, 4, 7, 10, 15],
            ChordQuality::HalfDim7 => &[0, 3, 6, 10],
            ChordQuality::Dim7 => &[0, 3, 6, 9],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Add9 => &[0, 4, 7, 14],
        }
    }

    /// Look up a quality by its registered symbol.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "maj7" => Ok(ChordQuality::Maj7),
            "maj9" => Ok(ChordQuality::Maj9),
            "min7" | "m7" => Ok(ChordQuality::Min7),
            "min9" | "m9" => Ok(ChordQuality::Min9),
            "min6" | "m6" => Ok(ChordQuality::Min6),
            "dom7" | "7" => Ok(ChordQuality::Dom7),
            "dom9" | "9" => Ok(ChordQuality::Dom9),
            "7#9" => Ok(ChordQuality::Dom7Sharp9),
            "m7b5" | "half_dim7" => Ok(ChordQuality::HalfDim7),
            "dim7" => Ok(ChordQuality::Dim7),
            "sus4" => Ok(ChordQuality::Sus4),
            "add9" => Ok(ChordQuality::Add9),
            other => Err(Error::UnknownChordQuality(other.to_string())),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ChordQuality::Maj7 => "maj7",
            ChordQuality::Maj9 => "maj9",
            ChordQuality::Min7 => "min7",
            ChordQuality::Min9 => "min9",
            ChordQuality::Min6 => "min6",
            ChordQuality::Dom7 => "dom7",
            ChordQuality::Dom9 => "dom9",
            ChordQuality::Dom7Sharp9 => "7#9",
            ChordQuality::HalfDim7 => "m7b5",
            ChordQuality::Dim7 => "dim7",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Add9 => "add9",
        }
    }
}

/// A chord's structural role in driving the progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicFunction {
    Tonic,
    Subdominant,
    Dominant,
    /// Passing / color chords outside the three primary functions
    /// (mediant, submediant used non-tonically).
    Secondary,
}

/// A concrete chord in a progression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Pitch class of the root (0 = C … 11 = B)
    pub root: u8,
    pub quality: ChordQuality,
    pub function: HarmonicFunction,
}

impl Chord {
    /// Build a chord, verifying the quality resolves to a non-empty
    /// interval set in the vocabulary.
    pub fn new(root: u8, quality: ChordQuality, function: HarmonicFunction) -> Result<Self> {
        if quality.intervals().is_empty() {
            return Err(Error::UnknownChordQuality(quality.symbol().to_string()));
        }
        Ok(Self {
            root: root % 12,
            quality,
            function,
        })
    }

    /// Absolute pitch classes of the chord tones.
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.quality
            .intervals()
            .iter()
            .map(|&iv| (self.root + iv) % 12)
            .collect()
    }

    /// Chord tones as MIDI pitches rooted in the given octave
    /// (octave 4 roots land in 60..=71).
    pub fn pitches_in_octave(&self, octave: i32) -> Vec<u8> {
        let base = (octave + 1) * 12 + self.root as i32;
        self.quality
            .intervals()
            .iter()
            .map(|&iv| (base + iv as i32).clamp(0, 127) as u8)
            .collect()
    }
}

impl std::fmt::Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
        ];
        write!(f, "{}{}", NAMES[(self.root % 12) as usize], self.quality.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_symbols_round_trip() {
        for q in [
            ChordQuality::Maj7,
            ChordQuality::Min7,
            ChordQuality::Dom7,
            ChordQuality::Min6,
            ChordQuality::HalfDim7,
            ChordQuality::Dim7,
            ChordQuality::Sus4,
            ChordQuality::Add9,
        ] {
            assert_eq!(ChordQuality::from_symbol(q.symbol()).unwrap(), q);
            assert!(!q.intervals().is_empty());
        }
    }

    #[test]
    fn unknown_symbol_rejected() {
        let err = ChordQuality::from_symbol("power5").unwrap_err();
        assert_eq!(err, Error::UnknownChordQuality("power5".to_string()));
    }

    #[test]
    fn chord_resolves_pitch_classes() {
        // G7 → G B D F
        let chord = Chord::new(7, ChordQuality::Dom7, HarmonicFunction::Dominant).unwrap();
        assert_eq!(chord.pitch_classes(), vec![7, 11, 2, 5]);
        assert_eq!(chord.to_string(), "Gdom7");
    }

    #[test]
    fn pitches_in_octave_are_clamped() {
        let chord = Chord::new(0, ChordQuality::Maj9, HarmonicFunction::Tonic).unwrap();
        let pitches = chord.pitches_in_octave(4);
        assert_eq!(pitches[0], 60);
        assert!(pitches.iter().all(|&p| p <= 127));
    }
}

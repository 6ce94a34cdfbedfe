//! Scale and key model: pitch-class sets for keys and modes.
//!
//! Pure lookup tables — a `Key` is created once per run from the resolved
//! configuration and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Scale mode. The interval tables are semitone offsets from the key root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
    Dorian,
}

impl Mode {
    /// Seven scale-degree offsets in semitones.
    pub fn intervals(&self) -> &'static [u8; 7] {
        match self {
            Mode::Major => &[0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Mode::Dorian => &[0, 2, 3, 5, 7, 9, 10],
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Major
    }
}

/// A key: root pitch class (0 = C … 11 = B) plus a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub root: u8,
    pub mode: Mode,
}

impl Key {
    pub fn new(root: u8, mode: Mode) -> Self {
        Self { root: root % 12, mode }
    }

    /// Which of the 12 pitch classes belong to this key.
    pub fn pitch_classes(&self) -> [bool; 12] {
        let mut present = [false; 12];
        for &iv in self.mode.intervals() {
            present[((self.root + iv) % 12) as usize] = true;
        }
        present
    }

    /// Pitch class of scale degree 0..=6. Out-of-range degrees are rejected.
    pub fn degree_pitch_class(&self, degree: usize) -> Option<u8> {
        let iv = self.mode.intervals().get(degree)?;
        Some((self.root + iv) % 12)
    }
}

/// Parse a key name like `"C"`, `"Db"`, `"F#"`, or `"Am"` into a pitch class.
/// A trailing `m` marks the key as minor and overrides the configured mode.
pub fn parse_key_name(name: &str) -> Option<(u8, Option<Mode>)> {
    let name = name.trim();
    let (body, mode) = match name.strip_suffix('m') {
        // "Ebm" → ("Eb", minor); bare "m" is not a key
        Some(rest) if !rest.is_empty() => (rest, Some(Mode::Minor)),
        _ => (name, None),
    };

    let mut chars = body.chars();
    let letter = chars.next()?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let alter: i32 = match chars.next() {
        None => 0,
        Some('b') => -1,
        Some('#') => 1,
        Some(_) => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(((base + alter).rem_euclid(12) as u8, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_scale_pitch_classes() {
        let key = Key::new(0, Mode::Major); // C major
        let pcs = key.pitch_classes();
        let expected = [
            true, false, true, false, true, true, false, true, false, true, false, true,
        ];
        assert_eq!(pcs, expected);
    }

    #[test]
    fn degree_lookup() {
        let key = Key::new(2, Mode::Minor); // D minor
        assert_eq!(key.degree_pitch_class(0), Some(2)); // D
        assert_eq!(key.degree_pitch_class(2), Some(5)); // F
        assert_eq!(key.degree_pitch_class(4), Some(9)); // A
        assert_eq!(key.degree_pitch_class(7), None);
    }

    #[test]
    fn key_name_parsing() {
        assert_eq!(parse_key_name("C"), Some((0, None)));
        assert_eq!(parse_key_name("Eb"), Some((3, None)));
        assert_eq!(parse_key_name("F#"), Some((6, None)));
        assert_eq!(parse_key_name("Am"), Some((9, Some(Mode::Minor))));
        assert_eq!(parse_key_name("Ebm"), Some((3, Some(Mode::Minor))));
        assert_eq!(parse_key_name("H"), None);
        assert_eq!(parse_key_name(""), None);
    }
}

//! Bass line generation: root-and-approach patterns over a progression.
//!
//! The first beat of every chord span always sounds the chord root — the
//! harmonic anchor the rest of the band hangs on. Weak beats pick a chord
//! tone, a chromatic approach into the next chord's root, an octave jump,
//! or a rest, weighted by style. Leaps wider than the style's maximum are
//! replaced with the nearest chord tone.

use rand::Rng;

use crate::config::StyleParams;
use crate::model::{ChordSpan, Instrument, NoteEvent};
use crate::progression::weighted_index;

/// Bottom of the bass register (E1 area).
const BASS_FLOOR: u8 = 36;
const BASS_VELOCITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    ChordTone,
    Approach,
    Octave,
    Rest,
}

/// Generate the bass part for one section's progression. Onsets are in
/// beats relative to the section start.
pub fn generate_bass<R: Rng>(
    progression: &[ChordSpan],
    params: &StyleParams,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let bass = &params.bass;
    let mut events = Vec::new();
    let mut cursor = 0.0;
    let mut prev_pitch: Option<u8> = None;

    for (i, span) in progression.iter().enumerate() {
        let root_pitch = BASS_FLOOR + span.chord.root % 12;
        let next_root = progression
            .get(i + 1)
            .map(|s| BASS_FLOOR + s.chord.root % 12);
        let tones = chord_tones(span, root_pitch);

        let beats = span.beats.round() as u32;
        for beat in 0..beats {
            let last_beat = beat + 1 == beats;

            let pitch = if beat == 0 {
                // Harmonic anchor: always the root pitch class, in the
                // octave closest to where the line currently sits.
                Some(nearest_root_octave(root_pitch, prev_pitch))
            } else {
                let choices = [
                    (Move::ChordTone, bass.tone_weight),
                    (Move::Approach, bass.approach_weight),
                    (Move::Octave, bass.octave_weight),
                    (Move::Rest, bass.rest_weight),
                ];
                let idx = weighted_index(choices.iter().map(|(_, w)| *w), rng);
                match choices[idx].0 {
                    Move::Rest => None,
                    Move::Octave => Some(root_pitch + 12),
                    Move::Approach => match (last_beat, next_root) {
                        // Chromatic approach only makes sense leading into
                        // the next chord; elsewhere walk a chord tone.
                        (true, Some(target)) => {
                            let from_below = rng.gen_bool(0.5);
                            Some(if from_below { target.saturating_sub(1) } else { target + 1 })
                        }
                        _ => nearest_tone(&tones, prev_pitch.unwrap_or(root_pitch)),
                    },
                    Move::ChordTone => nearest_but_varied(&tones, prev_pitch, rng),
                }
            };

            if let Some(mut pitch) = pitch {
                // The root anchor is never substituted, even across a wide
                // section-boundary leap.
                if beat != 0 {
                    if let Some(prev) = prev_pitch {
                        let leap = (pitch as i32 - prev as i32).abs();
                        if leap > bass.max_leap {
                            if let Some(fixed) = nearest_tone(&tones, prev) {
                                pitch = fixed;
                            }
                        }
                    }
                }

                let onset = cursor + beat as f64;
                events.push(NoteEvent {
                    onset,
                    duration: 0.9,
                    pitch,
                    velocity: BASS_VELOCITY,
                    instrument: Instrument::Bass,
                });
                prev_pitch = Some(pitch);

                // Funk-style off-beat push after a sounded beat.
                if !last_beat && rng.gen_bool(bass.offbeat_push) {
                    events.push(NoteEvent {
                        onset: onset + 0.5,
                        duration: 0.4,
                        pitch,
                        velocity: BASS_VELOCITY.saturating_sub(15).max(1),
                        instrument: Instrument::Bass,
                    });
                }
            }
        }

        cursor += span.beats;
    }

    events
}

/// Chord tones realized in the bass register around the root.
fn chord_tones(span: &ChordSpan, root_pitch: u8) -> Vec<u8> {
    span.chord
        .quality
        .intervals()
        .iter()
        .map(|&iv| (root_pitch as i32 + iv as i32).clamp(24, 60) as u8)
        .collect()
}

/// The root in the octave (floor or floor + 12) closest to `prev`.
fn nearest_root_octave(root_pitch: u8, prev: Option<u8>) -> u8 {
    match prev {
        None => root_pitch,
        Some(p) => {
            let low = root_pitch as i32;
            let high = low + 12;
            if (high - p as i32).abs() < (low - p as i32).abs() {
                high as u8
            } else {
                root_pitch
            }
        }
    }
}

fn nearest_tone(tones: &[u8], to: u8) -> Option<u8> {
    tones
        .iter()
        .copied()
        .min_by_key(|&t| (t as i32 - to as i32).abs())
}

/// Pick a chord tone near the previous pitch, but not always the nearest —
/// pure nearest-tone walking collapses onto one note.
fn nearest_but_varied<R: Rng>(tones: &[u8], prev: Option<u8>, rng: &mut R) -> Option<u8> {
    match prev {
        None => tones.first().copied(),
        Some(p) => {
            let mut sorted: Vec<u8> = tones.to_vec();
            sorted.sort_by_key(|&t| (t as i32 - p as i32).abs());
            let pick = if sorted.len() > 1 && rng.gen_bool(0.35) { 1 } else { 0 };
            sorted.get(pick).copied()
        }
    }
}

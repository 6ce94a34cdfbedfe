//! Piano voicings, comping rhythms, and lead lines.
//!
//! Voicings are register-constrained realizations of a chord's pitch
//! classes: sparse styles get rootless jazz voicings with an added ninth,
//! dense styles get block chords, and either may be spread with a drop-2.
//! Between consecutive chords the inversion with the least total pitch
//! movement is chosen, so the comping hand stays put.
//!
//! Comping attacks come from a small library of syncopated 16th-note cells
//! chosen pseudo-randomly per bar.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chords::{Chord, ChordQuality};
use crate::config::{StyleParams, VoicingDensity};
use crate::error::{Error, Result};
use crate::model::{ChordSpan, Instrument, NoteEvent};

const SIXTEENTH: f64 = 0.25;
const COMP_VELOCITY: u8 = 65;
const LEAD_VELOCITY: u8 = 85;

/// Sparse comping cells — one or two attacks per bar, off the beat.
static SPARSE_CELLS: [[u8; 16]; 4] = [
    [0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0],
    [0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
];

/// Dense comping cells — pushed attacks and anticipations.
static DENSE_CELLS: [[u8; 16]; 4] = [
    [0, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0],
    [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0],
    [0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1, 0, 0],
    [0, 0, 1, 1, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 1, 0],
];

/// Realize a chord as concrete MIDI pitches in the style's register.
///
/// Fails with `InsufficientVoicing` if the vocabulary entry yields fewer
/// than three playable tones.
pub fn voice_chord<R: Rng>(
    chord: &Chord,
    params: &StyleParams,
    previous: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>> {
    let base = (params.voicing_octave + 1) * 12 + chord.root as i32;
    let intervals = chord.quality.intervals();

    let mut offsets: Vec<i32> = match params.density {
        VoicingDensity::Sparse => {
            // Rootless: drop the root, leave the bass player room, and add
            // the ninth for color (except on diminished qualities).
            let mut o: Vec<i32> = intervals[1..].iter().map(|&i| i as i32).collect();
            let add_ninth = !matches!(
                chord.quality,
                ChordQuality::Dim7 | ChordQuality::HalfDim7
            );
            if add_ninth && !o.contains(&14) {
                o.push(14);
            }
            if o.len() < 3 {
                // Triadic qualities keep the root rather than thin out.
                o.insert(0, 0);
            }
            o
        }
        VoicingDensity::Dense => intervals.iter().map(|&i| i as i32).collect(),
    };
    offsets.sort_unstable();

    let mut voicing: Vec<u8> = offsets
        .iter()
        .map(|&o| (base + o).clamp(0, 127) as u8)
        .collect();

    if voicing.len() < 3 {
        return Err(Error::InsufficientVoicing {
            chord: chord.to_string(),
            tones: voicing.len(),
        });
    }

    voicing = smoothest_inversion(&voicing, previous);

    // Drop-2: second-from-top drops an octave for a spread sound.
    if voicing.len() >= 4 && rng.gen_bool(params.drop2) {
        let idx = voicing.len() - 2;
        if voicing[idx] >= 12 {
            let dropped = voicing[idx] - 12;
            voicing.remove(idx);
            voicing.insert(0, dropped);
        }
    }

    Ok(voicing)
}

/// Find the rotation of `voicing` closest to `previous` by total pitch
/// movement. Rotating moves the lowest note up an octave.
fn smoothest_inversion(voicing: &[u8], previous: &[u8]) -> Vec<u8> {
    if previous.is_empty() || voicing.is_empty() {
        return voicing.to_vec();
    }

    let mut best = voicing.to_vec();
    let mut best_distance = i32::MAX;
    let mut current = voicing.to_vec();

    for _ in 0..voicing.len() {
        let dist: i32 = current
            .iter()
            .zip(previous.iter().cycle())
            .map(|(&a, &b)| (a as i32 - b as i32).abs())
            .sum();
        if dist < best_distance {
            best_distance = dist;
            best = current.clone();
        }
        if let Some(&lowest) = current.first() {
            if lowest > 115 {
                break;
            }
            current.remove(0);
            current.push(lowest + 12);
        }
    }

    best
}

/// Generate the comping part for one section's progression. Onsets are in
/// beats relative to the section start.
pub fn generate_comping<R: Rng>(
    progression: &[ChordSpan],
    params: &StyleParams,
    beats_per_bar: u32,
    rng: &mut R,
) -> Result<Vec<NoteEvent>> {
    let cells: &[[u8; 16]] = match params.density {
        VoicingDensity::Sparse => &SPARSE_CELLS,
        VoicingDensity::Dense => &DENSE_CELLS,
    };
    let bar_beats = beats_per_bar as f64;
    let steps = ((beats_per_bar * 4) as usize).min(16);

    let mut events = Vec::new();
    let mut prev_voicing: Vec<u8> = Vec::new();
    let mut cursor = 0.0;

    for span in progression {
        let voicing = voice_chord(&span.chord, params, &prev_voicing, rng)?;
        let bars_in_span = (span.beats / bar_beats).round() as u32;

        for bar in 0..bars_in_span.max(1) {
            let bar_start = cursor + bar as f64 * bar_beats;
            // One syncopated cell per bar.
            let cell = cells.choose(rng).unwrap_or(&cells[0]);

            for (step, &hit) in cell.iter().enumerate().take(steps) {
                if hit == 0 {
                    continue;
                }
                let onset = bar_start + step as f64 * SIXTEENTH;
                if onset >= cursor + span.beats {
                    break;
                }
                for &pitch in &voicing {
                    events.push(NoteEvent {
                        onset,
                        duration: SIXTEENTH * 2.0,
                        pitch,
                        velocity: COMP_VELOCITY,
                        instrument: Instrument::Piano,
                    });
                }
            }
        }

        prev_voicing = voicing;
        cursor += span.beats;
    }

    Ok(events)
}

/// Melodic cell shapes for lead lines, as semitone offsets from the chord
/// root (the arpeggiated shape walks the chord tones instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeadShape {
    Scalar,
    Arpeggiated,
    Bluesy,
}

static LEAD_SHAPES: [LeadShape; 3] = [LeadShape::Scalar, LeadShape::Arpeggiated, LeadShape::Bluesy];

/// Generate a lead piano line over a progression — eighth-note cells one
/// octave above the comping register, at most four notes per chord.
pub fn generate_lead<R: Rng>(
    progression: &[ChordSpan],
    params: &StyleParams,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let octave = params.voicing_octave + 1;
    let mut events = Vec::new();
    let mut cursor = 0.0;

    for span in progression {
        let shape = *LEAD_SHAPES.choose(rng).unwrap_or(&LeadShape::Arpeggiated);
        let root = ((octave + 1) * 12 + span.chord.root as i32).clamp(0, 115) as u8;

        let pitches: Vec<u8> = match shape {
            LeadShape::Arpeggiated => {
                span.chord.pitches_in_octave(octave).into_iter().take(4).collect()
            }
            LeadShape::Scalar => [0i32, 2, 4, 5]
                .iter()
                .map(|&o| (root as i32 + o).clamp(0, 127) as u8)
                .collect(),
            LeadShape::Bluesy => [0i32, 3, 5, 7]
                .iter()
                .map(|&o| (root as i32 + o).clamp(0, 127) as u8)
                .collect(),
        };

        for (i, &pitch) in pitches.iter().enumerate() {
            let onset = cursor + i as f64 * 0.5;
            if onset >= cursor + span.beats {
                break;
            }
            events.push(NoteEvent {
                onset,
                duration: 0.4,
                pitch,
                velocity: LEAD_VELOCITY,
                instrument: Instrument::Lead,
            });
        }

        cursor += span.beats;
    }

    events
}

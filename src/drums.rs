//! Drum pattern generation: style-template beats on a 16th-note grid with
//! swing, ghost-note variation, and section-boundary fills.
//!
//! Drums have no harmonic dependency — given the same seed the output is
//! fully deterministic. All onsets are in beats relative to the section
//! start; the engine shifts them onto the global grid.

use rand::Rng;

use crate::model::{Instrument, NoteEvent};

/// General MIDI percussion voices used by the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumVoice {
    Kick,
    Snare,
    HihatClosed,
    HihatOpen,
    Ride,
    Rim,
    Crash,
    TomLow,
    TomMid,
    TomHigh,
}

impl DrumVoice {
    /// GM percussion note number.
    pub fn note(&self) -> u8 {
        match self {
            DrumVoice::Kick => 36,
            DrumVoice::Snare => 38,
            DrumVoice::HihatClosed => 42,
            DrumVoice::HihatOpen => 46,
            DrumVoice::Ride => 51,
            DrumVoice::Rim => 37,
            DrumVoice::Crash => 49,
            DrumVoice::TomLow => 41,
            DrumVoice::TomMid => 47,
            DrumVoice::TomHigh => 50,
        }
    }

    pub fn base_velocity(&self) -> u8 {
        match self {
            DrumVoice::Kick => 100,
            DrumVoice::Snare => 95,
            DrumVoice::HihatClosed => 70,
            DrumVoice::HihatOpen => 80,
            DrumVoice::Ride => 75,
            DrumVoice::Rim => 60,
            DrumVoice::Crash => 110,
            DrumVoice::TomLow => 95,
            DrumVoice::TomMid => 85,
            DrumVoice::TomHigh => 90,
        }
    }
}

/// One-bar beat template on a 16th-note grid (1 = hit).
#[derive(Debug, Clone, Copy)]
pub struct DrumTemplate {
    pub kick: [u8; 16],
    pub snare: [u8; 16],
    pub hat_closed: [u8; 16],
    /// Color voice on top of the core kit (open hat, ride, or rim).
    pub accent: (DrumVoice, [u8; 16]),
}

/// Laid-back head-nod beat: sparse kick, backbeat snare, straight 8th hats
/// with open-hat lifts.
pub static SMOOTH_JAZZ_BEAT: DrumTemplate = DrumTemplate {
    kick: [1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    snare: [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
    hat_closed: [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    accent: (
        DrumVoice::HihatOpen,
        [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0],
    ),
};

/// Busier syncopated funk beat with 16th hats and displaced kicks.
pub static JAZZ_FUNK_BEAT: DrumTemplate = DrumTemplate {
    kick: [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0],
    snare: [0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0],
    hat_closed: [1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 1],
    accent: (
        DrumVoice::HihatOpen,
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    ),
};

/// Behind-the-beat neo-soul pocket with rim clicks.
pub static NEO_SOUL_BEAT: DrumTemplate = DrumTemplate {
    kick: [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0],
    snare: [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0],
    hat_closed: [1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0],
    accent: (
        DrumVoice::Rim,
        [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1],
    ),
};

const SIXTEENTH: f64 = 0.25;
/// Chance per bar that the hat line gains or drops a hit.
const VARIATION_CHANCE: f64 = 0.05;
/// Chance that a section-final bar gets a tom fill into the transition.
const FILL_CHANCE: f64 = 0.7;

/// Generate the drum part for one section.
///
/// Swing delays every off-beat 16th by `swing × sixteenth`. When
/// `fill_at_end` is set (section leads into another), the last beat may be
/// replaced by a tom fill marking the transition.
pub fn generate_drums<R: Rng>(
    template: &DrumTemplate,
    bars: u32,
    beats_per_bar: u32,
    swing: f64,
    fill_at_end: bool,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    let steps = ((beats_per_bar * 4) as usize).min(16);
    let bar_beats = beats_per_bar as f64;

    let lanes: [(DrumVoice, [u8; 16]); 4] = [
        (DrumVoice::Kick, template.kick),
        (DrumVoice::Snare, template.snare),
        (DrumVoice::HihatClosed, template.hat_closed),
        (template.accent.0, template.accent.1),
    ];

    let fill_bar = if fill_at_end && bars > 0 && rng.gen_bool(FILL_CHANCE) {
        Some(bars - 1)
    } else {
        None
    };

    for bar in 0..bars {
        let bar_start = bar as f64 * bar_beats;
        let fill_here = fill_bar == Some(bar);
        // Fill replaces the kit on the last beat of the bar.
        let cutoff = if fill_here { steps - 4 } else { steps };

        for (voice, pattern) in &lanes {
            for (step, &hit) in pattern.iter().enumerate().take(cutoff) {
                let mut sounds = hit > 0;
                // Occasional ghost / dropped hit keeps the loop breathing.
                if *voice == DrumVoice::HihatClosed && rng.gen_bool(VARIATION_CHANCE) {
                    sounds = if sounds { !rng.gen_bool(0.3) } else { true };
                }
                if !sounds {
                    continue;
                }

                let mut onset = bar_start + step as f64 * SIXTEENTH;
                if step % 2 == 1 {
                    onset += swing * SIXTEENTH;
                }
                events.push(NoteEvent {
                    onset,
                    duration: SIXTEENTH * 0.5,
                    pitch: voice.note(),
                    velocity: voice.base_velocity(),
                    instrument: Instrument::Drums,
                });
            }
        }

        if fill_here {
            events.extend(tom_fill(bar_start + bar_beats - 1.0));
        }
    }

    events
}

/// One-beat tom run into the next section's downbeat.
fn tom_fill(start: f64) -> Vec<NoteEvent> {
    [
        (0.0, DrumVoice::TomHigh),
        (0.25, DrumVoice::TomMid),
        (0.5, DrumVoice::TomLow),
        (0.75, DrumVoice::Snare),
    ]
    .iter()
    .map(|&(offset, voice)| NoteEvent {
        onset: start + offset,
        duration: SIXTEENTH * 0.8,
        pitch: voice.note(),
        velocity: voice.base_velocity(),
        instrument: Instrument::Drums,
    })
    .collect()
}

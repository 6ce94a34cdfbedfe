//! Configuration: the raw user-supplied config, the closed style-preset
//! enumeration, and the per-preset parameter tables that drive every
//! generator.
//!
//! Unknown style tags are rejected here, at resolution time — never at
//! first use inside a generator. Missing fields fall back to the resolved
//! preset's defaults; unrecognized JSON fields are ignored.

use serde::{Deserialize, Serialize};

use crate::chords::{ChordQuality, HarmonicFunction};
use crate::drums::{self, DrumTemplate};
use crate::error::{Error, Result};
use crate::model::{InstrumentMix, TimeGrid};
use crate::scale::{parse_key_name, Key, Mode};

/// Allowed tempo range in BPM (inclusive).
pub const TEMPO_RANGE: (u32, u32) = (60, 140);
/// Allowed track length in minutes (inclusive).
pub const LENGTH_RANGE: (f64, f64) = (2.0, 8.0);
/// Maximum swing amount (full triplet feel).
pub const MAX_SWING: f64 = 1.0 / 3.0;

/// Raw track configuration as supplied by the caller (e.g. parsed from
/// JSON). `None` fields take the style preset's defaults at resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub tempo: Option<u32>,
    /// Key name, e.g. `"C"`, `"Eb"`, `"Am"`.
    pub key: Option<String>,
    pub mode: Option<Mode>,
    pub style_preset: String,
    pub length_minutes: Option<f64>,
    /// Swing amount override, 0.0 (straight) to 1/3 (full triplet).
    pub swing: Option<f64>,
    /// RNG seed — fixed seed gives value-identical output.
    pub seed: Option<u64>,
    pub instrument_mix: Option<InstrumentMix>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            tempo: None,
            key: None,
            mode: None,
            style_preset: "smooth_jazz".to_string(),
            length_minutes: None,
            swing: None,
            seed: None,
            instrument_mix: None,
        }
    }
}

/// Closed set of style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    SmoothJazz,
    JazzFunk,
    NeoSoul,
}

impl StylePreset {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "smooth_jazz" => Ok(StylePreset::SmoothJazz),
            "jazz_funk" => Ok(StylePreset::JazzFunk),
            "neo_soul" => Ok(StylePreset::NeoSoul),
            other => Err(Error::UnknownPreset(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StylePreset::SmoothJazz => "smooth_jazz",
            StylePreset::JazzFunk => "jazz_funk",
            StylePreset::NeoSoul => "neo_soul",
        }
    }

    pub fn params(&self) -> &'static StyleParams {
        match self {
            StylePreset::SmoothJazz => &SMOOTH_JAZZ,
            StylePreset::JazzFunk => &JAZZ_FUNK,
            StylePreset::NeoSoul => &NEO_SOUL,
        }
    }
}

/// How thick the piano voicings should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicingDensity {
    /// Rootless three/four-note jazz voicings, sparse comping cells.
    Sparse,
    /// Block chords, busier comping cells.
    Dense,
}

/// Weighted transition from one harmonic function to its successors.
pub type FunctionTransitions = (HarmonicFunction, &'static [(HarmonicFunction, f64)]);

/// Weighted (scale degree, quality) choices for one harmonic function.
pub type ChordChoices = (
    HarmonicFunction,
    &'static [(usize, ChordQuality, f64)],
);

/// Per-style bass-line parameters.
#[derive(Debug, Clone, Copy)]
pub struct BassParams {
    /// Weak-beat weights: chord tone / chromatic approach / octave jump / rest.
    pub tone_weight: f64,
    pub approach_weight: f64,
    pub octave_weight: f64,
    pub rest_weight: f64,
    /// Probability of an extra off-beat push after a sounded beat.
    pub offbeat_push: f64,
    /// Largest allowed leap between consecutive notes, in semitones.
    pub max_leap: i32,
}

/// Humanization jitter bounds, in beats (timing) and as a fraction of the
/// velocity (dynamics). Drums run tighter than bass by design of the
/// ensemble feel.
#[derive(Debug, Clone, Copy)]
pub struct JitterParams {
    pub drums_timing: f64,
    pub bass_timing: f64,
    pub piano_timing: f64,
    pub velocity_frac: f64,
}

/// Section layout template: fixed intro/outro framing an alternating
/// verse/hook cycle, with an optional bridge in longer tracks.
#[derive(Debug, Clone, Copy)]
pub struct SectionTemplate {
    pub intro_bars: u32,
    pub verse_bars: u32,
    pub hook_bars: u32,
    pub bridge_bars: Option<u32>,
    pub outro_bars: u32,
}

/// Everything a style preset supplies. These are static data tables —
/// generators stay data-driven and hold no per-style branching of their own.
#[derive(Debug, Clone, Copy)]
pub struct StyleParams {
    pub default_tempo: u32,
    pub default_key: &'static str,
    pub default_length_minutes: f64,
    pub swing: f64,
    /// Probability that a chord holds for two bars instead of one
    /// (the neo-soul "static harmony" feel).
    pub two_bar_merge: f64,
    pub density: VoicingDensity,
    /// Base octave for piano voicings (octave 4 roots land around middle C).
    pub voicing_octave: i32,
    /// Probability of spreading a voicing with a drop-2.
    pub drop2: f64,
    pub transitions: &'static [FunctionTransitions],
    pub chord_choices: &'static [ChordChoices],
    pub bass: BassParams,
    pub drum_template: &'static DrumTemplate,
    pub jitter: JitterParams,
    pub template: SectionTemplate,
}

impl StyleParams {
    /// Transition weights out of `from`.
    pub fn transitions_from(
        &self,
        from: HarmonicFunction,
    ) -> &'static [(HarmonicFunction, f64)] {
        self.transitions
            .iter()
            .find(|(f, _)| *f == from)
            .map(|(_, w)| *w)
            .unwrap_or(&[(HarmonicFunction::Tonic, 1.0)])
    }

    /// Chord choices for a harmonic function.
    pub fn chords_for(
        &self,
        function: HarmonicFunction,
    ) -> &'static [(usize, ChordQuality, f64)] {
        self.chord_choices
            .iter()
            .find(|(f, _)| *f == function)
            .map(|(_, c)| *c)
            .unwrap_or(&[(0, ChordQuality::Maj7, 1.0)])
    }
}

const DEFAULT_JITTER: JitterParams = JitterParams {
    drums_timing: 0.015,
    bass_timing: 0.04,
    piano_timing: 0.03,
    velocity_frac: 0.08,
};

use ChordQuality as Q;
use HarmonicFunction as F;

static SMOOTH_JAZZ: StyleParams = StyleParams {
    default_tempo: 90,
    default_key: "C",
    default_length_minutes: 3.0,
    swing: 0.12,
    two_bar_merge: 0.15,
    density: VoicingDensity::Sparse,
    voicing_octave: 4,
    drop2: 0.25,
    transitions: &[
        (F::Tonic, &[(F::Subdominant, 0.35), (F::Dominant, 0.25), (F::Secondary, 0.2), (F::Tonic, 0.2)]),
        (F::Subdominant, &[(F::Dominant, 0.5), (F::Tonic, 0.25), (F::Secondary, 0.15), (F::Subdominant, 0.1)]),
        (F::Dominant, &[(F::Tonic, 0.7), (F::Subdominant, 0.1), (F::Secondary, 0.1), (F::Dominant, 0.1)]),
        (F::Secondary, &[(F::Subdominant, 0.4), (F::Dominant, 0.35), (F::Tonic, 0.25)]),
    ],
    chord_choices: &[
        (F::Tonic, &[(0, Q::Maj7, 0.6), (5, Q::Min7, 0.4)]),
        (F::Subdominant, &[(3, Q::Maj7, 0.5), (1, Q::Min7, 0.5)]),
        (F::Dominant, &[(4, Q::Dom7, 0.7), (4, Q::Dom9, 0.3)]),
        (F::Secondary, &[(2, Q::Min7, 0.6), (5, Q::Min7, 0.4)]),
    ],
    bass: BassParams {
        tone_weight: 0.5,
        approach_weight: 0.3,
        octave_weight: 0.05,
        rest_weight: 0.15,
        offbeat_push: 0.1,
        max_leap: 7,
    },
    drum_template: &drums::SMOOTH_JAZZ_BEAT,
    jitter: DEFAULT_JITTER,
    template: SectionTemplate {
        intro_bars: 4,
        verse_bars: 8,
        hook_bars: 8,
        bridge_bars: None,
        outro_bars: 4,
    },
};

static JAZZ_FUNK: StyleParams = StyleParams {
    default_tempo: 104,
    default_key: "Eb",
    default_length_minutes: 3.5,
    swing: 0.08,
    two_bar_merge: 0.1,
    density: VoicingDensity::Dense,
    voicing_octave: 4,
    drop2: 0.15,
    transitions: &[
        (F::Tonic, &[(F::Subdominant, 0.3), (F::Dominant, 0.35), (F::Secondary, 0.15), (F::Tonic, 0.2)]),
        (F::Subdominant, &[(F::Dominant, 0.55), (F::Tonic, 0.2), (F::Secondary, 0.15), (F::Subdominant, 0.1)]),
        (F::Dominant, &[(F::Tonic, 0.55), (F::Dominant, 0.25), (F::Subdominant, 0.1), (F::Secondary, 0.1)]),
        (F::Secondary, &[(F::Dominant, 0.45), (F::Subdominant, 0.35), (F::Tonic, 0.2)]),
    ],
    chord_choices: &[
        (F::Tonic, &[(0, Q::Add9, 0.4), (0, Q::Maj7, 0.3), (5, Q::Min7, 0.3)]),
        (F::Subdominant, &[(1, Q::Min7, 0.6), (3, Q::Dom7, 0.4)]),
        (F::Dominant, &[(4, Q::Dom7Sharp9, 0.5), (4, Q::Dom7, 0.3), (4, Q::Sus4, 0.2)]),
        (F::Secondary, &[(2, Q::Min7, 0.5), (6, Q::HalfDim7, 0.5)]),
    ],
    bass: BassParams {
        tone_weight: 0.3,
        approach_weight: 0.15,
        octave_weight: 0.25,
        rest_weight: 0.3,
        offbeat_push: 0.45,
        max_leap: 12,
    },
    drum_template: &drums::JAZZ_FUNK_BEAT,
    jitter: DEFAULT_JITTER,
    template: SectionTemplate {
        intro_bars: 4,
        verse_bars: 8,
        hook_bars: 8,
        bridge_bars: Some(8),
        outro_bars: 4,
    },
};

static NEO_SOUL: StyleParams = StyleParams {
    default_tempo: 78,
    default_key: "Dm",
    default_length_minutes: 4.0,
    swing: 0.18,
    two_bar_merge: 0.35,
    density: VoicingDensity::Sparse,
    voicing_octave: 4,
    drop2: 0.3,
    transitions: &[
        (F::Tonic, &[(F::Tonic, 0.35), (F::Subdominant, 0.35), (F::Secondary, 0.2), (F::Dominant, 0.1)]),
        (F::Subdominant, &[(F::Tonic, 0.35), (F::Subdominant, 0.25), (F::Dominant, 0.25), (F::Secondary, 0.15)]),
        (F::Dominant, &[(F::Tonic, 0.65), (F::Subdominant, 0.2), (F::Secondary, 0.15)]),
        (F::Secondary, &[(F::Subdominant, 0.4), (F::Tonic, 0.35), (F::Dominant, 0.25)]),
    ],
    chord_choices: &[
        (F::Tonic, &[(0, Q::Maj9, 0.5), (5, Q::Min9, 0.5)]),
        (F::Subdominant, &[(1, Q::Min9, 0.6), (3, Q::Maj9, 0.4)]),
        // Neo-soul leans on min7 substitutions over the dominant.
        (F::Dominant, &[(4, Q::Min7, 0.4), (4, Q::Dom9, 0.4), (4, Q::Sus4, 0.2)]),
        (F::Secondary, &[(2, Q::Min7, 0.4), (5, Q::Min6, 0.3), (1, Q::Min9, 0.3)]),
    ],
    bass: BassParams {
        tone_weight: 0.35,
        approach_weight: 0.2,
        octave_weight: 0.1,
        rest_weight: 0.35,
        offbeat_push: 0.2,
        max_leap: 9,
    },
    drum_template: &drums::NEO_SOUL_BEAT,
    jitter: JitterParams {
        drums_timing: 0.02,
        bass_timing: 0.05,
        piano_timing: 0.035,
        velocity_frac: 0.1,
    },
    template: SectionTemplate {
        intro_bars: 8,
        verse_bars: 8,
        hook_bars: 8,
        bridge_bars: None,
        outro_bars: 8,
    },
};

/// A fully validated configuration: everything downstream reads from this,
/// immutably, for the duration of one run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub grid: TimeGrid,
    pub key: Key,
    pub key_name: String,
    pub style: StylePreset,
    pub length_minutes: f64,
    pub swing: f64,
    pub seed: u64,
    pub mix: InstrumentMix,
}

impl ResolvedConfig {
    pub fn params(&self) -> &'static StyleParams {
        self.style.params()
    }
}

/// Resolve and validate a raw config. Unknown presets fail with
/// `UnknownPreset`; every range violation is collected and reported in one
/// `InvalidConfiguration`. Pure — calling this twice on the same input
/// yields the same outcome.
pub fn resolve(config: &TrackConfig) -> Result<ResolvedConfig> {
    let style = StylePreset::from_name(&config.style_preset)?;
    let params = style.params();

    let tempo = config.tempo.unwrap_or(params.default_tempo);
    let key_name = config
        .key
        .clone()
        .unwrap_or_else(|| params.default_key.to_string());
    let length_minutes = config
        .length_minutes
        .unwrap_or(params.default_length_minutes);
    let swing = config.swing.unwrap_or(params.swing);
    let mix = config.instrument_mix.unwrap_or_default();

    let mut violations = Vec::new();

    if tempo < TEMPO_RANGE.0 || tempo > TEMPO_RANGE.1 {
        violations.push(format!(
            "tempo {} BPM out of range {}-{}",
            tempo, TEMPO_RANGE.0, TEMPO_RANGE.1
        ));
    }
    if !(LENGTH_RANGE.0..=LENGTH_RANGE.1).contains(&length_minutes) {
        violations.push(format!(
            "length {} minutes out of range {}-{}",
            length_minutes, LENGTH_RANGE.0, LENGTH_RANGE.1
        ));
    }
    if !(0.0..=MAX_SWING).contains(&swing) {
        violations.push(format!("swing {} out of range 0.0-{:.3}", swing, MAX_SWING));
    }
    for (name, level) in [
        ("drums", mix.drums),
        ("bass", mix.bass),
        ("piano", mix.piano),
        ("lead", mix.lead),
    ] {
        if !(0.0..=1.0).contains(&level) {
            violations.push(format!("mix level for {} ({}) out of range 0.0-1.0", name, level));
        }
    }

    let key = match parse_key_name(&key_name) {
        Some((root, implied_mode)) => {
            let mode = implied_mode.or(config.mode).unwrap_or_default();
            Some(Key::new(root, mode))
        }
        None => {
            violations.push(format!("unrecognized key '{}'", key_name));
            None
        }
    };

    if !violations.is_empty() {
        return Err(Error::InvalidConfiguration(violations));
    }

    Ok(ResolvedConfig {
        grid: TimeGrid {
            tempo_bpm: tempo as f64,
            beats_per_bar: 4,
            beat_unit: 4,
        },
        // violations is empty, so key parsed successfully
        key: key.unwrap(),
        key_name,
        style,
        length_minutes,
        swing,
        seed: config.seed.unwrap_or(0),
        mix,
    })
}

//! Chord progression generation: a small harmonic-function state machine
//! with style-weighted transitions.
//!
//! At each bar boundary the next function (tonic / subdominant / dominant /
//! secondary) is sampled from the style's transition table, then a concrete
//! (scale degree, quality) pair is sampled for that function. A chord may
//! hold for two bars with a style-dependent probability — the static-harmony
//! feel neo-soul leans on. Verse and hook sections always open and close on
//! a tonic-function chord; intro and outro relax the opening but still
//! cadence home.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::chords::{Chord, HarmonicFunction};
use crate::config::StyleParams;
use crate::error::Result;
use crate::model::{ChordSpan, SectionKind};
use crate::scale::Key;

/// Sample an index from a weight iterator. Falls back to 0 if the weights
/// are degenerate (static tables never are).
pub(crate) fn weighted_index<R: Rng>(
    weights: impl Iterator<Item = f64>,
    rng: &mut R,
) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0,
    }
}

/// Generate the chord progression for one section. The spans always sum to
/// exactly `bars × beats_per_bar` beats.
pub fn generate_progression<R: Rng>(
    key: Key,
    params: &StyleParams,
    kind: SectionKind,
    bars: u32,
    beats_per_bar: u32,
    rng: &mut R,
) -> Result<Vec<ChordSpan>> {
    let bar_beats = beats_per_bar as f64;
    let begins_tonic = matches!(kind, SectionKind::Verse | SectionKind::Hook);
    let ends_tonic = !matches!(kind, SectionKind::Bridge);

    let mut spans: Vec<ChordSpan> = Vec::new();
    let mut state = HarmonicFunction::Tonic;
    let mut filled: u32 = 0;

    while filled < bars {
        let last_bar = filled + 1 == bars;
        // The intro also opens at home — the track's first sound
        // establishes the key.
        let opening = filled == 0 && (begins_tonic || kind == SectionKind::Intro);
        let function = if opening {
            HarmonicFunction::Tonic
        } else if last_bar && ends_tonic {
            HarmonicFunction::Tonic
        } else {
            sample_transition(params, state, rng)
        };

        let chord = sample_chord(key, params, function, opening, rng)?;

        // Hold for two bars with the style's merge probability, but never
        // past the section end, and never onto a forced-tonic final bar
        // with a non-tonic chord.
        let can_merge = filled + 2 <= bars
            && !(ends_tonic && filled + 2 == bars && function != HarmonicFunction::Tonic);
        let bars_held = if can_merge && rng.gen_bool(params.two_bar_merge) {
            2
        } else {
            1
        };

        spans.push(ChordSpan {
            chord,
            beats: bars_held as f64 * bar_beats,
        });
        filled += bars_held;
        state = function;
    }

    Ok(spans)
}

fn sample_transition<R: Rng>(
    params: &StyleParams,
    from: HarmonicFunction,
    rng: &mut R,
) -> HarmonicFunction {
    let table = params.transitions_from(from);
    let idx = weighted_index(table.iter().map(|(_, w)| *w), rng);
    table[idx].0
}

fn sample_chord<R: Rng>(
    key: Key,
    params: &StyleParams,
    function: HarmonicFunction,
    home_degree_only: bool,
    rng: &mut R,
) -> Result<Chord> {
    let all = params.chords_for(function);
    // Opening chords sit on the key root itself, not a tonic substitute.
    let filtered: Vec<(usize, crate::chords::ChordQuality, f64)> = if home_degree_only {
        all.iter().copied().filter(|(d, _, _)| *d == 0).collect()
    } else {
        Vec::new()
    };
    let choices: &[(usize, crate::chords::ChordQuality, f64)] =
        if filtered.is_empty() { all } else { &filtered };
    let idx = weighted_index(choices.iter().map(|(_, _, w)| *w), rng);
    let (degree, quality, _) = choices[idx];
    // Table degrees are all 0..=6, so the lookup cannot fail.
    let root = key.degree_pitch_class(degree).unwrap_or(key.root);
    Chord::new(root, quality, function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StylePreset;
    use crate::scale::Mode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn c_major() -> Key {
        Key::new(0, Mode::Major)
    }

    #[test]
    fn progression_sums_exactly_to_section_length() {
        for preset in [StylePreset::SmoothJazz, StylePreset::JazzFunk, StylePreset::NeoSoul] {
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            for bars in [4u32, 8, 16] {
                let spans = generate_progression(
                    c_major(),
                    preset.params(),
                    SectionKind::Verse,
                    bars,
                    4,
                    &mut rng,
                )
                .unwrap();
                let total: f64 = spans.iter().map(|s| s.beats).sum();
                assert_eq!(total, (bars * 4) as f64, "{} {} bars", preset.name(), bars);
            }
        }
    }

    #[test]
    fn verse_and_hook_open_and_close_on_tonic() {
        for kind in [SectionKind::Verse, SectionKind::Hook] {
            for seed in 0..20 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let spans = generate_progression(
                    c_major(),
                    StylePreset::SmoothJazz.params(),
                    kind,
                    8,
                    4,
                    &mut rng,
                )
                .unwrap();
                assert_eq!(spans.first().unwrap().chord.function, HarmonicFunction::Tonic);
                assert_eq!(spans.last().unwrap().chord.function, HarmonicFunction::Tonic);
            }
        }
    }

    #[test]
    fn opening_chord_sits_on_the_key_root() {
        for kind in [SectionKind::Intro, SectionKind::Verse, SectionKind::Hook] {
            for seed in 0..10 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let spans = generate_progression(
                    Key::new(3, Mode::Major), // Eb
                    StylePreset::NeoSoul.params(),
                    kind,
                    8,
                    4,
                    &mut rng,
                )
                .unwrap();
                assert_eq!(spans[0].chord.root, 3, "{} seed {seed}", kind.name());
            }
        }
    }

    #[test]
    fn neo_soul_merges_bars() {
        // With a 0.35 merge probability, 40 eight-bar sections should
        // produce at least one two-bar span.
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut merged = false;
        for _ in 0..40 {
            let spans = generate_progression(
                c_major(),
                StylePreset::NeoSoul.params(),
                SectionKind::Verse,
                8,
                4,
                &mut rng,
            )
            .unwrap();
            if spans.iter().any(|s| s.beats == 8.0) {
                merged = true;
                break;
            }
        }
        assert!(merged);
    }

    #[test]
    fn roots_stay_in_key() {
        let key = Key::new(3, Mode::Major); // Eb
        let in_key = key.pitch_classes();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let spans = generate_progression(
            key,
            StylePreset::JazzFunk.params(),
            SectionKind::Hook,
            16,
            4,
            &mut rng,
        )
        .unwrap();
        for span in &spans {
            assert!(in_key[span.chord.root as usize], "root {} not diatonic", span.chord.root);
        }
    }
}

//! Integration tests for the full composition pipeline: section planning,
//! harmony, part generation, grid alignment, and assembly.

use pretty_assertions::assert_eq;

use groovelib::{
    generate_track, generate_track_from_json, track_to_json, ChordSpan, Error, HarmonicFunction,
    Instrument, SectionKind, TrackConfig,
};

fn smooth_jazz_config() -> TrackConfig {
    TrackConfig {
        tempo: Some(90),
        key: Some("C".to_string()),
        style_preset: "smooth_jazz".to_string(),
        length_minutes: Some(3.0),
        seed: Some(42),
        ..TrackConfig::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Structure and alignment
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn track_length_matches_plan_within_one_bar() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    // 3 minutes at 90 BPM in 4/4 = 67.5 bars.
    let target_bars = 3.0 * 90.0 / 4.0;
    assert!(
        (track.total_bars() as f64 - target_bars).abs() <= 1.0,
        "planned {} bars vs target {}",
        track.total_bars(),
        target_bars
    );
    assert_eq!(track.total_beats(), track.total_bars() as f64 * 4.0);
}

#[test]
fn sections_are_contiguous_on_the_grid() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    let mut expected_start = 0.0;
    for section in &track.sections {
        assert_eq!(section.start_beat, expected_start, "{}", section.kind.name());
        expected_start += (section.bars * track.grid.beats_per_bar) as f64;
    }
    assert_eq!(track.sections.first().unwrap().kind, SectionKind::Intro);
    assert_eq!(track.sections.last().unwrap().kind, SectionKind::Outro);
}

#[test]
fn progressions_sum_exactly_to_their_sections() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    for section in &track.sections {
        let sum: f64 = section.progression.iter().map(|s| s.beats).sum();
        assert_eq!(
            sum,
            (section.bars * track.grid.beats_per_bar) as f64,
            "{} progression has gaps or overlap",
            section.kind.name()
        );
    }
}

#[test]
fn first_chord_is_tonic_rooted_at_the_key() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    let first = track.sections[0].progression[0];
    assert_eq!(first.chord.function, HarmonicFunction::Tonic);
    assert_eq!(first.chord.root, 0, "track in C must open on C");
}

#[test]
fn no_event_outlives_the_track() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    let total = track.total_beats();
    for e in &track.events {
        assert!(e.onset >= 0.0);
        assert!(
            e.onset + e.duration <= total + 1e-9,
            "event at {} + {} rings past {}",
            e.onset,
            e.duration,
            total
        );
    }
}

#[test]
fn events_are_sorted_with_instrument_priority_ties() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    for pair in track.events.windows(2) {
        assert!(pair[0].onset <= pair[1].onset, "events out of order");
        if pair[0].onset == pair[1].onset {
            assert!(
                pair[0].instrument.priority() <= pair[1].instrument.priority(),
                "tie not broken by instrument priority"
            );
        }
    }
}

#[test]
fn arrangement_layers_build_in() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    let intro = &track.sections[0];
    let intro_end = (intro.bars * track.grid.beats_per_bar) as f64;

    // Drums are tacet during the intro (small jitter margin at the seam).
    let early_drums = track
        .events
        .iter()
        .filter(|e| e.instrument == Instrument::Drums && e.onset < intro_end - 0.5)
        .count();
    assert_eq!(early_drums, 0, "drums must wait out the intro");

    // Lead piano appears only in hook sections.
    for e in track.events.iter().filter(|e| e.instrument == Instrument::Lead) {
        let section = track
            .sections
            .iter()
            .rev()
            .find(|s| e.onset >= s.start_beat - 0.5)
            .unwrap();
        assert_eq!(section.kind, SectionKind::Hook);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Musical guarantees
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn dominant_resolves_to_tonic_root_in_the_bass() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    let mut checked = 0;

    for section in &track.sections {
        let mut span_start = section.start_beat;
        let spans: Vec<&ChordSpan> = section.progression.iter().collect();
        for pair in spans.windows(2) {
            let tonic_start = span_start + pair[0].beats;
            if pair[0].chord.function == HarmonicFunction::Dominant
                && pair[1].chord.function == HarmonicFunction::Tonic
            {
                // The bass anchor sits within the humanization bound of the
                // chord boundary; nothing else sounds that close to it.
                let anchor = track
                    .events
                    .iter()
                    .filter(|e| e.instrument == Instrument::Bass)
                    .find(|e| (e.onset - tonic_start).abs() <= 0.06)
                    .unwrap_or_else(|| panic!("no bass anchor near beat {tonic_start}"));
                assert_eq!(
                    anchor.pitch % 12,
                    pair[1].chord.root,
                    "cadence at beat {tonic_start} missed the tonic root"
                );
                checked += 1;
            }
            span_start = tonic_start;
        }
    }

    assert!(checked > 0, "track produced no dominant→tonic cadences");
}

#[test]
fn humanization_stays_near_the_grid() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    // Timing jitter plus swing never moves an onset further than half a
    // 16th from its quantized position, so grid order is preserved.
    for e in &track.events {
        let steps = e.onset / 0.25;
        let drift = (steps - steps.round()).abs() * 0.25;
        assert!(
            drift < 0.125,
            "event at {} drifted {} beats off the 16th grid",
            e.onset,
            drift
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Determinism
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn identical_seed_reproduces_the_track() {
    let a = generate_track(&smooth_jazz_config()).unwrap();
    let b = generate_track(&smooth_jazz_config()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_diverge() {
    let a = generate_track(&smooth_jazz_config()).unwrap();
    let mut config = smooth_jazz_config();
    config.seed = Some(43);
    let b = generate_track(&config).unwrap();
    assert_ne!(a.events, b.events);
}

#[test]
fn all_presets_generate() {
    for preset in ["smooth_jazz", "jazz_funk", "neo_soul"] {
        let config = TrackConfig {
            style_preset: preset.to_string(),
            seed: Some(7),
            ..TrackConfig::default()
        };
        let track = generate_track(&config).unwrap();
        assert!(!track.events.is_empty(), "{preset} produced no events");
        assert_eq!(track.style, preset);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Configuration errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn tempo_boundaries_through_the_engine() {
    for tempo in [60, 140] {
        let mut config = smooth_jazz_config();
        config.tempo = Some(tempo);
        assert!(generate_track(&config).is_ok(), "tempo {tempo} rejected");
    }
    for tempo in [59, 141] {
        let mut config = smooth_jazz_config();
        config.tempo = Some(tempo);
        match generate_track(&config) {
            Err(Error::InvalidConfiguration(violations)) => {
                assert!(violations.iter().any(|v| v.contains("tempo")));
            }
            other => panic!("tempo {tempo}: expected InvalidConfiguration, got {other:?}"),
        }
    }
}

#[test]
fn unknown_preset_fails_without_side_effects() {
    let result = generate_track_from_json(
        r#"{"tempo": 90, "key": "C", "style_preset": "lofi_trap", "length_minutes": 3.0}"#,
    );
    assert_eq!(result.unwrap_err(), Error::UnknownPreset("lofi_trap".to_string()));
}

#[test]
fn configuration_violations_are_aggregated() {
    let mut config = smooth_jazz_config();
    config.tempo = Some(150);
    config.length_minutes = Some(0.5);
    match generate_track(&config) {
        Err(Error::InvalidConfiguration(violations)) => {
            assert_eq!(violations.len(), 2, "expected both violations: {violations:?}");
        }
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Renderer boundary
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn track_serializes_for_the_renderer() {
    let track = generate_track(&smooth_jazz_config()).unwrap();
    let json = track_to_json(&track).unwrap();
    assert!(json.contains("\"events\""));
    assert!(json.contains("\"tempo_bpm\""));

    let parsed: groovelib::Track = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, track);
}

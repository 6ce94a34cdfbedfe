//! The composition engine: orchestrates progression, voicing, bass, and
//! drum generation into a single, grid-aligned, humanized `Track`.
//!
//! Assembly is a strictly sequential pipeline:
//!
//! ```text
//! ConfigResolved → SectionsPlanned → HarmonyGenerated → PartsGenerated
//!               → GridAligned → Humanized → Assembled(Track)
//! ```
//!
//! Failure at any stage is fatal for the run — no partial `Track` is ever
//! returned. All randomness flows through one seedable RNG owned by the
//! engine, so a fixed seed reproduces the track exactly.

use std::cmp::Ordering;

use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bass::generate_bass;
use crate::config::{self, ResolvedConfig, TrackConfig};
use crate::drums::generate_drums;
use crate::error::{Error, Result};
use crate::model::{Instrument, NoteEvent, Section, SectionKind, Track};
use crate::progression::generate_progression;
use crate::voicing::{generate_comping, generate_lead};

/// Generate a complete track from a raw configuration.
pub fn compose(config: &TrackConfig) -> Result<Track> {
    let resolved = config::resolve(config)?;
    Composer::new(resolved).generate()
}

/// One track-generation run. Holds the resolved configuration and the
/// run's RNG; consumed by `generate`, so no state survives the hand-off.
pub struct Composer {
    cfg: ResolvedConfig,
    rng: ChaCha8Rng,
}

impl Composer {
    pub fn new(cfg: ResolvedConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        Self { cfg, rng }
    }

    /// Run the full pipeline and emit the assembled track.
    pub fn generate(mut self) -> Result<Track> {
        let grid = self.cfg.grid;
        info!(
            "composing {} track in {} at {} BPM",
            self.cfg.style.name(),
            self.cfg.key_name,
            grid.tempo_bpm
        );

        // ── SectionsPlanned ─────────────────────────────────────────────
        let plan = self.plan_sections();
        debug!(
            "section plan: {:?}",
            plan.iter().map(|(k, b)| (k.name(), *b)).collect::<Vec<_>>()
        );

        // ── HarmonyGenerated ────────────────────────────────────────────
        let mut sections: Vec<Section> = Vec::with_capacity(plan.len());
        for &(kind, bars) in &plan {
            let progression = generate_progression(
                self.cfg.key,
                self.cfg.params(),
                kind,
                bars,
                grid.beats_per_bar,
                &mut self.rng,
            )?;
            let section = Section {
                kind,
                bars,
                start_beat: 0.0,
                progression,
            };
            let expected = section.beats(&grid);
            let actual = section.progression_beats();
            if (actual - expected).abs() > 1e-9 {
                return Err(Error::GridMisalignment(format!(
                    "{} progression sums to {} beats, section holds {}",
                    kind.name(),
                    actual,
                    expected
                )));
            }
            sections.push(section);
        }

        // ── PartsGenerated ──────────────────────────────────────────────
        let params = self.cfg.params();
        let last = sections.len().saturating_sub(1);
        let mut section_events: Vec<Vec<NoteEvent>> = Vec::with_capacity(sections.len());
        for (i, section) in sections.iter().enumerate() {
            let mut events = Vec::new();

            // The band builds in: drums are tacet for the intro.
            if section.kind != SectionKind::Intro {
                events.extend(generate_drums(
                    params.drum_template,
                    section.bars,
                    grid.beats_per_bar,
                    self.cfg.swing,
                    i != last,
                    &mut self.rng,
                ));
            }
            events.extend(generate_bass(&section.progression, params, &mut self.rng));
            events.extend(generate_comping(
                &section.progression,
                params,
                grid.beats_per_bar,
                &mut self.rng,
            )?);
            if section.kind == SectionKind::Hook {
                events.extend(generate_lead(&section.progression, params, &mut self.rng));
            }

            debug!("{}: {} events", section.kind.name(), events.len());
            section_events.push(events);
        }

        // ── GridAligned ─────────────────────────────────────────────────
        let mut all_events: Vec<NoteEvent> = Vec::new();
        let mut start_beat = 0.0;
        for (section, events) in sections.iter_mut().zip(section_events) {
            let section_beats = (section.bars * grid.beats_per_bar) as f64;
            section.start_beat = start_beat;

            let total_bars: u32 = section.bars;
            for mut event in events {
                if event.onset < 0.0 || event.onset >= section_beats {
                    return Err(Error::GridMisalignment(format!(
                        "{} event at {} beats falls outside its {}-beat section",
                        section.kind.name(),
                        event.onset,
                        section_beats
                    )));
                }
                // Section dynamics arc, then the configured mix level.
                let bar = (event.onset / grid.beats_per_bar as f64).floor() as u32;
                let level = dynamic_level(section.kind, bar, total_bars)
                    * self.cfg.mix.level(event.instrument);
                event.velocity = scale_velocity(event.velocity, level);
                event.onset += start_beat;
                all_events.push(event);
            }

            start_beat += section_beats;
        }
        let total_beats = start_beat;

        // ── Humanized ───────────────────────────────────────────────────
        // Pitched instruments share the ensemble's swing feel on off-beat
        // eighths (drums already swing their own grid).
        for event in &mut all_events {
            if event.instrument != Instrument::Drums {
                let beat_pos = event.onset.rem_euclid(1.0);
                if (0.4..0.6).contains(&beat_pos) {
                    event.onset += self.cfg.swing * 0.25;
                }
            }
        }
        for event in &mut all_events {
            let timing_bound = match event.instrument {
                Instrument::Drums => params.jitter.drums_timing,
                Instrument::Bass => params.jitter.bass_timing,
                Instrument::Piano | Instrument::Lead => params.jitter.piano_timing,
            };
            let jitter = self.rng.gen_range(-timing_bound..=timing_bound);
            event.onset = (event.onset + jitter).max(0.0);

            let vel_frac = self.rng.gen_range(-params.jitter.velocity_frac..=params.jitter.velocity_frac);
            event.velocity = scale_velocity(event.velocity, 1.0 + vel_frac);

            // Nothing rings past the end of the track.
            if event.onset + event.duration > total_beats {
                event.duration = (total_beats - event.onset).max(0.0);
            }
        }

        // ── Assembled ───────────────────────────────────────────────────
        all_events.sort_by(|a, b| {
            a.onset
                .partial_cmp(&b.onset)
                .unwrap_or(Ordering::Equal)
                .then(a.instrument.priority().cmp(&b.instrument.priority()))
        });

        info!(
            "assembled {} events over {} bars",
            all_events.len(),
            sections.iter().map(|s| s.bars).sum::<u32>()
        );

        Ok(Track {
            grid,
            key_name: self.cfg.key_name.clone(),
            style: self.cfg.style.name().to_string(),
            sections,
            events: all_events,
            mix: self.cfg.mix,
        })
    }

    /// Derive the section plan from the configured track length: the style's
    /// intro and outro frame an alternating verse/hook cycle, and any
    /// leftover bars are absorbed by the outro so the plan lands within the
    /// ±1 bar tolerance of the target.
    fn plan_sections(&self) -> Vec<(SectionKind, u32)> {
        let t = &self.cfg.params().template;
        let target_bars = (self.cfg.length_minutes * self.cfg.grid.tempo_bpm
            / self.cfg.grid.beats_per_bar as f64)
            .round() as u32;

        let mut plan = vec![(SectionKind::Intro, t.intro_bars)];
        let mut remaining = target_bars.saturating_sub(t.intro_bars + t.outro_bars);
        let cycle = t.verse_bars + t.hook_bars;
        let mut bridge_pending = t.bridge_bars;
        let mut cycles = 0u32;

        while remaining >= cycle {
            plan.push((SectionKind::Verse, t.verse_bars));
            plan.push((SectionKind::Hook, t.hook_bars));
            remaining -= cycle;
            cycles += 1;

            // A bridge earns its place only once, after the second hook,
            // and only if a full cycle still follows it.
            if let Some(bridge) = bridge_pending {
                if cycles == 2 && remaining >= bridge + cycle {
                    plan.push((SectionKind::Bridge, bridge));
                    remaining -= bridge;
                    bridge_pending = None;
                }
            }
        }
        if remaining >= t.verse_bars {
            plan.push((SectionKind::Verse, t.verse_bars));
            remaining -= t.verse_bars;
        }
        plan.push((SectionKind::Outro, t.outro_bars + remaining));
        plan
    }
}

fn dynamic_level(kind: SectionKind, bar: u32, total_bars: u32) -> f64 {
    let base = match kind {
        SectionKind::Intro => 0.6,
        SectionKind::Verse => 0.7,
        SectionKind::Hook => 0.85,
        SectionKind::Bridge => 0.8,
        SectionKind::Outro => 0.6,
    };
    let progress = if total_bars == 0 {
        0.0
    } else {
        bar as f64 / total_bars as f64
    };
    let curve = match kind {
        SectionKind::Hook => 0.9 + 0.1 * progress,
        SectionKind::Outro => 1.0 - 0.4 * progress,
        _ => 0.95 + 0.05 * progress,
    };
    base * curve
}

fn scale_velocity(velocity: u8, level: f64) -> u8 {
    (velocity as f64 * level).round().clamp(1.0, 127.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;

    fn config(tempo: u32, minutes: f64) -> TrackConfig {
        TrackConfig {
            tempo: Some(tempo),
            key: Some("C".to_string()),
            length_minutes: Some(minutes),
            seed: Some(1),
            ..TrackConfig::default()
        }
    }

    #[test]
    fn plan_hits_target_within_one_bar() {
        for (tempo, minutes) in [(60u32, 2.0), (90, 3.0), (120, 5.0), (140, 8.0)] {
            let resolved = resolve(&config(tempo, minutes)).unwrap();
            let plan = Composer::new(resolved).plan_sections();
            let planned: u32 = plan.iter().map(|(_, b)| *b).sum();
            let target = minutes * tempo as f64 / 4.0;
            assert!(
                (planned as f64 - target).abs() <= 1.0,
                "{tempo} BPM / {minutes} min: planned {planned} vs target {target}"
            );
        }
    }

    #[test]
    fn plan_is_framed_by_intro_and_outro() {
        let resolved = resolve(&config(90, 3.0)).unwrap();
        let plan = Composer::new(resolved).plan_sections();
        assert_eq!(plan.first().unwrap().0, SectionKind::Intro);
        assert_eq!(plan.last().unwrap().0, SectionKind::Outro);
        assert!(plan.iter().any(|(k, _)| *k == SectionKind::Hook));
    }

    #[test]
    fn outro_dynamics_fade() {
        let start = dynamic_level(SectionKind::Outro, 0, 8);
        let end = dynamic_level(SectionKind::Outro, 7, 8);
        assert!(end < start);
    }

    #[test]
    fn hook_dynamics_build() {
        let start = dynamic_level(SectionKind::Hook, 0, 8);
        let end = dynamic_level(SectionKind::Hook, 7, 8);
        assert!(end > start);
    }
}

//! groovelib — procedural jazz-hip-hop composition engine.
//!
//! A harmonic skeleton (chord progression) drives four cooperating
//! generators — piano voicings, bass lines, drum patterns, and the
//! arrangement layer — combined on a shared beat grid and emitted as a
//! single ordered event list for a downstream renderer.
//!
//! # Example
//! ```
//! use groovelib::{generate_track, TrackConfig};
//!
//! let config = TrackConfig {
//!     tempo: Some(90),
//!     key: Some("C".to_string()),
//!     length_minutes: Some(3.0),
//!     seed: Some(42),
//!     ..TrackConfig::default()
//! };
//! let track = generate_track(&config).unwrap();
//! println!("{} bars, {} events", track.total_bars(), track.events.len());
//! ```

pub mod bass;
pub mod chords;
pub mod config;
pub mod drums;
pub mod engine;
pub mod error;
pub mod model;
pub mod progression;
pub mod scale;
pub mod voicing;

pub use chords::{Chord, ChordQuality, HarmonicFunction};
pub use config::{ResolvedConfig, StylePreset, TrackConfig};
pub use error::{Error, Result};
pub use model::{
    ChordSpan, Instrument, InstrumentMix, NoteEvent, Section, SectionKind, TimeGrid, Track,
};
pub use scale::{Key, Mode};

/// Generate a complete track from a configuration.
pub fn generate_track(config: &TrackConfig) -> Result<Track> {
    engine::compose(config)
}

/// Parse a JSON configuration and generate a track from it.
/// Unknown JSON fields are ignored; missing fields take preset defaults.
pub fn generate_track_from_json(json: &str) -> Result<Track> {
    let config: TrackConfig = serde_json::from_str(json)
        .map_err(|e| Error::InvalidConfiguration(vec![format!("malformed config JSON: {e}")]))?;
    generate_track(&config)
}

/// Serialize a track to a JSON string for the renderer / FFI boundary.
pub fn track_to_json(track: &Track) -> serde_json::Result<String> {
    serde_json::to_string_pretty(track)
}

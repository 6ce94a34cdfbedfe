//! Error types for track generation.
//!
//! Configuration errors are user-facing and recoverable (fix the config and
//! retry); vocabulary and grid errors indicate internal defects and abort the
//! run — no partial `Track` is ever returned.

use thiserror::Error;

/// All failure modes of the composition engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// One or more configuration fields are out of range. Carries *every*
    /// violation found, not just the first.
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfiguration(Vec<String>),

    /// The style preset name is not one of the registered presets.
    #[error("unknown style preset '{0}'")]
    UnknownPreset(String),

    /// A chord quality symbol is not registered in the vocabulary.
    #[error("unknown chord quality '{0}'")]
    UnknownChordQuality(String),

    /// A chord resolved to fewer tones than a playable voicing needs.
    #[error("chord {chord} resolved to only {tones} tones, need at least 3")]
    InsufficientVoicing { chord: String, tones: usize },

    /// Internal invariant violation: section durations or event onsets do
    /// not line up on the shared grid.
    #[error("grid misalignment: {0}")]
    GridMisalignment(String),
}

pub type Result<T> = std::result::Result<T, Error>;

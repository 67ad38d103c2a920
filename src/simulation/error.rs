//! Error types for the train simulation
//!
//! Contention and track exhaustion are expected outcomes and surface as
//! [`PlacementError`] or a [`StepOutcome`](super::train::StepOutcome) variant.
//! Layout and configuration errors are fatal at startup.

use thiserror::Error;

use super::types::GridPos;

/// The layout text could not be turned into a track graph
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,

    #[error("layout contains no track cells")]
    NoTrack,

    #[error("unknown glyph {glyph:?} at {pos}")]
    UnknownGlyph { glyph: char, pos: GridPos },
}

/// A train could not be placed on the track
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("track from {entry} ends after {found} of {needed} cells")]
    TrackTooShort {
        entry: GridPos,
        needed: usize,
        found: usize,
    },

    #[error("cell {0} is already occupied")]
    Occupied(GridPos),

    #[error("cell {0} is not track")]
    NotTrack(GridPos),

    #[error("train length must be at least 1")]
    ZeroLength,
}

/// Invalid simulation settings
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("train length must be at least 1")]
    ZeroTrainLength,

    #[error("spawn probability {0} is outside [0, 1]")]
    InvalidSpawnProbability(f64),

    #[error("step delay range {min}..{max} must be non-empty, finite and non-negative")]
    InvalidSpeedRange { min: f64, max: f64 },

    #[error("spawn interval must be non-zero")]
    ZeroSpawnInterval,

    #[error("max trains must be at least 1")]
    ZeroMaxTrains,
}

//! Core types for the train simulation
//!
//! Plain value types shared by the track, the trains and the driver.

use std::fmt;
use std::time::Duration;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for train IDs
///
/// Cells refer to their occupant through this id only, never through an
/// owning reference to the train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainId(pub SimId);

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "train#{}", self.0 .0)
    }
}

/// Directional kind of a track cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// `-`
    Straight,
    /// `/`, climbs one row per column
    BranchLeft,
    /// `\`, descends one row per column
    BranchRight,
    /// Blank, impassable
    Void,
}

impl CellKind {
    /// Parse a layout character
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '-' => Some(CellKind::Straight),
            '/' => Some(CellKind::BranchLeft),
            '\\' => Some(CellKind::BranchRight),
            ' ' => Some(CellKind::Void),
            _ => None,
        }
    }

    /// The layout character for this kind
    pub fn glyph(self) -> char {
        match self {
            CellKind::Straight => '-',
            CellKind::BranchLeft => '/',
            CellKind::BranchRight => '\\',
            CellKind::Void => ' ',
        }
    }

    pub fn is_track(self) -> bool {
        self != CellKind::Void
    }
}

/// A (row, column) position in the track grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Apply a signed offset, returning `None` when it leaves the
    /// non-negative quadrant
    pub fn offset(&self, d_row: isize, d_col: isize) -> Option<GridPos> {
        Some(GridPos {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Number of cells a freshly spawned train occupies
pub const TRAIN_LENGTH: usize = 5;

/// Lower bound of the per-step delay, in seconds
pub const MIN_STEP_DELAY_SECS: f64 = 0.01;

/// Upper bound (exclusive) of the per-step delay, in seconds
pub const MAX_STEP_DELAY_SECS: f64 = 0.2;

/// Time between two spawner sweeps
pub const SPAWN_INTERVAL: Duration = Duration::from_secs(2);

/// Chance that a sweep tries to spawn on a given entry cell
pub const SPAWN_PROBABILITY: f64 = 0.2;

/// Upper bound on concurrently running trains
pub const MAX_TRAINS: usize = 64;

/// Time between two rendered frames
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

//! Train Simulation Library
//!
//! Trains spawned on a text-grid track advance concurrently, each on its own
//! thread, claiming and releasing cells under per-cell locks.

pub mod render;
pub mod simulation;

/// Track layout used when none is given on the command line
pub const DEFAULT_LAYOUT: &str = include_str!("../layouts/default.txt");

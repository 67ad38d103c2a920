//! Standalone train simulation module
//!
//! Trains run along a grid of track cells, one thread per train, sharing
//! nothing but per-cell occupancy slots. Rendering and process setup live
//! outside this module and only read [`TrackSnapshot`]s.

mod cell;
mod config;
mod driver;
mod error;
mod rng;
mod spawner;
mod stats;
mod track;
mod train;
mod types;

pub use cell::{Cell, Move, OccupancySlot};
pub use config::SimConfig;
pub use driver::{Simulation, SimulationReport};
pub use error::{ConfigError, LayoutError, PlacementError};
pub use rng::{resolve_run_seed, spawner_rng, train_rng};
pub use spawner::Spawner;
pub use stats::{SimStats, StatsSnapshot, TrainExit};
pub use track::{CellView, TrackGraph, TrackSnapshot};
pub use train::{StepOutcome, Train, TrainSpec};
pub use types::{
    CellKind, GridPos, SimId, TrainId, MAX_STEP_DELAY_SECS, MAX_TRAINS, MIN_STEP_DELAY_SECS,
    REFRESH_INTERVAL, SPAWN_INTERVAL, SPAWN_PROBABILITY, TRAIN_LENGTH,
};

//! Simulation settings

use std::ops::Range;
use std::time::Duration;

use super::error::ConfigError;
use super::types::{
    MAX_STEP_DELAY_SECS, MAX_TRAINS, MIN_STEP_DELAY_SECS, SPAWN_INTERVAL, SPAWN_PROBABILITY,
    TRAIN_LENGTH,
};

/// Tunables for one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Cells occupied by every spawned train
    pub train_length: usize,
    /// Per-step delay range in seconds; each train draws once
    pub speed_range: Range<f64>,
    /// Time between spawner sweeps
    pub spawn_interval: Duration,
    /// Chance per sweep and entry cell of a spawn attempt
    pub spawn_probability: f64,
    /// Spawner stops placing trains while this many are running
    pub max_trains: usize,
    /// Run seed; drawn at start when `None`
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            train_length: TRAIN_LENGTH,
            speed_range: MIN_STEP_DELAY_SECS..MAX_STEP_DELAY_SECS,
            spawn_interval: SPAWN_INTERVAL,
            spawn_probability: SPAWN_PROBABILITY,
            max_trains: MAX_TRAINS,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.train_length == 0 {
            return Err(ConfigError::ZeroTrainLength);
        }

        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::InvalidSpawnProbability(self.spawn_probability));
        }

        let Range { start, end } = self.speed_range;
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(ConfigError::InvalidSpeedRange {
                min: start,
                max: end,
            });
        }

        if self.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }

        if self.max_trains == 0 {
            return Err(ConfigError::ZeroMaxTrains);
        }

        Ok(())
    }
}

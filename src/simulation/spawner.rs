//! Train spawning at entry cells
//!
//! Placement uses the same per-cell locks as movement, so a spawn racing
//! with a moving train either wins every cell it needs or changes nothing.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use super::config::SimConfig;
use super::error::PlacementError;
use super::stats::SimStats;
use super::track::TrackGraph;
use super::train::{Train, TrainSpec};
use super::types::{GridPos, SimId, TrainId};

/// Creates trains on the entry cells of a track graph
pub struct Spawner {
    graph: Arc<TrackGraph>,
    config: SimConfig,
    entries: Vec<GridPos>,
    next_id: usize,
    rng: StdRng,
}

impl Spawner {
    pub fn new(graph: Arc<TrackGraph>, config: SimConfig, rng: StdRng) -> Self {
        let entries = graph.entry_cells();
        Self {
            graph,
            config,
            entries,
            next_id: 0,
            rng,
        }
    }

    pub fn entries(&self) -> &[GridPos] {
        &self.entries
    }

    /// Draw the attributes of the next train
    fn next_spec(&mut self) -> TrainSpec {
        let name = char::from(b'a' + self.rng.random_range(0..26u8));
        let speed = self.rng.random_range(self.config.speed_range.clone());
        TrainSpec {
            id: TrainId(SimId(self.next_id)),
            name,
            length: self.config.train_length,
            speed: Duration::from_secs_f64(speed),
        }
    }

    /// Try to place a train at `entry`
    ///
    /// Ids are only consumed by trains that were actually placed.
    pub fn try_spawn_at(&mut self, entry: GridPos) -> Result<Train, PlacementError> {
        let cell = self
            .graph
            .cell(entry)
            .ok_or(PlacementError::NotTrack(entry))?;
        if !cell.is_free() {
            return Err(PlacementError::Occupied(entry));
        }

        let spec = self.next_spec();
        let train = Train::place(Arc::clone(&self.graph), spec, entry, &mut self.rng)?;
        self.next_id += 1;
        Ok(train)
    }

    /// One pass over every entry cell
    ///
    /// `live` is the number of trains currently running; no more than
    /// `max_trains - live` trains are returned. Placement failures are
    /// counted and otherwise ignored.
    pub fn sweep(&mut self, live: usize, stats: &SimStats) -> Vec<Train> {
        let mut budget = self.config.max_trains.saturating_sub(live);
        let mut placed = Vec::new();

        for index in 0..self.entries.len() {
            if budget == 0 {
                break;
            }
            if !self.rng.random_bool(self.config.spawn_probability) {
                continue;
            }

            let entry = self.entries[index];
            match self.try_spawn_at(entry) {
                Ok(train) => {
                    debug!("Spawned {} ({}) at {}", train.id, train.name, entry);
                    budget -= 1;
                    placed.push(train);
                }
                Err(e) => {
                    debug!("Spawn at {} rejected: {}", entry, e);
                    stats.record_placement_failure();
                }
            }
        }

        placed
    }
}

//! Simulation driver: spawner thread plus one thread per train
//!
//! ```text
//! caller                 spawner thread                train threads (<= max_trains)
//!   |                         |                              |
//!   |--start()--------------->| sweep entries                |
//!   |                         | place trains --------------->| advance
//!   |                         | reap finished handles        | recv_timeout(speed)
//!   |                         | recv_timeout(interval)       |
//!   |--snapshot() (cell locks, one at a time)                |
//!   |--stop(): drop stop_tx ->| Disconnected                 | Disconnected -> release cells
//!   |                         | join every train ----------->|
//!   |<--join spawner----------|                              |
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use super::config::SimConfig;
use super::rng::{resolve_run_seed, spawner_rng, train_rng};
use super::spawner::Spawner;
use super::stats::{SimStats, StatsSnapshot, TrainExit};
use super::track::{TrackGraph, TrackSnapshot};
use super::train::Train;
use super::types::TrainId;

/// Final numbers of a stopped simulation
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub elapsed: Duration,
    pub run_seed: u64,
    pub stats: StatsSnapshot,
    /// Train threads that ended in a panic
    pub panicked_trains: usize,
    pub track_cells: usize,
    /// Cells still marked occupied after every thread was joined
    pub residual_occupancy: usize,
}

impl SimulationReport {
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.elapsed.as_secs_f64());
        info!("Run seed: {}", self.run_seed);
        info!("Total trains spawned: {}", self.stats.trains_spawned);
        info!("Total trains retired: {}", self.stats.trains_retired);
        info!("Trains stopped on track: {}", self.stats.trains_stopped);
        info!("Active trains: {}", self.stats.live_trains);
        info!("Steps taken: {}", self.stats.steps);
        info!("Blocked steps: {}", self.stats.blocked_steps);
        info!("Placement failures: {}", self.stats.placement_failures);
        info!("Track cells: {}", self.track_cells);
        if self.panicked_trains > 0 {
            warn!("Train threads panicked: {}", self.panicked_trains);
        }
        if self.residual_occupancy > 0 {
            warn!("Cells left occupied: {}", self.residual_occupancy);
        }
    }
}

/// Owns the running train threads on behalf of the spawner thread
struct TrainSupervisor {
    handles: Vec<(TrainId, JoinHandle<TrainExit>)>,
    run_seed: u64,
    stop_rx: Receiver<()>,
    stats: Arc<SimStats>,
    panicked: usize,
}

impl TrainSupervisor {
    fn new(run_seed: u64, stop_rx: Receiver<()>, stats: Arc<SimStats>) -> Self {
        Self {
            handles: Vec::new(),
            run_seed,
            stop_rx,
            stats,
            panicked: 0,
        }
    }

    /// Start the movement loop of `train` on its own thread
    ///
    /// If the thread cannot be created the train is dropped, which frees
    /// its cells.
    fn launch(&mut self, train: Train) -> Result<()> {
        let train_id = train.id;
        let mut rng = train_rng(self.run_seed, train_id);
        let stop_rx = self.stop_rx.clone();
        let stats = Arc::clone(&self.stats);

        self.stats.record_spawn();
        let spawned = thread::Builder::new()
            .name(format!("train-{}", train_id.0 .0))
            .spawn(move || train.run(&mut rng, &stop_rx, &stats));

        match spawned {
            Ok(handle) => {
                self.handles.push((train_id, handle));
                Ok(())
            }
            Err(e) => {
                self.stats.record_exit(TrainExit::Stopped);
                Err(e).with_context(|| format!("Failed to spawn thread for {}", train_id))
            }
        }
    }

    /// Join every train thread that has already finished
    fn reap(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = self
            .handles
            .drain(..)
            .partition(|(_, handle)| handle.is_finished());
        self.handles = running;
        for (train_id, handle) in finished {
            self.join_one(train_id, handle);
        }
    }

    fn join_one(&mut self, train_id: TrainId, handle: JoinHandle<TrainExit>) {
        match handle.join() {
            Ok(exit) => debug!("{} finished: {:?}", train_id, exit),
            Err(_) => {
                // The panicking thread never reached record_exit.
                warn!("{} panicked", train_id);
                self.stats.record_exit(TrainExit::Stopped);
                self.panicked += 1;
            }
        }
    }

    /// Join every remaining train thread; returns the number that panicked
    fn join_all(mut self) -> usize {
        let handles: Vec<_> = self.handles.drain(..).collect();
        for (train_id, handle) in handles {
            self.join_one(train_id, handle);
        }
        self.panicked
    }
}

/// Spawner thread body
fn run_spawner(
    mut spawner: Spawner,
    mut supervisor: TrainSupervisor,
    interval: Duration,
    stop_rx: Receiver<()>,
) -> usize {
    loop {
        supervisor.reap();

        let live = supervisor.stats.live_trains();
        for train in spawner.sweep(live, &supervisor.stats) {
            if let Err(e) = supervisor.launch(train) {
                warn!("{:#}", e);
            }
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    supervisor.join_all()
}

/// A running simulation
///
/// Dropping the handle stops the simulation and joins every thread.
pub struct Simulation {
    graph: Arc<TrackGraph>,
    stats: Arc<SimStats>,
    stop_tx: Option<Sender<()>>,
    spawner_thread: Option<JoinHandle<usize>>,
    started_at: Instant,
    run_seed: u64,
}

impl Simulation {
    /// Validate `config` and start the spawner thread
    pub fn start(graph: TrackGraph, config: SimConfig) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;

        let graph = Arc::new(graph);
        let stats = Arc::new(SimStats::new());
        let run_seed = resolve_run_seed(config.seed);
        let interval = config.spawn_interval;

        // Never sent on; dropping the sender is the stop signal.
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let spawner = Spawner::new(Arc::clone(&graph), config, spawner_rng(run_seed));
        let entries = spawner.entries().len();
        let supervisor = TrainSupervisor::new(run_seed, stop_rx.clone(), Arc::clone(&stats));

        let spawner_thread = thread::Builder::new()
            .name("train-spawner".into())
            .spawn(move || run_spawner(spawner, supervisor, interval, stop_rx))
            .context("Failed to spawn spawner thread")?;

        info!(
            "Simulation started: {}x{} grid, {} entry cells, seed {}",
            graph.width(),
            graph.height(),
            entries,
            run_seed
        );

        Ok(Self {
            graph,
            stats,
            stop_tx: Some(stop_tx),
            spawner_thread: Some(spawner_thread),
            started_at: Instant::now(),
            run_seed,
        })
    }

    pub fn graph(&self) -> &TrackGraph {
        &self.graph
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    /// Current cell occupancy, for renderers
    pub fn snapshot(&self) -> TrackSnapshot {
        self.graph.snapshot()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Signal every thread to stop and wait for them
    pub fn stop(mut self) -> SimulationReport {
        let panicked_trains = self.shutdown();
        SimulationReport {
            elapsed: self.started_at.elapsed(),
            run_seed: self.run_seed,
            stats: self.stats.snapshot(),
            panicked_trains,
            track_cells: self.graph.track_cell_count(),
            residual_occupancy: self.graph.cells().filter(|cell| !cell.is_free()).count(),
        }
    }

    fn shutdown(&mut self) -> usize {
        drop(self.stop_tx.take());
        match self.spawner_thread.take().map(JoinHandle::join) {
            Some(Ok(panicked)) => panicked,
            Some(Err(_)) => {
                warn!("Spawner thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}

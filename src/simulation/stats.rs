//! Run statistics shared by the spawner and every train thread

use std::sync::atomic::{AtomicUsize, Ordering};

/// Why a train's movement loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainExit {
    /// Reached the end of the track
    Retired,
    /// The simulation was stopped while the train was on the track
    Stopped,
}

/// Counters updated concurrently with relaxed ordering
///
/// Values read while the simulation runs are approximate; they are exact
/// once every thread has been joined.
#[derive(Debug, Default)]
pub struct SimStats {
    spawned: AtomicUsize,
    retired: AtomicUsize,
    stopped: AtomicUsize,
    steps: AtomicUsize,
    blocked_steps: AtomicUsize,
    placement_failures: AtomicUsize,
    live: AtomicUsize,
}

/// Plain copy of [`SimStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub trains_spawned: usize,
    pub trains_retired: usize,
    pub trains_stopped: usize,
    pub steps: usize,
    pub blocked_steps: usize,
    pub placement_failures: usize,
    pub live_trains: usize,
}

impl SimStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spawn(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
        self.live.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exit(&self, exit: TrainExit) {
        match exit {
            TrainExit::Retired => self.retired.fetch_add(1, Ordering::Relaxed),
            TrainExit::Stopped => self.stopped.fetch_add(1, Ordering::Relaxed),
        };
        self.live.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_step(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blocked(&self) {
        self.blocked_steps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_placement_failure(&self) {
        self.placement_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn live_trains(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            trains_spawned: self.spawned.load(Ordering::Relaxed),
            trains_retired: self.retired.load(Ordering::Relaxed),
            trains_stopped: self.stopped.load(Ordering::Relaxed),
            steps: self.steps.load(Ordering::Relaxed),
            blocked_steps: self.blocked_steps.load(Ordering::Relaxed),
            placement_failures: self.placement_failures.load(Ordering::Relaxed),
            live_trains: self.live.load(Ordering::Relaxed),
        }
    }
}

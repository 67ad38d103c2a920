//! Train placement and movement
//!
//! A train owns the ordered list of cells it sits on (tail first, head last).
//! The cells themselves are shared; their occupant is only ever written while
//! holding that cell's lock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, trace};
use rand::Rng;

use super::error::PlacementError;
use super::stats::{SimStats, TrainExit};
use super::track::TrackGraph;
use super::types::{GridPos, TrainId};

/// Result of a single movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Head entered a new cell and the tail cell was released
    Moved,
    /// The next cell is held by another train; nothing changed
    Blocked,
    /// No cell beyond the head; every cell has been released
    Retired,
}

/// Fixed attributes of a train, chosen before placement
#[derive(Debug, Clone, Copy)]
pub struct TrainSpec {
    pub id: TrainId,
    pub name: char,
    pub length: usize,
    /// Delay between two movement steps
    pub speed: Duration,
}

/// A train on the track
#[derive(Debug)]
pub struct Train {
    pub id: TrainId,
    pub name: char,
    pub length: usize,
    pub speed: Duration,
    occupied: VecDeque<GridPos>,
    running: bool,
    graph: Arc<TrackGraph>,
}

impl Train {
    /// Claim `spec.length` consecutive cells starting at `entry`
    ///
    /// The entry becomes the tail. Every cell's lock is taken without
    /// blocking and held until all cells are claimed; a lock held by someone
    /// else counts as occupied. On failure nothing is changed.
    pub fn place<R>(
        graph: Arc<TrackGraph>,
        spec: TrainSpec,
        entry: GridPos,
        rng: &mut R,
    ) -> Result<Self, PlacementError>
    where
        R: Rng + ?Sized,
    {
        let occupied = claim_run(&graph, spec.id, entry, spec.length, rng)?;

        Ok(Self {
            id: spec.id,
            name: spec.name,
            length: spec.length,
            speed: spec.speed,
            occupied,
            running: true,
            graph,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Occupied cells, tail first
    pub fn occupied(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.occupied.iter().copied()
    }

    /// Most recently entered cell
    pub fn head(&self) -> Option<GridPos> {
        self.occupied.back().copied()
    }

    /// Oldest cell
    pub fn tail(&self) -> Option<GridPos> {
        self.occupied.front().copied()
    }

    /// Move one cell forward, or retire at the end of the track
    pub fn advance<R>(&mut self, rng: &mut R) -> StepOutcome
    where
        R: Rng + ?Sized,
    {
        if !self.running {
            return StepOutcome::Retired;
        }

        let Some(head) = self.head() else {
            self.running = false;
            return StepOutcome::Retired;
        };

        let graph = Arc::clone(&self.graph);
        let Some(next) = graph.resolve_next(head, rng) else {
            debug!("{} ({}) reached the end of the track at {}", self.id, self.name, head);
            self.release_all();
            return StepOutcome::Retired;
        };

        // New cell first, then the tail it replaces.
        let mut next_slot = next.slot().lock();
        if next_slot.is_some() {
            trace!("{} blocked at {} by {:?}", self.id, next.pos, *next_slot);
            return StepOutcome::Blocked;
        }
        *next_slot = Some(self.id);

        if let Some(tail) = self.occupied.pop_front() {
            if let Some(tail_cell) = graph.cell(tail) {
                let mut tail_slot = tail_cell.slot().lock();
                if *tail_slot == Some(self.id) {
                    *tail_slot = None;
                }
            }
        }
        self.occupied.push_back(next.pos);
        drop(next_slot);

        trace!("{} moved {} -> {}", self.id, head, next.pos);
        StepOutcome::Moved
    }

    /// Clear every occupied cell and stop the train
    pub fn release_all(&mut self) {
        for pos in self.occupied.drain(..) {
            if let Some(cell) = self.graph.cell(pos) {
                cell.release(self.id);
            }
        }
        self.running = false;
    }

    /// Step, then wait `speed`, until the track ends or `stop` fires
    ///
    /// `stop` fires when its sender side is dropped. A stopped train
    /// releases its cells before returning.
    pub fn run<R>(mut self, rng: &mut R, stop: &Receiver<()>, stats: &SimStats) -> TrainExit
    where
        R: Rng + ?Sized,
    {
        let exit = loop {
            if !self.running {
                break TrainExit::Retired;
            }

            match self.advance(rng) {
                StepOutcome::Moved => stats.record_step(),
                StepOutcome::Blocked => stats.record_blocked(),
                StepOutcome::Retired => break TrainExit::Retired,
            }

            match stop.recv_timeout(self.speed) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    self.release_all();
                    break TrainExit::Stopped;
                }
            }
        };

        stats.record_exit(exit);
        exit
    }
}

impl Drop for Train {
    fn drop(&mut self) {
        // No-op after retirement; frees the cells of a train that never ran.
        self.release_all();
    }
}

/// Resolve and claim the run of cells for a new train
fn claim_run<R>(
    graph: &TrackGraph,
    train_id: TrainId,
    entry: GridPos,
    length: usize,
    rng: &mut R,
) -> Result<VecDeque<GridPos>, PlacementError>
where
    R: Rng + ?Sized,
{
    if length == 0 {
        return Err(PlacementError::ZeroLength);
    }

    match graph.cell(entry) {
        Some(cell) if cell.kind.is_track() => {}
        _ => return Err(PlacementError::NotTrack(entry)),
    }

    let mut path = VecDeque::with_capacity(length);
    path.push_back(entry);
    while path.len() < length {
        let last = path[path.len() - 1];
        let next = graph
            .resolve_next(last, rng)
            .ok_or(PlacementError::TrackTooShort {
                entry,
                needed: length,
                found: path.len(),
            })?;
        path.push_back(next.pos);
    }

    let mut guards = Vec::with_capacity(length);
    for &pos in &path {
        let cell = graph.cell(pos).ok_or(PlacementError::NotTrack(pos))?;
        let guard = cell
            .slot()
            .try_lock()
            .ok_or(PlacementError::Occupied(pos))?;
        if guard.is_some() {
            return Err(PlacementError::Occupied(pos));
        }
        guards.push(guard);
    }

    for guard in guards.iter_mut() {
        **guard = Some(train_id);
    }

    Ok(path)
}

//! Track cells and their occupancy slots
//!
//! Every cell carries its own lock. Two trains contending for the same cell
//! serialize on that lock only; unrelated cells never contend.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use super::types::{CellKind, GridPos, TrainId};

/// One admissible move out of a cell: a grid offset and the kinds a
/// neighbour at that offset may have
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub d_row: isize,
    pub d_col: isize,
    pub allowed: &'static [CellKind],
}

const STRAIGHT_MOVES: &[Move] = &[
    Move {
        d_row: 0,
        d_col: 1,
        allowed: &[CellKind::Straight, CellKind::BranchLeft, CellKind::BranchRight],
    },
    Move {
        d_row: -1,
        d_col: 1,
        allowed: &[CellKind::BranchLeft],
    },
    Move {
        d_row: 1,
        d_col: 1,
        allowed: &[CellKind::BranchRight],
    },
];

// Not mirror images of each other; kept as the layouts expect.
const BRANCH_LEFT_MOVES: &[Move] = &[
    Move {
        d_row: -1,
        d_col: 1,
        allowed: &[CellKind::BranchLeft, CellKind::Straight],
    },
    Move {
        d_row: 0,
        d_col: 1,
        allowed: &[CellKind::Straight],
    },
];

const BRANCH_RIGHT_MOVES: &[Move] = &[
    Move {
        d_row: 0,
        d_col: 1,
        allowed: &[CellKind::Straight],
    },
    Move {
        d_row: 1,
        d_col: 1,
        allowed: &[CellKind::BranchRight, CellKind::Straight],
    },
];

impl CellKind {
    /// Moves a train may take when leaving a cell of this kind
    pub fn moves(self) -> &'static [Move] {
        match self {
            CellKind::Straight => STRAIGHT_MOVES,
            CellKind::BranchLeft => BRANCH_LEFT_MOVES,
            CellKind::BranchRight => BRANCH_RIGHT_MOVES,
            CellKind::Void => &[],
        }
    }
}

/// Lockable occupancy slot holding at most one train id
///
/// The guarded value is a plain `Option<TrainId>`, so a poisoned lock is
/// recovered rather than propagated: a panicking train cannot leave the slot
/// half-written.
#[derive(Debug, Default)]
pub struct OccupancySlot(Mutex<Option<TrainId>>);

impl OccupancySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the slot is held
    pub fn lock(&self) -> MutexGuard<'_, Option<TrainId>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the slot only if nobody else holds it right now
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Option<TrainId>>> {
        match self.0.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Copy of the current occupant
    pub fn occupant(&self) -> Option<TrainId> {
        *self.lock()
    }
}

/// A single node of the track graph
#[derive(Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub pos: GridPos,
    slot: OccupancySlot,
}

impl Cell {
    pub fn new(kind: CellKind, pos: GridPos) -> Self {
        Self {
            kind,
            pos,
            slot: OccupancySlot::new(),
        }
    }

    /// Column index
    pub fn x(&self) -> usize {
        self.pos.col
    }

    /// Row index
    pub fn y(&self) -> usize {
        self.pos.row
    }

    pub fn slot(&self) -> &OccupancySlot {
        &self.slot
    }

    pub fn occupant(&self) -> Option<TrainId> {
        self.slot.occupant()
    }

    pub fn is_free(&self) -> bool {
        self.occupant().is_none()
    }

    /// Clear the occupant if it is `train_id`
    ///
    /// Returns whether the cell was released.
    pub fn release(&self, train_id: TrainId) -> bool {
        let mut occupant = self.slot.lock();
        if *occupant == Some(train_id) {
            *occupant = None;
            true
        } else {
            false
        }
    }
}

//! Track graph built from a text layout
//!
//! The graph is a dense grid of [`Cell`]s. Topology is fixed at construction;
//! only cell occupancy changes afterwards, so the graph is shared between
//! threads behind an `Arc` without any outer lock.

use std::str::FromStr;

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::cell::Cell;
use super::error::LayoutError;
use super::types::{CellKind, GridPos, TrainId};

/// What a reader sees at one grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub kind: CellKind,
    pub occupant: Option<TrainId>,
}

/// Point-in-time copy of the grid's occupancy
///
/// Cells are copied one lock at a time, so a snapshot taken while trains are
/// moving may show a train mid-step.
#[derive(Debug, Clone)]
pub struct TrackSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellView>,
}

impl TrackSnapshot {
    pub fn get(&self, pos: GridPos) -> Option<&CellView> {
        if pos.row >= self.height || pos.col >= self.width {
            return None;
        }
        self.cells.get(pos.row * self.width + pos.col)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellView]> {
        // chunks() rejects a zero size
        self.cells.chunks(self.width.max(1))
    }

    /// Number of cells each train occupies in this snapshot
    pub fn occupied_counts(&self) -> std::collections::HashMap<TrainId, usize> {
        let mut counts = std::collections::HashMap::new();
        for view in &self.cells {
            if let Some(train_id) = view.occupant {
                *counts.entry(train_id).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Immutable track topology plus per-cell occupancy slots
#[derive(Debug)]
pub struct TrackGraph {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl TrackGraph {
    /// Build a graph from layout text
    ///
    /// Row index is the line number and column index the character offset.
    /// Short lines are padded with void cells.
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = layout.lines().collect();
        if lines.is_empty() {
            return Err(LayoutError::Empty);
        }

        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let mut rows = Vec::with_capacity(lines.len());
        let mut track_cells = 0;
        for (row, line) in lines.iter().enumerate() {
            let mut cells = Vec::with_capacity(width);
            for (col, glyph) in line.chars().enumerate() {
                let pos = GridPos::new(row, col);
                let kind =
                    CellKind::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph { glyph, pos })?;
                if kind.is_track() {
                    track_cells += 1;
                }
                cells.push(Cell::new(kind, pos));
            }
            for col in cells.len()..width {
                cells.push(Cell::new(CellKind::Void, GridPos::new(row, col)));
            }
            rows.push(cells);
        }

        if track_cells == 0 {
            return Err(LayoutError::NoTrack);
        }

        debug!(
            "Parsed layout: {}x{} grid, {} track cells",
            width,
            rows.len(),
            track_cells
        );

        Ok(Self { rows, width })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.rows.get(pos.row)?.get(pos.col)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    pub fn track_cell_count(&self) -> usize {
        self.cells().filter(|cell| cell.kind.is_track()).count()
    }

    /// Cells where trains may be spawned: the first cell of every row whose
    /// track starts with a straight piece
    pub fn entry_cells(&self) -> Vec<GridPos> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter(|cell| cell.kind == CellKind::Straight)
            .map(|cell| cell.pos)
            .collect()
    }

    /// Every neighbour a train on `pos` may move to next
    ///
    /// Pure function of the topology: occupancy is not consulted.
    pub fn candidates(&self, pos: GridPos) -> Vec<&Cell> {
        let Some(cell) = self.cell(pos) else {
            return Vec::new();
        };

        cell.kind
            .moves()
            .iter()
            .filter_map(|mv| {
                let next = self.cell(pos.offset(mv.d_row, mv.d_col)?)?;
                mv.allowed.contains(&next.kind).then_some(next)
            })
            .collect()
    }

    /// Pick the next cell after `pos`, uniformly among the candidates
    ///
    /// Returns `None` at the end of the track.
    pub fn resolve_next<R>(&self, pos: GridPos, rng: &mut R) -> Option<&Cell>
    where
        R: Rng + ?Sized,
    {
        let candidates = self.candidates(pos);
        candidates.choose(rng).copied()
    }

    /// Copy every cell's kind and occupant
    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            width: self.width,
            height: self.rows.len(),
            cells: self
                .cells()
                .map(|cell| CellView {
                    kind: cell.kind,
                    occupant: cell.occupant(),
                })
                .collect(),
        }
    }

    /// Positions currently held by `train_id`
    pub fn cells_held_by(&self, train_id: TrainId) -> Vec<GridPos> {
        self.cells()
            .filter(|cell| cell.occupant() == Some(train_id))
            .map(|cell| cell.pos)
            .collect()
    }
}

impl FromStr for TrackGraph {
    type Err = LayoutError;

    fn from_str(layout: &str) -> Result<Self, Self::Err> {
        Self::parse(layout)
    }
}

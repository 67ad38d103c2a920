//! Track layout parsing and next-cell resolution

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use train_sim::simulation::{CellKind, GridPos, LayoutError, TrackGraph};
use train_sim::DEFAULT_LAYOUT;

fn positions(graph: &TrackGraph, pos: GridPos) -> Vec<GridPos> {
    let mut found: Vec<GridPos> = graph.candidates(pos).iter().map(|cell| cell.pos).collect();
    found.sort();
    found
}

#[test]
fn test_parse_glyphs() {
    let graph = TrackGraph::parse("-/\\ ").unwrap();
    assert_eq!(graph.width(), 4);
    assert_eq!(graph.height(), 1);

    let kinds: Vec<CellKind> = graph.cells().map(|cell| cell.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CellKind::Straight,
            CellKind::BranchLeft,
            CellKind::BranchRight,
            CellKind::Void
        ]
    );
    assert_eq!(graph.track_cell_count(), 3);
}

#[test]
fn test_cell_coordinates_follow_layout() {
    let graph = TrackGraph::parse("--\n -").unwrap();
    let cell = graph.cell(GridPos::new(1, 1)).unwrap();
    assert_eq!(cell.x(), 1);
    assert_eq!(cell.y(), 1);
    assert_eq!(cell.kind, CellKind::Straight);
    assert!(cell.is_free());
}

#[test]
fn test_ragged_rows_are_padded_with_void() {
    let graph = TrackGraph::parse("------\n--").unwrap();
    assert_eq!(graph.width(), 6);
    assert_eq!(
        graph.cell(GridPos::new(1, 5)).map(|cell| cell.kind),
        Some(CellKind::Void)
    );
    assert!(graph.cell(GridPos::new(1, 6)).is_none());
    assert!(graph.cell(GridPos::new(2, 0)).is_none());
}

#[test]
fn test_layout_errors() {
    assert_eq!(TrackGraph::parse("").unwrap_err(), LayoutError::Empty);
    assert_eq!(TrackGraph::parse("   \n  ").unwrap_err(), LayoutError::NoTrack);
    assert_eq!(
        TrackGraph::parse("--\n-x-").unwrap_err(),
        LayoutError::UnknownGlyph {
            glyph: 'x',
            pos: GridPos::new(1, 1)
        }
    );
}

#[test]
fn test_from_str() {
    let graph: TrackGraph = "---".parse().unwrap();
    assert_eq!(graph.track_cell_count(), 3);
}

#[test]
fn test_entry_cells_are_leading_straights() {
    let graph = TrackGraph::parse("---\n/--\n --\n-\\").unwrap();
    assert_eq!(
        graph.entry_cells(),
        vec![GridPos::new(0, 0), GridPos::new(3, 0)]
    );
}

#[test]
fn test_default_layout_parses() {
    let graph = TrackGraph::parse(DEFAULT_LAYOUT).unwrap();
    assert!(graph.entry_cells().len() > 10);
    assert!(graph.track_cell_count() > 500);
}

#[test]
fn test_straight_moves() {
    // Straight at (1, 0) sees each row of column 1.
    let graph = TrackGraph::parse(" /\n--\n \\").unwrap();
    assert_eq!(
        positions(&graph, GridPos::new(1, 0)),
        vec![GridPos::new(0, 1), GridPos::new(1, 1), GridPos::new(2, 1)]
    );

    // Diagonal neighbours of the wrong kind are not candidates.
    let graph = TrackGraph::parse(" -\n--\n -").unwrap();
    assert_eq!(
        positions(&graph, GridPos::new(1, 0)),
        vec![GridPos::new(1, 1)]
    );
}

#[test]
fn test_straight_accepts_any_track_ahead() {
    for layout in ["--", "-/", "-\\"] {
        let graph = TrackGraph::parse(layout).unwrap();
        assert_eq!(
            positions(&graph, GridPos::new(0, 0)),
            vec![GridPos::new(0, 1)],
            "layout {:?}",
            layout
        );
    }
}

#[test]
fn test_branch_left_moves() {
    let graph = TrackGraph::parse(" /\n/-").unwrap();
    assert_eq!(
        positions(&graph, GridPos::new(1, 0)),
        vec![GridPos::new(0, 1), GridPos::new(1, 1)]
    );

    let graph = TrackGraph::parse(" -\n//").unwrap();
    // Up-right may be straight; straight ahead may not be another branch.
    assert_eq!(
        positions(&graph, GridPos::new(1, 0)),
        vec![GridPos::new(0, 1)]
    );

    let graph = TrackGraph::parse(" \\\n/ ").unwrap();
    assert!(positions(&graph, GridPos::new(1, 0)).is_empty());
}

#[test]
fn test_branch_right_moves() {
    let graph = TrackGraph::parse("\\-\n \\").unwrap();
    assert_eq!(
        positions(&graph, GridPos::new(0, 0)),
        vec![GridPos::new(0, 1), GridPos::new(1, 1)]
    );

    let graph = TrackGraph::parse("\\\\\n -").unwrap();
    assert_eq!(
        positions(&graph, GridPos::new(0, 0)),
        vec![GridPos::new(1, 1)]
    );

    let graph = TrackGraph::parse("\\ \n /").unwrap();
    assert!(positions(&graph, GridPos::new(0, 0)).is_empty());
}

#[test]
fn test_offsets_do_not_wrap_around_the_grid() {
    // A branch-left on the top row would look at row -1; it must not see the
    // bottom row.
    let graph = TrackGraph::parse("/ \n -").unwrap();
    assert!(positions(&graph, GridPos::new(0, 0)).is_empty());

    // Nothing past the last column.
    let graph = TrackGraph::parse("--").unwrap();
    assert!(positions(&graph, GridPos::new(0, 1)).is_empty());
}

#[test]
fn test_void_and_missing_cells_have_no_candidates() {
    let graph = TrackGraph::parse(" -").unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(graph.resolve_next(GridPos::new(0, 0), &mut rng).is_none());
    assert!(graph.resolve_next(GridPos::new(9, 9), &mut rng).is_none());
}

#[test]
fn test_single_candidate_resolves_deterministically() {
    let graph = TrackGraph::parse("----").unwrap();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let next = graph.resolve_next(GridPos::new(0, 0), &mut rng).unwrap();
        assert_eq!(next.pos, GridPos::new(0, 1));
    }
}

#[test]
fn test_branch_left_neighbour_resolution() {
    // Straight at (1, 0); its only admissible neighbour is the branch-left
    // one row up.
    let graph = TrackGraph::parse(" /\n- ").unwrap();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let next = graph.resolve_next(GridPos::new(1, 0), &mut rng).unwrap();
        assert_eq!(next.pos, GridPos::new(0, 1));
        assert_eq!(next.kind, CellKind::BranchLeft);
    }
}

#[test]
fn test_resolution_reaches_every_branch() {
    let graph = TrackGraph::parse(" /\n--\n \\").unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let seen: HashSet<GridPos> = (0..200)
        .filter_map(|_| graph.resolve_next(GridPos::new(1, 0), &mut rng))
        .map(|cell| cell.pos)
        .collect();
    assert_eq!(seen.len(), 3);
}

#[test]
fn test_resolution_ignores_occupancy() {
    let graph = TrackGraph::parse("--").unwrap();
    *graph.cell(GridPos::new(0, 1)).unwrap().slot().lock() =
        Some(train_sim::simulation::TrainId(train_sim::simulation::SimId(4)));

    let mut rng = StdRng::seed_from_u64(0);
    let next = graph.resolve_next(GridPos::new(0, 0), &mut rng).unwrap();
    assert_eq!(next.pos, GridPos::new(0, 1));
}

#[test]
fn test_snapshot_reports_occupants() {
    use train_sim::simulation::{SimId, TrainId};

    let graph = TrackGraph::parse("---\n-- ").unwrap();
    let train = TrainId(SimId(2));
    *graph.cell(GridPos::new(1, 1)).unwrap().slot().lock() = Some(train);

    let snapshot = graph.snapshot();
    assert_eq!(snapshot.width, 3);
    assert_eq!(snapshot.height, 2);
    assert_eq!(snapshot.get(GridPos::new(1, 1)).unwrap().occupant, Some(train));
    assert_eq!(snapshot.get(GridPos::new(0, 1)).unwrap().occupant, None);
    assert_eq!(snapshot.get(GridPos::new(1, 2)).unwrap().kind, CellKind::Void);
    assert!(snapshot.get(GridPos::new(0, 3)).is_none());
    assert_eq!(snapshot.occupied_counts().get(&train), Some(&1));
    assert_eq!(graph.cells_held_by(train), vec![GridPos::new(1, 1)]);
}

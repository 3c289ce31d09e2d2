//! Move engine - shifts and merges tiles for one swipe
//!
//! Every direction is handled by the same routine: the grid is rotated so the
//! requested direction becomes "west", each row is compacted toward column 0,
//! and the result is rotated back. Movement records are written in original
//! (unrotated) coordinates at the moment they are produced.
//!
//! Row compaction rules:
//! - tiles slide into the earliest free slot on their left
//! - a tile equal to the last placed, still-mergeable tile merges into it
//! - a merge product cannot merge again during the same move
//! - tiles already at `MAX_TILE_VALUE` do not merge
//!
//! A merge emits two records: a `shift` of the incoming tile onto the target
//! cell, then an `add` of the doubled tile (new id) on that cell.

use crate::geometry::{inverse_turns, rotated_cell};
use crate::grid::{Grid, Row};
use crate::ids::TileIds;
use crate::oracle::has_grid_changed;
use crate::types::{
    Cell, Direction, GridTile, GridTileMovement, MovementKind, GRID_SIZE, MAX_TILE_VALUE,
};

/// Outcome of applying one direction to a grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub grid: Grid,
    /// Movement trace in discovery order (row-major over the rotated grid)
    pub movements: Vec<GridTileMovement>,
}

impl MoveResult {
    /// Whether any tile moved or appeared
    pub fn has_grid_changed(&self) -> bool {
        has_grid_changed(&self.movements)
    }

    /// Sum of merge products created by this move
    pub fn merge_score(&self) -> u32 {
        self.movements
            .iter()
            .filter(|m| m.kind() == MovementKind::Add)
            .fold(0u32, |acc, m| acc.saturating_add(m.to.tile.num))
    }

    /// Number of merged pairs
    pub fn merge_count(&self) -> usize {
        self.movements
            .iter()
            .filter(|m| m.kind() == MovementKind::Add)
            .count()
    }
}

/// Per-row scan state threaded through the fold over a row's columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScanState {
    /// Column of the last placed tile that may still absorb an equal tile
    pending_merge: Option<usize>,
    /// Earliest column a sliding tile can land in
    next_free: Option<usize>,
}

/// Apply `direction` to `grid`.
///
/// Pure apart from drawing ids for merge products from `ids`.
pub fn make_move(grid: &Grid, direction: Direction, ids: &mut TileIds) -> MoveResult {
    let turns = direction.quarter_turns();
    let working = grid.rotated(turns);

    let mut movements = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
    let mut rows = *working.rows();
    for (row_index, row) in rows.iter_mut().enumerate() {
        *row = compact_row(row_index, *row, turns, ids, &mut movements);
    }

    MoveResult {
        grid: Grid::from_rows(rows).rotated(inverse_turns(turns)),
        movements,
    }
}

/// Compact one rotated row toward column 0, appending movement records.
fn compact_row(
    row_index: usize,
    tiles: Row,
    turns: u8,
    ids: &mut TileIds,
    movements: &mut Vec<GridTileMovement>,
) -> Row {
    let locate = move |col: usize| rotated_cell(Cell::new(row_index as u8, col as u8), turns);
    let mut out = tiles;

    (0..GRID_SIZE).fold(ScanState::default(), |state, col| {
        let Some(tile) = tiles[col] else {
            return ScanState {
                next_free: state.next_free.or(Some(col)),
                ..state
            };
        };
        let current = GridTile::new(locate(col), tile);

        let product = tile.num.checked_mul(2).filter(|&n| n <= MAX_TILE_VALUE);
        match (state.pending_merge, product) {
            (Some(target), Some(doubled)) if out[target].map(|t| t.num) == Some(tile.num) => {
                let target_cell = locate(target);
                let merged = ids.mint(doubled);
                movements.push(GridTileMovement::shift(
                    current,
                    GridTile::new(target_cell, tile),
                ));
                movements.push(GridTileMovement::add(GridTile::new(target_cell, merged)));

                out[target] = Some(merged);
                out[col] = None;
                ScanState {
                    pending_merge: None,
                    next_free: state.next_free.or(Some(col)),
                }
            }
            _ => {
                let placed = match state.next_free {
                    None => {
                        movements.push(GridTileMovement::noop(current));
                        col
                    }
                    Some(free) => {
                        movements.push(GridTileMovement::shift(
                            current,
                            GridTile::new(locate(free), tile),
                        ));
                        out[free] = Some(tile);
                        out[col] = None;
                        free
                    }
                };
                ScanState {
                    pending_merge: Some(placed),
                    next_free: state.next_free.map(|free| free + 1),
                }
            }
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileId;

    fn grid(values: [[u32; GRID_SIZE]; GRID_SIZE]) -> (Grid, TileIds) {
        let mut ids = TileIds::new();
        let g = Grid::from_values(&values, &mut ids).unwrap();
        (g, ids)
    }

    fn single_row(row: [u32; GRID_SIZE]) -> (Grid, TileIds) {
        grid([row, [0; 4], [0; 4], [0; 4]])
    }

    fn kinds(result: &MoveResult) -> Vec<MovementKind> {
        result.movements.iter().map(|m| m.kind()).collect()
    }

    #[test]
    fn test_adjacent_pair_merges_west() {
        let (g, mut ids) = single_row([2, 2, 0, 0]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid.values()[0], [4, 0, 0, 0]);
        assert_eq!(
            kinds(&result),
            vec![MovementKind::Noop, MovementKind::Shift, MovementKind::Add]
        );
        let shift = result.movements[1];
        assert_eq!(shift.from.map(|f| f.cell), Some(Cell::new(0, 1)));
        assert_eq!(shift.to.cell, Cell::new(0, 0));
        let add = result.movements[2];
        assert_eq!(add.to, GridTile::new(Cell::new(0, 0), result.grid.get(Cell::new(0, 0)).unwrap()));
        assert_eq!(result.merge_score(), 4);
    }

    #[test]
    fn test_gap_does_not_block_merge() {
        let (g, mut ids) = single_row([2, 0, 2, 0]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid.values()[0], [4, 0, 0, 0]);
        assert_eq!(result.merge_score(), 4);
        assert!(result.has_grid_changed());
    }

    #[test]
    fn test_alternating_row_is_unchanged() {
        let (g, mut ids) = single_row([2, 4, 2, 4]);
        let before = ids.peek();
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid, g);
        assert!(!result.has_grid_changed());
        assert!(kinds(&result).iter().all(|k| *k == MovementKind::Noop));
        assert_eq!(ids.peek(), before);
    }

    #[test]
    fn test_four_equal_tiles_make_two_merges() {
        let (g, mut ids) = single_row([4, 4, 4, 4]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid.values()[0], [8, 8, 0, 0]);
        assert_eq!(result.merge_count(), 2);
        assert_eq!(result.merge_score(), 16);
    }

    #[test]
    fn test_merge_product_does_not_merge_again() {
        let (g, mut ids) = single_row([2, 2, 4, 0]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid.values()[0], [4, 4, 0, 0]);
        assert_eq!(result.merge_count(), 1);
    }

    #[test]
    fn test_leading_tile_merges_before_trailing() {
        let (g, mut ids) = single_row([2, 2, 2, 0]);
        let result = make_move(&g, Direction::West, &mut ids);
        assert_eq!(result.grid.values()[0], [4, 2, 0, 0]);

        let (g, mut ids) = single_row([0, 2, 2, 2]);
        let result = make_move(&g, Direction::East, &mut ids);
        assert_eq!(result.grid.values()[0], [0, 0, 2, 4]);
    }

    #[test]
    fn test_shift_after_different_value() {
        let (g, mut ids) = single_row([0, 2, 0, 4]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid.values()[0], [2, 4, 0, 0]);
        assert_eq!(kinds(&result), vec![MovementKind::Shift, MovementKind::Shift]);
    }

    #[test]
    fn test_empty_grid_produces_no_movements() {
        let mut ids = TileIds::new();
        for direction in Direction::ALL {
            let result = make_move(&Grid::empty(), direction, &mut ids);
            assert!(result.movements.is_empty());
            assert!(result.grid.is_empty());
        }
    }

    #[test]
    fn test_every_direction_reports_original_coordinates() {
        let (g, mut ids) = grid([[0; 4], [0, 2, 0, 0], [0; 4], [0; 4]]);
        let id = g.get(Cell::new(1, 1)).unwrap().id;

        let cases = [
            (Direction::North, Cell::new(0, 1)),
            (Direction::South, Cell::new(3, 1)),
            (Direction::East, Cell::new(1, 3)),
            (Direction::West, Cell::new(1, 0)),
        ];
        for (direction, expected) in cases {
            let result = make_move(&g, direction, &mut ids);
            assert_eq!(result.movements.len(), 1, "{direction}");
            let m = result.movements[0];
            assert_eq!(m.from.map(|f| f.cell), Some(Cell::new(1, 1)), "{direction}");
            assert_eq!(m.to.cell, expected, "{direction}");
            assert_eq!(m.to.tile.id, id);
            assert_eq!(result.grid.get(expected).map(|t| t.id), Some(id));
        }
    }

    #[test]
    fn test_column_merge_north_and_south() {
        let (g, mut ids) = grid([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [4, 0, 0, 0]]);

        let north = make_move(&g, Direction::North, &mut ids);
        let column: Vec<u32> = north.grid.values().iter().map(|r| r[0]).collect();
        assert_eq!(column, vec![4, 8, 0, 0]);

        let south = make_move(&g, Direction::South, &mut ids);
        let column: Vec<u32> = south.grid.values().iter().map(|r| r[0]).collect();
        assert_eq!(column, vec![0, 0, 4, 8]);
        assert_eq!(south.merge_score(), 12);
    }

    #[test]
    fn test_merge_products_get_fresh_ids() {
        let (g, mut ids) = single_row([2, 2, 0, 0]);
        let sources: Vec<TileId> = g.tiles().map(|gt| gt.tile.id).collect();
        let result = make_move(&g, Direction::West, &mut ids);

        let product = result.grid.get(Cell::new(0, 0)).unwrap();
        assert!(!sources.contains(&product.id));
        // Both sources appear as `from`, so neither id leaks into the new grid.
        let froms: Vec<TileId> = result
            .movements
            .iter()
            .filter_map(|m| m.from.map(|f| f.tile.id))
            .collect();
        assert_eq!(froms, sources);
    }

    #[test]
    fn test_max_value_tiles_do_not_merge() {
        let (g, mut ids) = single_row([MAX_TILE_VALUE, MAX_TILE_VALUE, 0, 0]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid, g);
        assert!(!result.has_grid_changed());
        assert_eq!(result.merge_score(), 0);

        let (g, mut ids) = single_row([0, MAX_TILE_VALUE, 0, MAX_TILE_VALUE]);
        let result = make_move(&g, Direction::West, &mut ids);
        assert_eq!(result.grid.values()[0], [MAX_TILE_VALUE, MAX_TILE_VALUE, 0, 0]);
    }

    #[test]
    fn test_merge_up_to_max_value() {
        let half = MAX_TILE_VALUE / 2;
        let (g, mut ids) = grid([[half; 4], [half; 4], [0; 4], [0; 4]]);
        let result = make_move(&g, Direction::West, &mut ids);

        assert_eq!(result.grid.values()[0], [MAX_TILE_VALUE, MAX_TILE_VALUE, 0, 0]);
        assert_eq!(result.merge_count(), 4);
        assert_eq!(result.merge_score(), 4 * MAX_TILE_VALUE);
    }

    #[test]
    fn test_input_grid_is_not_mutated() {
        let (g, mut ids) = single_row([2, 2, 4, 4]);
        let copy = g.clone();
        let _ = make_move(&g, Direction::West, &mut ids);
        assert_eq!(g, copy);
    }
}

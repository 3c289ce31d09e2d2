//! Geometry module - quarter-turn rotation on the fixed-size grid
//!
//! Every move direction is reduced to a westward compaction by rotating the
//! board a number of quarter turns. The mapping below is the only place the
//! rotation formula lives; both grid rotation and movement coordinates go
//! through it so they can never disagree.

use crate::types::{Cell, GRID_SIZE};

/// Number of distinct quarter turns
pub const QUARTER_TURNS: u8 = 4;

const LAST: u8 = (GRID_SIZE - 1) as u8;

/// Map `cell` through `turns` quarter turns.
///
/// # Panics
///
/// Panics if `turns` is not in `0..=3`.
#[inline]
pub fn rotated_cell(cell: Cell, turns: u8) -> Cell {
    let Cell { row, col } = cell;
    match turns {
        0 => Cell::new(row, col),
        1 => Cell::new(LAST - col, row),
        2 => Cell::new(LAST - row, LAST - col),
        3 => Cell::new(col, LAST - row),
        _ => panic!("quarter turns must be in 0..=3, got {turns}"),
    }
}

/// Turns that undo a rotation by `turns`.
///
/// # Panics
///
/// Panics if `turns` is not in `0..=3`.
pub fn inverse_turns(turns: u8) -> u8 {
    assert!(
        turns < QUARTER_TURNS,
        "quarter turns must be in 0..=3, got {turns}"
    );
    (QUARTER_TURNS - turns) % QUARTER_TURNS
}

/// Rotate a square array: `out[r][c] = rows[rotated_cell((r, c), turns)]`.
pub fn rotate_rows<T: Copy>(
    rows: &[[T; GRID_SIZE]; GRID_SIZE],
    turns: u8,
) -> [[T; GRID_SIZE]; GRID_SIZE] {
    let mut out = *rows;
    for (r, out_row) in out.iter_mut().enumerate() {
        for (c, slot) in out_row.iter_mut().enumerate() {
            let src = rotated_cell(Cell::new(r as u8, c as u8), turns);
            *slot = rows[src.row as usize][src.col as usize];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered() -> [[u32; GRID_SIZE]; GRID_SIZE] {
        let mut rows = [[0; GRID_SIZE]; GRID_SIZE];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (r * GRID_SIZE + c) as u32;
            }
        }
        rows
    }

    #[test]
    fn test_rotated_cell_formula() {
        let cell = Cell::new(0, 1);
        assert_eq!(rotated_cell(cell, 0), Cell::new(0, 1));
        assert_eq!(rotated_cell(cell, 1), Cell::new(2, 0));
        assert_eq!(rotated_cell(cell, 2), Cell::new(3, 2));
        assert_eq!(rotated_cell(cell, 3), Cell::new(1, 3));
    }

    #[test]
    fn test_inverse_turns() {
        assert_eq!(inverse_turns(0), 0);
        assert_eq!(inverse_turns(1), 3);
        assert_eq!(inverse_turns(2), 2);
        assert_eq!(inverse_turns(3), 1);
    }

    #[test]
    fn test_cell_rotation_inverts() {
        for turns in 0..QUARTER_TURNS {
            for index in 0..GRID_SIZE * GRID_SIZE {
                let cell = Cell::from_index(index);
                let there = rotated_cell(cell, inverse_turns(turns));
                assert_eq!(rotated_cell(there, turns), cell);
            }
        }
    }

    #[test]
    fn test_rotate_rows_roundtrip() {
        let rows = numbered();
        for turns in 0..QUARTER_TURNS {
            let rotated = rotate_rows(&rows, turns);
            assert_eq!(rotate_rows(&rotated, inverse_turns(turns)), rows);
        }
    }

    #[test]
    fn test_single_turn_lays_first_column_along_first_row() {
        // One turn lays column 0 out bottom-to-top, so a south move becomes a west move.
        let rows = numbered();
        let rotated = rotate_rows(&rows, 1);
        assert_eq!(rotated[0], [12, 8, 4, 0]);
    }

    #[test]
    #[should_panic(expected = "quarter turns must be in 0..=3")]
    fn test_invalid_turns_fail_fast() {
        rotated_cell(Cell::new(0, 0), 4);
    }

    #[test]
    #[should_panic(expected = "quarter turns must be in 0..=3")]
    fn test_invalid_inverse_fails_fast() {
        inverse_turns(7);
    }
}

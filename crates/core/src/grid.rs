//! Grid module - the 4x4 tile board
//!
//! A `Grid` is a plain value. Every transformation (placing a tile, rotating,
//! applying a move) returns a new grid; nothing mutates a grid that someone
//! else may still be looking at.
//! Coordinates: (row, col) with row 0 at the top and col 0 on the left.

use std::fmt;

use arrayvec::ArrayVec;

use crate::geometry::rotate_rows;
use crate::ids::TileIds;
use crate::types::{is_tile_value, Cell, GridTile, GridTileMovement, Tile, CELL_COUNT, GRID_SIZE};

/// One row of slots
pub type Row = [Option<Tile>; GRID_SIZE];

/// Errors raised when building a grid from untrusted numbers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("invalid tile value {value} at ({row}, {col}): expected a power of two in 2..=131072")]
    InvalidTile { row: usize, col: usize, value: u32 },
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: [Row; GRID_SIZE],
}

impl Grid {
    /// A fresh empty grid
    pub fn empty() -> Self {
        Self {
            rows: [[None; GRID_SIZE]; GRID_SIZE],
        }
    }

    pub fn from_rows(rows: [Row; GRID_SIZE]) -> Self {
        Self { rows }
    }

    /// Build a grid from plain numbers (0 = empty), minting new tile ids.
    pub fn from_values(
        values: &[[u32; GRID_SIZE]; GRID_SIZE],
        ids: &mut TileIds,
    ) -> Result<Self, GridError> {
        let mut rows = [[None; GRID_SIZE]; GRID_SIZE];
        for (row, (slots, nums)) in rows.iter_mut().zip(values.iter()).enumerate() {
            for (col, (slot, &value)) in slots.iter_mut().zip(nums.iter()).enumerate() {
                if value == 0 {
                    continue;
                }
                if !is_tile_value(value) {
                    return Err(GridError::InvalidTile { row, col, value });
                }
                *slot = Some(ids.mint(value));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Row; GRID_SIZE] {
        &self.rows
    }

    pub fn get(&self, cell: Cell) -> Option<Tile> {
        self.rows
            .get(cell.row as usize)
            .and_then(|row| row.get(cell.col as usize))
            .copied()
            .flatten()
    }

    /// Copy of this grid with `cell` set to `tile`
    pub fn with_tile(&self, cell: Cell, tile: Option<Tile>) -> Self {
        let mut rows = self.rows;
        rows[cell.row as usize][cell.col as usize] = tile;
        Self { rows }
    }

    /// Copy of this grid with the movement's destination tile placed
    pub fn with_movement(&self, movement: &GridTileMovement) -> Self {
        self.with_tile(movement.to.cell, Some(movement.to.tile))
    }

    /// Copy of this grid rotated by `turns` quarter turns
    pub fn rotated(&self, turns: u8) -> Self {
        Self {
            rows: rotate_rows(&self.rows, turns),
        }
    }

    /// All placed tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = GridTile> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, slot)| {
                slot.map(|tile| GridTile::new(Cell::new(r as u8, c as u8), tile))
            })
        })
    }

    pub fn tile_count(&self) -> usize {
        self.rows.iter().flatten().filter(|slot| slot.is_some()).count()
    }

    /// Empty cells in row-major order (stack-only)
    pub fn empty_cells(&self) -> ArrayVec<Cell, CELL_COUNT> {
        let mut out = ArrayVec::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, slot) in row.iter().enumerate() {
                if slot.is_none() {
                    out.push(Cell::new(r as u8, c as u8));
                }
            }
        }
        out
    }

    pub fn is_full(&self) -> bool {
        self.rows.iter().flatten().all(|slot| slot.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|slot| slot.is_none())
    }

    /// Tile numbers with 0 for empty cells
    pub fn values(&self) -> [[u32; GRID_SIZE]; GRID_SIZE] {
        let mut out = [[0; GRID_SIZE]; GRID_SIZE];
        for (dst, src) in out.iter_mut().zip(self.rows.iter()) {
            for (v, slot) in dst.iter_mut().zip(src.iter()) {
                *v = slot.map_or(0, |t| t.num);
            }
        }
        out
    }

    /// Highest tile number on the board (0 when empty)
    pub fn max_tile(&self) -> u32 {
        self.rows
            .iter()
            .flatten()
            .filter_map(|slot| slot.map(|t| t.num))
            .max()
            .unwrap_or(0)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                f.write_str(" / ")?;
            }
            for (c, slot) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(" ")?;
                }
                match slot {
                    Some(tile) => write!(f, "{}", tile.num)?,
                    None => f.write_str(".")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: [[u32; GRID_SIZE]; GRID_SIZE]) -> Grid {
        Grid::from_values(&values, &mut TileIds::new()).unwrap()
    }

    #[test]
    fn test_empty_grid_is_fresh_value() {
        let a = Grid::empty();
        let b = a.with_tile(Cell::new(0, 0), Some(Tile::new(crate::types::TileId(1), 2)));

        assert!(a.is_empty());
        assert_eq!(Grid::empty(), a);
        assert_eq!(b.tile_count(), 1);
    }

    #[test]
    fn test_from_values_mints_distinct_ids() {
        let g = grid([[2, 0, 0, 4], [0; 4], [0; 4], [8, 0, 0, 0]]);
        let ids: Vec<_> = g.tiles().map(|gt| gt.tile.id).collect();

        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(g.get(Cell::new(3, 0)).map(|t| t.num), Some(8));
    }

    #[test]
    fn test_from_values_rejects_non_powers_of_two() {
        let err = Grid::from_values(&[[2, 3, 0, 0], [0; 4], [0; 4], [0; 4]], &mut TileIds::new())
            .unwrap_err();
        assert_eq!(err, GridError::InvalidTile { row: 0, col: 1, value: 3 });

        let err = Grid::from_values(&[[0; 4], [0; 4], [0; 4], [0, 0, 0, 1]], &mut TileIds::new())
            .unwrap_err();
        assert_eq!(err, GridError::InvalidTile { row: 3, col: 3, value: 1 });
    }

    #[test]
    fn test_from_values_tile_value_upper_bound() {
        let max = crate::types::MAX_TILE_VALUE;
        let g = grid([[max, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(g.max_tile(), max);

        let err = Grid::from_values(&[[0, max * 2, 0, 0], [0; 4], [0; 4], [0; 4]], &mut TileIds::new())
            .unwrap_err();
        assert_eq!(err, GridError::InvalidTile { row: 0, col: 1, value: max * 2 });

        let err = Grid::from_values(&[[0; 4], [0, 0, 1 << 31, 0], [0; 4], [0; 4]], &mut TileIds::new())
            .unwrap_err();
        assert_eq!(err, GridError::InvalidTile { row: 1, col: 2, value: 1 << 31 });
    }

    #[test]
    fn test_empty_cells_and_fullness() {
        let g = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
        assert_eq!(g.empty_cells().as_slice(), &[Cell::new(3, 3)]);
        assert!(!g.is_full());

        let full = g.with_tile(Cell::new(3, 3), Some(Tile::new(crate::types::TileId(99), 2)));
        assert!(full.is_full());
        assert!(full.empty_cells().is_empty());
    }

    #[test]
    fn test_rotation_roundtrip_preserves_tiles() {
        let g = grid([[2, 4, 0, 0], [0, 8, 0, 16], [0, 0, 32, 0], [64, 0, 0, 2]]);
        for turns in 0..4 {
            let back = g.rotated(turns).rotated(crate::geometry::inverse_turns(turns));
            assert_eq!(back, g);
        }
    }

    #[test]
    fn test_values_and_display() {
        let g = grid([[2, 0, 0, 0], [0, 4, 0, 0], [0; 4], [0, 0, 0, 2048]]);
        assert_eq!(g.values()[3][3], 2048);
        assert_eq!(g.max_tile(), 2048);
        assert_eq!(
            g.to_string(),
            "2 . . . / . 4 . . / . . . . / . . . 2048"
        );
    }
}

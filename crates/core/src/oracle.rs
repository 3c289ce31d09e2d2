//! Change detection and game-over probing
//!
//! The game is over when no direction changes the grid. Probing runs the move
//! engine against a scratch id allocator and throws the results away.

use arrayvec::ArrayVec;

use crate::engine::make_move;
use crate::grid::Grid;
use crate::ids::TileIds;
use crate::types::{Direction, GridTileMovement};

/// True iff any movement adds a tile or moves one to a different cell.
pub fn has_grid_changed(movements: &[GridTileMovement]) -> bool {
    movements.iter().any(GridTileMovement::is_visible_change)
}

/// Directions that would change `grid`, in [`Direction::ALL`] order.
pub fn legal_directions(grid: &Grid) -> ArrayVec<Direction, 4> {
    let mut scratch = TileIds::new();
    Direction::ALL
        .into_iter()
        .filter(|&direction| make_move(grid, direction, &mut scratch).has_grid_changed())
        .collect()
}

/// True iff no direction changes `grid`.
pub fn is_game_over(grid: &Grid) -> bool {
    let mut scratch = TileIds::new();
    !Direction::ALL
        .into_iter()
        .any(|direction| make_move(grid, direction, &mut scratch).has_grid_changed())
}

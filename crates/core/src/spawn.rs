//! Spawn generator - random tile insertion
//!
//! Picks an empty cell uniformly and a value of 2 (90%) or 4 (10%). The grid
//! is never touched; callers place the returned movement themselves.

use crate::grid::Grid;
use crate::ids::TileIds;
use crate::rng::SimpleRng;
use crate::types::{GridTile, GridTileMovement, SPAWN_HIGH_PERCENT, SPAWN_HIGH_VALUE, SPAWN_LOW_VALUE};

/// Roll the value of a spawned tile
pub fn spawn_value(rng: &mut SimpleRng) -> u32 {
    if rng.chance_percent(SPAWN_HIGH_PERCENT) {
        SPAWN_HIGH_VALUE
    } else {
        SPAWN_LOW_VALUE
    }
}

/// Create an `add` movement for a new tile in a random empty cell.
///
/// Returns `None` when the grid is full.
pub fn random_added_tile(
    grid: &Grid,
    rng: &mut SimpleRng,
    ids: &mut TileIds,
) -> Option<GridTileMovement> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let cell = empty[rng.next_range(empty.len() as u32) as usize];
    let tile = ids.mint(spawn_value(rng));
    Some(GridTileMovement::add(GridTile::new(cell, tile)))
}

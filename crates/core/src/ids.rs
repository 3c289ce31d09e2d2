//! Tile id allocation
//!
//! Renderers key their interpolation on tile ids, so an id must never be
//! handed out twice within a session, including across new games.

use crate::types::{Tile, TileId};

/// Monotonic tile id counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIds {
    next: u64,
}

impl TileIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a fresh id
    pub fn next_id(&mut self) -> TileId {
        let id = TileId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Create a tile with a fresh id
    pub fn mint(&mut self, num: u32) -> Tile {
        Tile::new(self.next_id(), num)
    }

    /// Id that the next call to [`TileIds::next_id`] will return
    pub fn peek(&self) -> TileId {
        TileId(self.next)
    }
}

impl Default for TileIds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_unique() {
        let mut ids = TileIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.mint(4);

        assert!(a < b);
        assert!(b < c.id);
        assert_eq!(c.num, 4);
        assert_eq!(ids.peek(), TileId(4));
    }
}

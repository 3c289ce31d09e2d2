//! Animation planning from a movement trace.
//!
//! Each movement becomes one animated tile keyed by its id: added tiles scale
//! in at their cell, shifted tiles slide from their old cell, and untouched
//! tiles stay put. Merge sources slide onto the target cell and are then drawn
//! over by the merged tile, so plans must be drawn in order.

use crate::types::{Cell, GridTileMovement, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAnimation {
    ScaleIn,
    Slide { from: Cell, to: Cell },
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedTile {
    pub id: TileId,
    pub num: u32,
    /// Where the tile ends up
    pub at: Cell,
    pub animation: TileAnimation,
}

/// Classify `movements` in order.
///
/// `GameView` uses this to highlight scale-ins on a still frame; a renderer
/// that interpolates can drive slides from the same plan.
pub fn plan(movements: &[GridTileMovement]) -> impl Iterator<Item = AnimatedTile> + '_ {
    movements
        .iter()
        .map(|m| {
            let animation = match m.from {
                None => TileAnimation::ScaleIn,
                Some(from) if from.cell != m.to.cell => TileAnimation::Slide {
                    from: from.cell,
                    to: m.to.cell,
                },
                Some(_) => TileAnimation::Static,
            };
            AnimatedTile {
                id: m.to.tile.id,
                num: m.to.tile.num,
                at: m.to.cell,
                animation,
            }
        })
}

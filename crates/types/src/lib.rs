//! Core types module - shared data structures and constants
//!
//! This module defines the value types used throughout the application.
//! All types are pure data with no external dependencies, making them usable
//! from the engine, the renderers and the remote protocol alike.
//!
//! # Grid Dimensions
//!
//! The board is a fixed square of `GRID_SIZE x GRID_SIZE` cells:
//!
//! - **Rows**: indexed 0-3, top to bottom
//! - **Columns**: indexed 0-3, left to right
//!
//! # Spawn Rules
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `NUM_INITIAL_TILES` | 2 | Tiles placed on an empty grid at game start |
//! | `SPAWN_LOW_VALUE` | 2 | Value of most spawned tiles |
//! | `SPAWN_HIGH_VALUE` | 4 | Value of the occasional spawned tile |
//! | `SPAWN_HIGH_PERCENT` | 10 | Odds (percent) that a spawn is `SPAWN_HIGH_VALUE` |
//! | `MAX_TILE_VALUE` | 131072 | Largest tile a 4x4 board can hold; tiles of this value do not merge |
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Cell, Direction, GridTile, GridTileMovement, MovementKind, Tile, TileId};
//!
//! assert_eq!(Direction::North.to_string(), "north");
//!
//! // Describe a tile sliding two cells to the left
//! let tile = Tile::new(TileId(7), 2);
//! let movement = GridTileMovement::shift(
//!     GridTile::new(Cell::new(0, 2), tile),
//!     GridTile::new(Cell::new(0, 0), tile),
//! );
//! assert_eq!(movement.kind(), MovementKind::Shift);
//! ```

use std::fmt;

/// Board side length in cells (4 rows, 4 columns)
pub const GRID_SIZE: usize = 4;

/// Total number of cells on the board
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Number of tiles spawned onto an empty grid when a game starts
pub const NUM_INITIAL_TILES: usize = 2;

/// Value of a regular spawned tile
pub const SPAWN_LOW_VALUE: u32 = 2;

/// Value of a rare spawned tile
pub const SPAWN_HIGH_VALUE: u32 = 4;

/// Odds, in percent, that a spawned tile is `SPAWN_HIGH_VALUE`
pub const SPAWN_HIGH_PERCENT: u32 = 10;

/// Largest tile value (2^17), the most sixteen cells fed by 4-spawns can build
pub const MAX_TILE_VALUE: u32 = 1 << 17;


/// The four swipe directions
///
/// A move slides every tile as far as possible toward the named edge:
/// - **North**: toward row 0
/// - **South**: toward the last row
/// - **East**: toward the last column
/// - **West**: toward column 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions, in the order the game-over check probes them
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Quarter turns that map this direction onto a westward compaction
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::West.quarter_turns(), 0);
    /// assert_eq!(Direction::South.quarter_turns(), 1);
    /// assert_eq!(Direction::East.quarter_turns(), 2);
    /// assert_eq!(Direction::North.quarter_turns(), 3);
    /// ```
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Direction::West => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::North => 3,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board coordinate
///
/// Equality is by coordinates. Callers are expected to stay within
/// `0..GRID_SIZE` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major index into a flat `CELL_COUNT` array
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.row as usize * GRID_SIZE + self.col as usize
    }

    /// Inverse of [`Cell::index`]
    #[inline(always)]
    pub fn from_index(index: usize) -> Self {
        Self::new((index / GRID_SIZE) as u8, (index % GRID_SIZE) as u8)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Identity of a tile instance, stable for as long as the tile exists
///
/// Ids are handed out once and never reused. A merge retires both source ids
/// and introduces a new one for the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A numbered tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    /// Power of two, at least 2
    pub num: u32,
}

impl Tile {
    pub const fn new(id: TileId, num: u32) -> Self {
        Self { id, num }
    }
}

/// Whether `num` may appear on a tile: a power of two in `2..=MAX_TILE_VALUE`
pub fn is_tile_value(num: u32) -> bool {
    (2..=MAX_TILE_VALUE).contains(&num) && num.is_power_of_two()
}

/// A tile's placement at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridTile {
    pub cell: Cell,
    pub tile: Tile,
}

impl GridTile {
    pub const fn new(cell: Cell, tile: Tile) -> Self {
        Self { cell, tile }
    }
}

/// How a single tile transitioned during one move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKind {
    /// Tile appeared (merge product or spawn)
    Add,
    /// Tile slid to another cell, keeping its id
    Shift,
    /// Tile stayed put
    Noop,
}

/// Before/after record of one tile for one move
///
/// `from` is `None` exactly when the tile is newly created at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridTileMovement {
    pub from: Option<GridTile>,
    pub to: GridTile,
}

impl GridTileMovement {
    /// A tile created at `to` (merge product or spawn)
    pub const fn add(to: GridTile) -> Self {
        Self { from: None, to }
    }

    /// A tile sliding from `from` to `to`
    pub const fn shift(from: GridTile, to: GridTile) -> Self {
        Self {
            from: Some(from),
            to,
        }
    }

    /// A tile that does not move
    pub const fn noop(at: GridTile) -> Self {
        Self {
            from: Some(at),
            to: at,
        }
    }

    /// Classify the transition by comparing cells
    pub fn kind(&self) -> MovementKind {
        match self.from {
            None => MovementKind::Add,
            Some(from) if from.cell != self.to.cell => MovementKind::Shift,
            Some(_) => MovementKind::Noop,
        }
    }

    /// True for adds and shifts
    pub fn is_visible_change(&self) -> bool {
        self.kind() != MovementKind::Noop
    }
}

//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the grid-movement/merge engine and everything needed to
//! sequence a game around it. It has **no dependencies** on UI, networking, or
//! I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games and movement traces
//! - **Testable**: Every transformation takes a grid and returns a new one
//! - **Portable**: Runs in a terminal, behind a socket, or headless in tests
//!
//! # Module Structure
//!
//! - [`geometry`]: quarter-turn rotation of cells and row arrays
//! - [`grid`]: immutable 4x4 board value
//! - [`ids`]: monotonic tile id allocation
//! - [`engine`]: westward compaction with merges, producing a movement trace
//! - [`spawn`]: random tile insertion after an accepted move
//! - [`oracle`]: change detection and game-over probing
//! - [`rng`]: small seedable LCG
//! - [`session`]: the controller that sequences engine, spawn and oracle
//! - [`store`]: persistence collaborator contract
//! - [`direction`]: text-to-direction collaborator contract
//! - [`snapshot`]: read-only view of a session for renderers and observers
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{GameSession, MemoryStore};
//! use tui_2048_types::Direction;
//!
//! let mut session = GameSession::new(MemoryStore::new(), 12345);
//! session.resume();
//! assert_eq!(session.grid().tile_count(), 2);
//!
//! // Moves that change nothing are rejected and return None.
//! if let Some(summary) = session.apply_move(Direction::West) {
//!     assert_eq!(session.move_count(), 1);
//!     assert!(summary.spawned.is_some());
//! }
//! ```

pub mod direction;
pub mod engine;
pub mod geometry;
pub mod grid;
pub mod ids;
pub mod oracle;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod spawn;
pub mod store;

pub use tui_2048_types as types;

// Re-export commonly used types for convenience
pub use direction::DirectionExtractor;
pub use engine::{make_move, MoveResult};
pub use grid::{Grid, GridError};
pub use ids::TileIds;
pub use oracle::{has_grid_changed, is_game_over, legal_directions};
pub use rng::SimpleRng;
pub use session::{GameSession, MoveSummary, SessionPhase};
pub use snapshot::GameSnapshot;
pub use spawn::random_added_tile;
pub use store::{GameStore, MemoryStore, SavedGame, StoreError};

//! Persistence collaborator contract
//!
//! The session hands a [`SavedGame`] to its store after every accepted move and
//! new game, and asks for one when it resumes. Tile ids are not persisted; a
//! restored grid gets fresh ids.

use crate::types::GRID_SIZE;

/// Plain-number image of a session (0 = empty cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SavedGame {
    pub tiles: [[u32; GRID_SIZE]; GRID_SIZE],
    pub current_score: u32,
    pub best_score: u32,
}

impl SavedGame {
    pub fn has_tiles(&self) -> bool {
        self.tiles.iter().flatten().any(|&v| v != 0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is corrupt: {0}")]
    Corrupt(String),
    #[error("unsupported save format version {0}")]
    UnsupportedVersion(u32),
}

/// Where sessions are saved and restored from
pub trait GameStore {
    /// Previously saved game, if any
    fn load(&mut self) -> Result<Option<SavedGame>, StoreError>;

    fn save(&mut self, game: &SavedGame) -> Result<(), StoreError>;
}

/// In-memory store for tests and sessions that should not touch disk
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Option<SavedGame>,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing save
    pub fn with_saved(game: SavedGame) -> Self {
        Self {
            saved: Some(game),
            save_count: 0,
        }
    }

    pub fn saved(&self) -> Option<&SavedGame> {
        self.saved.as_ref()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl GameStore for MemoryStore {
    fn load(&mut self) -> Result<Option<SavedGame>, StoreError> {
        Ok(self.saved)
    }

    fn save(&mut self, game: &SavedGame) -> Result<(), StoreError> {
        self.saved = Some(*game);
        self.save_count += 1;
        Ok(())
    }
}

impl<S: GameStore + ?Sized> GameStore for Box<S> {
    fn load(&mut self) -> Result<Option<SavedGame>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, game: &SavedGame) -> Result<(), StoreError> {
        (**self).save(game)
    }
}

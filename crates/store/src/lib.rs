//! JSON file persistence for game sessions.
//!
//! Save file format (version 1):
//!
//! ```json
//! {
//!   "version": 1,
//!   "grid": [[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 4, 0], [0, 0, 0, 0]],
//!   "current_score": 12,
//!   "best_score": 2048
//! }
//! ```
//!
//! `grid` holds tile numbers row by row, 0 for an empty cell. Writes go to a
//! temporary sibling file that is then renamed over the save file, so a crash
//! mid-write leaves the previous save intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use tui_2048_core as core;
pub use tui_2048_types as types;

use crate::core::{GameStore, MemoryStore, SavedGame, StoreError};
use crate::types::GRID_SIZE;

/// Current save format version
pub const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    grid: [[u32; GRID_SIZE]; GRID_SIZE],
    current_score: u32,
    best_score: u32,
}

/// Only the version, so unknown formats are reported as such rather than as corrupt.
#[derive(Debug, Deserialize)]
struct SaveHeader {
    version: u32,
}

/// Stores a session as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl GameStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<SavedGame>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let header: SaveHeader =
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if header.version != SAVE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(header.version));
        }

        let file: SaveFile =
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        log::debug!("loaded save from {}", self.path.display());
        Ok(Some(SavedGame {
            tiles: file.grid,
            current_score: file.current_score,
            best_score: file.best_score,
        }))
    }

    fn save(&mut self, game: &SavedGame) -> Result<(), StoreError> {
        let file = SaveFile {
            version: SAVE_FORMAT_VERSION,
            grid: game.tiles,
            current_score: game.current_score,
            best_score: game.best_score,
        };
        let json =
            serde_json::to_vec_pretty(&file).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Where the game should be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Keep the session in memory only
    Disabled,
    File(PathBuf),
}

impl StoreConfig {
    /// Read `TUI_2048_NO_SAVE` and `TUI_2048_SAVE_PATH`.
    ///
    /// Defaults to `$HOME/.tui-2048/save.json`.
    pub fn from_env() -> Self {
        use std::env;

        Self::from_vars(
            env::var("TUI_2048_NO_SAVE").ok().as_deref(),
            env::var("TUI_2048_SAVE_PATH").ok().as_deref(),
            env::var("HOME").ok().as_deref(),
        )
    }

    fn from_vars(no_save: Option<&str>, save_path: Option<&str>, home: Option<&str>) -> Self {
        let disabled = no_save
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        if disabled {
            return StoreConfig::Disabled;
        }

        match save_path.map(str::trim).filter(|s| !s.is_empty()) {
            Some(path) => StoreConfig::File(PathBuf::from(path)),
            None => {
                let base = home
                    .filter(|h| !h.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                StoreConfig::File(base.join(".tui-2048").join("save.json"))
            }
        }
    }

    pub fn open(&self) -> Box<dyn GameStore> {
        match self {
            StoreConfig::Disabled => Box::new(MemoryStore::new()),
            StoreConfig::File(path) => Box::new(JsonFileStore::new(path.clone())),
        }
    }
}

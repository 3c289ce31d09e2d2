//! Session controller - sequences engine, spawn and oracle for one game
//!
//! A session owns the only live grid. Each accepted move replaces it with the
//! engine's output plus one spawned tile, updates the score, re-checks for game
//! over and persists. A move that changes nothing is rejected and leaves grid,
//! scores and move count exactly as they were.

use crate::direction::DirectionExtractor;
use crate::engine::make_move;
use crate::grid::Grid;
use crate::ids::TileIds;
use crate::oracle::is_game_over;
use crate::rng::SimpleRng;
use crate::snapshot::GameSnapshot;
use crate::spawn::random_added_tile;
use crate::store::{GameStore, SavedGame};
use crate::types::{Direction, GridTile, GridTileMovement, NUM_INITIAL_TILES};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Created but neither resumed nor started
    Idle,
    InProgress,
    GameOver,
}

/// What an accepted move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSummary {
    pub direction: Direction,
    /// Sum of merge products (spawned tile excluded)
    pub score_increment: u32,
    pub merges: usize,
    pub spawned: Option<GridTile>,
    pub game_over: bool,
}

/// One game session backed by a persistence collaborator
#[derive(Debug)]
pub struct GameSession<S: GameStore> {
    store: S,
    grid: Grid,
    movements: Vec<GridTileMovement>,
    phase: SessionPhase,
    current_score: u32,
    best_score: u32,
    move_count: u32,
    /// Most recently requested direction, accepted or not (display only).
    last_direction: Option<Direction>,
    ids: TileIds,
    rng: SimpleRng,
}

impl<S: GameStore> GameSession<S> {
    /// Create an idle session. Call [`GameSession::resume`] or
    /// [`GameSession::start_new_game`] before moving.
    pub fn new(store: S, seed: u32) -> Self {
        Self {
            store,
            grid: Grid::empty(),
            movements: Vec::new(),
            phase: SessionPhase::Idle,
            current_score: 0,
            best_score: 0,
            move_count: 0,
            last_direction: None,
            ids: TileIds::new(),
            rng: SimpleRng::new(seed),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Movement trace of the latest accepted move (or start/restore)
    pub fn movements(&self) -> &[GridTileMovement] {
        &self.movements
    }

    pub fn current_score(&self) -> u32 {
        self.current_score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore the saved game, or start a new one when there is nothing usable.
    pub fn resume(&mut self) {
        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("could not load saved game, starting fresh: {e}");
                None
            }
        };

        let Some(saved) = saved else {
            self.start_new_game();
            return;
        };

        self.best_score = saved.best_score.max(saved.current_score);
        if !saved.has_tiles() {
            self.start_new_game();
            return;
        }

        match Grid::from_values(&saved.tiles, &mut self.ids) {
            Ok(grid) => {
                self.movements = grid.tiles().map(GridTileMovement::noop).collect();
                self.current_score = saved.current_score;
                self.move_count = 0;
                self.phase = Self::phase_for(&grid);
                self.grid = grid;
                log::info!(
                    "restored game: score {} best {} grid [{}]",
                    self.current_score,
                    self.best_score,
                    self.grid
                );
            }
            Err(e) => {
                log::warn!("saved grid rejected, starting fresh: {e}");
                self.start_new_game();
            }
        }
    }

    /// Clear the board, place the initial tiles and reset score and move count.
    ///
    /// The best score is kept.
    pub fn start_new_game(&mut self) {
        let mut grid = Grid::empty();
        let mut movements = Vec::with_capacity(NUM_INITIAL_TILES);
        for _ in 0..NUM_INITIAL_TILES {
            // Sequential so the second spawn sees the first tile.
            if let Some(added) = random_added_tile(&grid, &mut self.rng, &mut self.ids) {
                grid = grid.with_movement(&added);
                movements.push(added);
            }
        }

        self.phase = Self::phase_for(&grid);
        self.grid = grid;
        self.movements = movements;
        self.current_score = 0;
        self.move_count = 0;
        self.last_direction = None;
        log::info!("new game: [{}]", self.grid);
        self.persist();
    }

    /// Apply a swipe. Returns `None` when the move is rejected (nothing would
    /// change, or the session has not started).
    pub fn apply_move(&mut self, direction: Direction) -> Option<MoveSummary> {
        if self.phase == SessionPhase::Idle {
            log::debug!("move {direction} ignored: session not started");
            return None;
        }
        self.last_direction = Some(direction);

        let result = make_move(&self.grid, direction, &mut self.ids);
        if !result.has_grid_changed() {
            log::debug!("move {direction} rejected: grid unchanged");
            return None;
        }

        // Score comes from merge products only, before the spawn is appended.
        let score_increment = result.merge_score();
        let merges = result.merge_count();

        let mut grid = result.grid;
        let mut movements = result.movements;
        let spawned = random_added_tile(&grid, &mut self.rng, &mut self.ids);
        if let Some(added) = spawned {
            grid = grid.with_movement(&added);
            movements.push(added);
        }

        self.current_score = self.current_score.saturating_add(score_increment);
        self.best_score = self.best_score.max(self.current_score);
        self.move_count += 1;
        self.phase = Self::phase_for(&grid);
        self.grid = grid;
        self.movements = movements;

        log::debug!(
            "move {direction}: +{score_increment} ({merges} merges) -> [{}]",
            self.grid
        );
        if self.phase == SessionPhase::GameOver {
            log::info!(
                "game over after {} moves with score {}",
                self.move_count,
                self.current_score
            );
        }
        self.persist();

        Some(MoveSummary {
            direction,
            score_increment,
            merges,
            spawned: spawned.map(|m| m.to),
            game_over: self.phase == SessionPhase::GameOver,
        })
    }

    /// Apply a spoken command. Returns whether a direction was recognized;
    /// a recognized direction that cannot move is still reported as recognized.
    pub fn apply_voice_command<X>(&mut self, text: &str, extractor: &X) -> bool
    where
        X: DirectionExtractor + ?Sized,
    {
        match extractor.extract(text) {
            Some(direction) => {
                log::debug!("voice command {text:?} -> {direction}");
                self.apply_move(direction);
                true
            }
            None => {
                log::debug!("voice command {text:?}: no direction recognized");
                false
            }
        }
    }

    /// Plain-number image handed to the store
    pub fn saved_game(&self) -> SavedGame {
        SavedGame {
            tiles: self.grid.values(),
            current_score: self.current_score,
            best_score: self.best_score,
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.grid = self.grid.values();
        out.movements.clear();
        out.movements.extend_from_slice(&self.movements);
        out.phase = self.phase;
        out.current_score = self.current_score;
        out.best_score = self.best_score;
        out.move_count = self.move_count;
        out.last_direction = self.last_direction;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn phase_for(grid: &Grid) -> SessionPhase {
        if is_game_over(grid) {
            SessionPhase::GameOver
        } else {
            SessionPhase::InProgress
        }
    }

    fn persist(&mut self) {
        let saved = self.saved_game();
        if let Err(e) = self.store.save(&saved) {
            log::warn!("could not save game: {e}");
        }
    }
}

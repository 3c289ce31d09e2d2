use crate::session::SessionPhase;
use crate::types::{Direction, GridTileMovement, GRID_SIZE};

/// Read-only picture of a session after its latest accepted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub grid: [[u32; GRID_SIZE]; GRID_SIZE],
    pub movements: Vec<GridTileMovement>,
    pub phase: SessionPhase,
    pub current_score: u32,
    pub best_score: u32,
    pub move_count: u32,
    pub last_direction: Option<Direction>,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.grid = [[0; GRID_SIZE]; GRID_SIZE];
        self.movements.clear();
        self.phase = SessionPhase::Idle;
        self.current_score = 0;
        self.best_score = 0;
        self.move_count = 0;
        self.last_direction = None;
    }

    pub fn game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn playable(&self) -> bool {
        self.phase == SessionPhase::InProgress
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            grid: [[0; GRID_SIZE]; GRID_SIZE],
            movements: Vec::new(),
            phase: SessionPhase::Idle,
            current_score: 0,
            best_score: 0,
            move_count: 0,
            last_direction: None,
        }
    }
}

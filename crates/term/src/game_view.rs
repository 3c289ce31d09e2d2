//! GameView: maps a `core::GameSnapshot` onto a terminal canvas.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::animation::{plan, TileAnimation};
use crate::canvas::{Canvas, Rgb, Style};
use crate::core::GameSnapshot;
use crate::types::{Cell, GRID_SIZE};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceStatus {
    /// No recognizer configured
    #[default]
    Unavailable,
    Idle,
    Listening,
}

impl VoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceStatus::Unavailable => "n/a",
            VoiceStatus::Idle => "off",
            VoiceStatus::Listening => "listening",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

/// Everything shown besides the game itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusView {
    pub voice: VoiceStatus,
    /// `None` when the remote adapter is disabled
    pub remote: Option<RemoteStatusView>,
}

const BOARD_BG: Rgb = Rgb::new(187, 173, 160);
const EMPTY_BG: Rgb = Rgb::new(205, 193, 180);
const DARK_TEXT: Rgb = Rgb::new(119, 110, 101);
const LIGHT_TEXT: Rgb = Rgb::new(249, 246, 242);

/// Background and text colors for a tile value.
pub fn tile_colors(num: u32) -> (Rgb, Rgb) {
    match num {
        2 => (Rgb::new(238, 228, 218), DARK_TEXT),
        4 => (Rgb::new(237, 224, 200), DARK_TEXT),
        8 => (Rgb::new(242, 177, 121), LIGHT_TEXT),
        16 => (Rgb::new(245, 149, 99), LIGHT_TEXT),
        32 => (Rgb::new(246, 124, 95), LIGHT_TEXT),
        64 => (Rgb::new(246, 94, 59), LIGHT_TEXT),
        128 => (Rgb::new(237, 207, 114), LIGHT_TEXT),
        256 => (Rgb::new(237, 204, 97), LIGHT_TEXT),
        512 => (Rgb::new(237, 200, 80), LIGHT_TEXT),
        1024 => (Rgb::new(237, 197, 63), LIGHT_TEXT),
        2048 => (Rgb::new(237, 194, 46), LIGHT_TEXT),
        _ => (Rgb::new(60, 58, 50), LIGHT_TEXT),
    }
}

/// Terminal view of one 2048 game.
pub struct GameView {
    /// Board cell width in terminal columns, including a one-column gutter.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 7x3 fits five-digit tiles and roughly squares the cells.
        Self {
            cell_w: 7,
            cell_h: 3,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(2),
            cell_h: cell_h.max(1),
        }
    }

    /// Outer size of the framed board.
    pub fn frame_size(&self) -> (u16, u16) {
        (
            GRID_SIZE as u16 * self.cell_w + 2,
            GRID_SIZE as u16 * self.cell_h + 2,
        )
    }

    /// Render into an existing canvas, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        status: &StatusView,
        viewport: Viewport,
        canvas: &mut Canvas,
    ) {
        canvas.resize(viewport.width, viewport.height);
        canvas.clear(Style::default());

        let (frame_w, frame_h) = self.frame_size();
        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h + 1) / 2;

        let board = Style::new(BOARD_BG, BOARD_BG);
        canvas.fill_rect(start_x, start_y, frame_w, frame_h, ' ', board);
        self.draw_border(canvas, start_x, start_y, frame_w, frame_h);

        // Tiles that appeared in the latest move; nothing is new on a fresh board.
        let mut fresh = [[false; GRID_SIZE]; GRID_SIZE];
        if snap.move_count > 0 {
            for tile in plan(&snap.movements) {
                if tile.animation == TileAnimation::ScaleIn {
                    fresh[tile.at.row as usize][tile.at.col as usize] = true;
                }
            }
        }

        for (r, row) in snap.grid.iter().enumerate() {
            for (c, &num) in row.iter().enumerate() {
                let cell = Cell::new(r as u8, c as u8);
                self.draw_tile(canvas, start_x, start_y, cell, num, fresh[r][c]);
            }
        }

        self.draw_side_panel(canvas, snap, status, viewport, start_x, start_y, frame_w);

        let help_y = start_y.saturating_add(frame_h);
        if help_y < viewport.height {
            let hint = Style::default().dim();
            canvas.put_centered(0, help_y, viewport.width, "arrows move  n new  v voice  q quit", hint);
        }

        if snap.game_over() {
            let mid_y = start_y.saturating_add(frame_h / 2);
            let banner = Style::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
            canvas.put_centered(start_x, mid_y.saturating_sub(1), frame_w, " GAME OVER ", banner);
            canvas.put_centered(start_x, mid_y, frame_w, " press n ", banner);
        }
    }

    /// Convenience helper that allocates a new canvas.
    pub fn render(&self, snap: &GameSnapshot, status: &StatusView, viewport: Viewport) -> Canvas {
        let mut canvas = Canvas::new(viewport.width, viewport.height);
        self.render_into(snap, status, viewport, &mut canvas);
        canvas
    }

    /// Top-left terminal position of a board cell's tile.
    pub fn tile_origin(&self, start_x: u16, start_y: u16, cell: Cell) -> (u16, u16) {
        (
            start_x + 1 + cell.col as u16 * self.cell_w,
            start_y + 1 + cell.row as u16 * self.cell_h,
        )
    }

    fn draw_border(&self, canvas: &mut Canvas, x: u16, y: u16, w: u16, h: u16) {
        if w < 2 || h < 2 {
            return;
        }
        let style = Style::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        canvas.set(x, y, '╭', style);
        canvas.set(x + w - 1, y, '╮', style);
        canvas.set(x, y + h - 1, '╰', style);
        canvas.set(x + w - 1, y + h - 1, '╯', style);
        for dx in 1..w - 1 {
            canvas.set(x + dx, y, '─', style);
            canvas.set(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            canvas.set(x, y + dy, '│', style);
            canvas.set(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_tile(&self, canvas: &mut Canvas, start_x: u16, start_y: u16, cell: Cell, num: u32, fresh: bool) {
        let (px, py) = self.tile_origin(start_x, start_y, cell);
        let w = self.cell_w - 1;

        if num == 0 {
            canvas.fill_rect(px, py, w, self.cell_h, ' ', Style::new(EMPTY_BG, EMPTY_BG));
            return;
        }

        let (bg, fg) = tile_colors(num);
        let mut style = Style::new(fg, bg);
        if fresh {
            style = style.bold();
        }
        canvas.fill_rect(px, py, w, self.cell_h, ' ', style);
        canvas.put_centered(px, py + self.cell_h / 2, w, &num.to_string(), style);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_side_panel(
        &self,
        canvas: &mut Canvas,
        snap: &GameSnapshot,
        status: &StatusView,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = Style::default().bold();
        let value = Style::default();

        let remote = match status.remote {
            None => "off".to_string(),
            Some(r) => match r.controller_id {
                Some(id) => format!("{} ctl#{id}", r.client_count),
                None => format!("{} clients", r.client_count),
            },
        };
        let rows = [
            ("SCORE", snap.current_score.to_string()),
            ("BEST", snap.best_score.to_string()),
            ("MOVES", snap.move_count.to_string()),
            (
                "LAST",
                snap.last_direction
                    .map_or_else(|| "-".to_string(), |d| d.as_str().to_string()),
            ),
            ("VOICE", status.voice.as_str().to_string()),
            ("REMOTE", remote),
        ];

        let mut y = start_y;
        for (name, text) in rows {
            if y.saturating_add(1) >= viewport.height {
                break;
            }
            canvas.put_str(panel_x, y, name, label);
            canvas.put_str(panel_x, y + 1, &text, value);
            y = y.saturating_add(3);
        }
    }
}

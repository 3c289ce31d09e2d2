//! Terminal rendering for the 2048 game.
//!
//! A small, game-oriented rendering layer: views draw into a [`Canvas`] of
//! styled glyphs, and the [`TerminalRenderer`] flushes that canvas to the
//! terminal through crossterm.
//!
//! - [`canvas`]: glyph grid and colors
//! - [`animation`]: per-tile animation plan from a movement trace
//! - [`game_view`]: board, score panel and overlays for a `GameSnapshot`
//! - [`renderer`]: raw mode, alternate screen, full redraws

pub mod animation;
pub mod canvas;
pub mod game_view;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use animation::{plan, AnimatedTile, TileAnimation};
pub use canvas::{Canvas, Glyph, Rgb, Style};
pub use game_view::{tile_colors, GameView, RemoteStatusView, StatusView, Viewport, VoiceStatus};
pub use renderer::{encode_full_into, TerminalRenderer};

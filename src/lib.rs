//! TUI 2048 (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof as
//! `tui_2048::{core,adapter,term,input,store,types}` and hosts the glue the
//! binary needs: environment configuration ([`config`]) and the command
//! dispatch shared by keyboard, voice and remote input ([`app`]).

pub mod app;
pub mod config;

pub use tui_2048_adapter as adapter;
pub use tui_2048_core as core;
pub use tui_2048_input as input;
pub use tui_2048_store as store;
pub use tui_2048_term as term;
pub use tui_2048_types as types;

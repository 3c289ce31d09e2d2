//! Direction input module (engine-facing).
//!
//! Everything that turns the outside world into a [`crate::types::Direction`]
//! lives here, kept apart from the engine:
//!
//! - [`map`]: terminal key events (the swipe equivalent) to commands
//! - [`voice`]: keyword extraction and the one-direction-per-utterance gate
//! - [`source`]: the `DirectionSource` capability interface and its backends

pub mod map;
pub mod source;
pub mod voice;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use map::{handle_key_event, should_quit, InputCommand};
pub use source::{
    open_direction_source, DirectionSource, SilentSource, TranscriptEvent, TranscriptSource,
    VoiceBackend,
};
pub use voice::{extract_direction, KeywordExtractor, UtteranceGate};

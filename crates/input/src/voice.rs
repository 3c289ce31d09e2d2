//! Voice transcript handling.
//!
//! Recognizers stream several results per utterance: unstable partial text
//! first, then a final result. The game should move once per utterance, as
//! soon as any of those results names a direction.

use crate::core::DirectionExtractor;
use crate::types::Direction;

/// Keywords in priority order; the first one found anywhere in the text wins.
const KEYWORDS: [(&str, Direction); 8] = [
    ("north", Direction::North),
    ("up", Direction::North),
    ("south", Direction::South),
    ("down", Direction::South),
    ("east", Direction::East),
    ("right", Direction::East),
    ("west", Direction::West),
    ("left", Direction::West),
];

/// Find a direction keyword in `text` (case-insensitive substring match).
///
/// # Examples
///
/// ```
/// use tui_2048_input::extract_direction;
/// use tui_2048_types::Direction;
///
/// assert_eq!(extract_direction("Swipe LEFT please"), Some(Direction::West));
/// assert_eq!(extract_direction("go up and right"), Some(Direction::North));
/// assert_eq!(extract_direction("hello"), None);
/// ```
pub fn extract_direction(text: &str) -> Option<Direction> {
    let lowered = text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|&(_, direction)| direction)
}

/// [`DirectionExtractor`] backed by [`extract_direction`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl DirectionExtractor for KeywordExtractor {
    fn extract(&self, text: &str) -> Option<Direction> {
        extract_direction(text)
    }
}

/// Lets at most one result per utterance through.
///
/// The gate opens when an utterance begins and closes once a result has been
/// accepted. It re-opens after the utterance's final result.
#[derive(Debug, Clone)]
pub struct UtteranceGate {
    open: bool,
}

impl UtteranceGate {
    pub fn new() -> Self {
        Self { open: true }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Offer one recognizer result to `accept`. Returns true if it was accepted.
    pub fn offer(&mut self, text: &str, is_final: bool, accept: &mut dyn FnMut(&str) -> bool) -> bool {
        let accepted = self.open && accept(text);
        if accepted {
            self.open = false;
        }
        if is_final {
            self.open = true;
        }
        accepted
    }

    /// Re-open the gate for a new utterance.
    pub fn reset(&mut self) {
        self.open = true;
    }
}

impl Default for UtteranceGate {
    fn default() -> Self {
        Self::new()
    }
}

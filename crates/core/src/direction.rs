//! Text-to-direction collaborator contract
//!
//! Voice transcripts reach the session as plain text. Turning text into a
//! [`Direction`] is delegated so the recognizer vocabulary can change without
//! touching the session.

use crate::types::Direction;

pub trait DirectionExtractor {
    /// Direction named by `text`, if any
    fn extract(&self, text: &str) -> Option<Direction>;
}

impl<F> DirectionExtractor for F
where
    F: Fn(&str) -> Option<Direction>,
{
    fn extract(&self, text: &str) -> Option<Direction> {
        self(text)
    }
}

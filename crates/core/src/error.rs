//! Error types for deck construction and navigation.

use thiserror::Error;

use crate::regression::RegressionError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading, or navigating a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// A jump targeted a slide index outside the deck.
    #[error("Slide index {index} is out of range (deck has {len} slides)")]
    OutOfRange { index: usize, len: usize },

    /// A deck must contain at least one slide.
    #[error("Deck has no slides")]
    EmptyDeck,

    /// Reveal indices within a slide must run 0, 1, 2, ... without gaps.
    #[error("Slide {slide}: reveal step at position {position} has index {found}")]
    NonContiguousReveal {
        slide: usize,
        position: usize,
        found: usize,
    },

    /// Background darken factor outside [0, 1].
    #[error("Slide {slide}: invalid background: {reason}")]
    InvalidBackground { slide: usize, reason: String },

    /// Failed to read or write a deck file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Deck file is not valid JSON or does not match the deck schema.
    #[error("Deck JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regression demo failed.
    #[error("Regression error: {0}")]
    Regression(#[from] RegressionError),
}

//! Core domain types, slide sequencing, and plain text rendering for the
//! gradient descent lecture deck.

pub mod assets;
pub mod chart;
pub mod error;
pub mod lecture;
pub mod math;
pub mod regression;
pub mod render;
pub mod sequencer;
pub mod types;

pub use chart::{pairs_from_index, ChartSpec, Point};
pub use error::{Error, Result};
pub use math::MathNormalizer;
pub use regression::{Model, RegressionError, TrainConfig};
pub use render::{Frame, Renderer, TextRenderer};
pub use sequencer::{CursorPosition, Navigation, Sequencer};
pub use types::{
    Background, Content, Deck, DeckBuilder, RevealStep, Slide, SlideBuilder, SlideStyle, Theme,
    ThemeColor, Transition, TransitionKind,
};

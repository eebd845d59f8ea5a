//! Slide sequencer: the cursor over (slide, reveal step) positions.
//!
//! All navigation except [`Sequencer::jump_to`] is total. Moving past either
//! end of the deck is a no-op, never an error, so a live presentation cannot
//! be halted by repeated input.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{Deck, RevealStep, Slide, Transition};

/// Position of the cursor.
///
/// `reveal == step_count` means every step of the slide is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct CursorPosition {
    pub slide: usize,
    pub reveal: usize,
}

impl CursorPosition {
    pub fn new(slide: usize, reveal: usize) -> Self {
        Self { slide, reveal }
    }
}

/// What a navigation command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// One more step is now shown.
    Revealed,
    /// One step was hidden again.
    Concealed,
    /// The cursor moved to another slide; the renderer should play `transition`.
    Entered { transition: Transition },
    /// The cursor was already at a boundary.
    Unchanged,
}

impl Navigation {
    pub fn moved(&self) -> bool {
        !matches!(self, Navigation::Unchanged)
    }
}

/// Owns a deck and the only mutable presentation state.
#[derive(Debug, Clone)]
pub struct Sequencer {
    deck: Deck,
    cursor: CursorPosition,
}

impl Sequencer {
    /// Start a presentation at (0, 0).
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            cursor: CursorPosition::default(),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn position(&self) -> CursorPosition {
        self.cursor
    }

    pub fn current_slide(&self) -> &Slide {
        // Cursor invariant: slide < deck.len(), and the deck is never empty.
        &self.deck.slides()[self.cursor.slide]
    }

    /// True at (0, 0).
    pub fn is_start(&self) -> bool {
        self.cursor == CursorPosition::default()
    }

    /// True when the last slide is fully revealed.
    pub fn is_terminal(&self) -> bool {
        self.cursor.slide + 1 == self.deck.len()
            && self.cursor.reveal == self.current_slide().step_count()
    }

    /// Reveal the next step, or enter the next slide when fully revealed.
    pub fn advance(&mut self) -> Navigation {
        let steps = self.current_slide().step_count();

        if self.cursor.reveal < steps {
            self.cursor.reveal += 1;
            log::trace!("Revealed step {} of slide {}", self.cursor.reveal, self.cursor.slide);
            return Navigation::Revealed;
        }

        if self.cursor.slide + 1 < self.deck.len() {
            return self.enter(CursorPosition::new(self.cursor.slide + 1, 0));
        }

        log::trace!("Advance ignored at end of deck");
        Navigation::Unchanged
    }

    /// Hide the last shown step, or enter the previous slide fully revealed.
    pub fn retreat(&mut self) -> Navigation {
        if self.cursor.reveal > 0 {
            self.cursor.reveal -= 1;
            log::trace!("Concealed step {} of slide {}", self.cursor.reveal + 1, self.cursor.slide);
            return Navigation::Concealed;
        }

        if self.cursor.slide > 0 {
            let previous = self.cursor.slide - 1;
            let steps = self.deck.slides()[previous].step_count();
            return self.enter(CursorPosition::new(previous, steps));
        }

        log::trace!("Retreat ignored at start of deck");
        Navigation::Unchanged
    }

    /// Move to the start of slide `index`.
    ///
    /// Fails with [`Error::OutOfRange`] and leaves the cursor untouched when
    /// `index` is not a slide of the deck.
    pub fn jump_to(&mut self, index: usize) -> Result<Navigation> {
        if index >= self.deck.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.deck.len(),
            });
        }

        let target = CursorPosition::new(index, 0);
        if target == self.cursor {
            return Ok(Navigation::Unchanged);
        }

        if target.slide == self.cursor.slide {
            // Same slide: collapsing reveals does not replay the transition.
            self.cursor = target;
            return Ok(Navigation::Concealed);
        }

        Ok(self.enter(target))
    }

    /// Move to the terminal state: last slide, every step shown.
    pub fn jump_to_end(&mut self) -> Navigation {
        let last = self.deck.len() - 1;
        let target = CursorPosition::new(last, self.deck.slides()[last].step_count());
        if target == self.cursor {
            return Navigation::Unchanged;
        }
        if target.slide == self.cursor.slide {
            self.cursor = target;
            return Navigation::Revealed;
        }
        self.enter(target)
    }

    /// Back to (0, 0).
    pub fn reset(&mut self) {
        self.cursor = CursorPosition::default();
    }

    /// Steps of the current slide with index ≤ the current reveal, in order.
    pub fn current_visible(&self) -> Vec<&RevealStep> {
        self.current_slide()
            .steps
            .iter()
            .filter(|s| s.index <= self.cursor.reveal)
            .collect()
    }

    fn enter(&mut self, target: CursorPosition) -> Navigation {
        let transition = self.deck.transition_for(target.slide);
        log::debug!(
            "Entering slide {} at reveal {} ({:?}, {} ms)",
            target.slide,
            target.reveal,
            transition.kind,
            transition.duration_ms
        );
        self.cursor = target;
        Navigation::Entered { transition }
    }
}

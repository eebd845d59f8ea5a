//! Domain types for representing an authored slide deck.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chart::ChartSpec;
use crate::error::{Error, Result};

/// An entire presentation: slides in presentation order plus deck-wide settings.
///
/// A `Deck` is immutable once built. Use [`DeckBuilder`] to author one in code,
/// or [`Deck::from_json`] to load one; both paths validate the invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deck {
    /// Presentation title.
    pub title: String,

    /// Palette and fonts shared by all slides.
    pub theme: Theme,

    /// Transition used when a slide has no override.
    pub transition: Transition,

    /// Slides in presentation order.
    slides: Vec<Slide>,
}

/// Serialized form of a deck, validated on the way in.
#[derive(Deserialize)]
struct RawDeck {
    #[serde(default)]
    title: String,
    #[serde(default)]
    theme: Theme,
    #[serde(default)]
    transition: Transition,
    slides: Vec<Slide>,
}

impl<'de> Deserialize<'de> for Deck {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawDeck::deserialize(deserializer)?;
        let mut deck = Deck::new(raw.slides).map_err(<D::Error as serde::de::Error>::custom)?;
        deck.title = raw.title;
        deck.theme = raw.theme;
        deck.transition = raw.transition;
        Ok(deck)
    }
}

impl Deck {
    /// Create a deck from slides, checking that it is non-empty and that
    /// every slide's reveal indices are contiguous from 0.
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::EmptyDeck);
        }

        for (idx, slide) in slides.iter().enumerate() {
            slide.validate(idx)?;
        }

        Ok(Self {
            title: String::new(),
            theme: Theme::default(),
            transition: Transition::default(),
            slides,
        })
    }

    /// Parse and validate a deck from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the deck as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate a deck file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading deck from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the deck as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Number of slides. Always at least 1.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// All slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Slide at `index`, if it exists.
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// The transition played when entering the slide at `index`.
    pub fn transition_for(&self, index: usize) -> Transition {
        self.slides
            .get(index)
            .and_then(|s| s.transition)
            .unwrap_or(self.transition)
    }
}

/// One screen of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Reveal steps in authored order. Step 0 is shown on entry.
    pub steps: Vec<RevealStep>,

    /// Background and text style, opaque to the sequencer.
    #[serde(default)]
    pub style: SlideStyle,

    /// Overrides the deck transition when entering this slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,

    /// Speaker notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Slide {
    /// Number of reveal steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// First heading on the slide, used as its title in outlines.
    pub fn title(&self) -> Option<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.content.iter())
            .find_map(|c| match c {
                Content::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
    }

    fn validate(&self, slide: usize) -> Result<()> {
        for (position, step) in self.steps.iter().enumerate() {
            if step.index != position {
                return Err(Error::NonContiguousReveal {
                    slide,
                    position,
                    found: step.index,
                });
            }
        }

        if let Background::Image { darken, .. } = &self.style.background {
            if !(0.0..=1.0).contains(darken) {
                return Err(Error::InvalidBackground {
                    slide,
                    reason: format!("darken factor {} is outside [0, 1]", darken),
                });
            }
        }

        Ok(())
    }
}

/// A unit of content that appears together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealStep {
    /// Position within the slide's reveal order.
    pub index: usize,

    /// Content pieces revealed by this step, in authored order.
    pub content: Vec<Content>,
}

/// Opaque payload handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    /// Heading, size 1 (largest) to 6.
    Heading {
        text: String,
        size: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<ThemeColor>,
    },
    /// Paragraph text. May embed inline TeX between `$` signs.
    Text { text: String },
    /// Bulleted list item. May embed inline TeX between `$` signs.
    ListItem { text: String },
    /// Standalone inline TeX expression.
    Math { tex: String },
    /// Image asset reference, resolved by the asset loader.
    Image { asset: String },
    /// Chart drawn by the renderer.
    Chart(ChartSpec),
    /// Table with a header row.
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Excerpt of a source file with a highlighted line range.
    Code {
        lang: String,
        source: String,
        /// Zero-based, half-open line range to highlight.
        highlight: (usize, usize),
    },
}

/// Background and text colours of a slide.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlideStyle {
    #[serde(default)]
    pub background: Background,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<ThemeColor>,
}

impl SlideStyle {
    /// Solid theme colour background.
    pub fn color(color: ThemeColor) -> Self {
        Self {
            background: Background::Color(color),
            text_color: None,
        }
    }

    /// Image background darkened by `darken` (0 = untouched, 1 = black).
    pub fn image(asset: impl Into<String>, darken: f32) -> Self {
        Self {
            background: Background::Image {
                asset: asset.into(),
                darken,
            },
            text_color: None,
        }
    }

    /// Set the default text colour.
    pub fn with_text_color(mut self, color: ThemeColor) -> Self {
        self.text_color = Some(color);
        self
    }
}

/// Slide background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Color(ThemeColor),
    Image { asset: String, darken: f32 },
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(ThemeColor::Primary)
    }
}

/// Named colour slots of the theme palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeColor {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Solarized,
}

/// Deck palette and fonts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub quaternary: String,
    pub solarized: String,
    pub heading_font: String,
    pub body_font: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: "white".to_string(),
            secondary: "#1F2022".to_string(),
            tertiary: "#03A9FC".to_string(),
            quaternary: "#CECECE".to_string(),
            solarized: "#0E2A34".to_string(),
            heading_font: "Montserrat".to_string(),
            body_font: "Helvetica".to_string(),
        }
    }
}

impl Theme {
    /// Resolve a palette slot to its colour value.
    pub fn resolve(&self, color: ThemeColor) -> &str {
        match color {
            ThemeColor::Primary => &self.primary,
            ThemeColor::Secondary => &self.secondary,
            ThemeColor::Tertiary => &self.tertiary,
            ThemeColor::Quaternary => &self.quaternary,
            ThemeColor::Solarized => &self.solarized,
        }
    }
}

/// Animation hint for entering a slide. Played by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration_ms: u32,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Fade,
            duration_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    None,
    Fade,
    Slide,
    Zoom,
}

/// Incremental author-side construction of a [`Deck`].
///
/// Reveal indices are assigned in call order, so decks built this way always
/// satisfy the contiguity invariant.
#[derive(Debug, Default)]
pub struct DeckBuilder {
    title: String,
    theme: Theme,
    transition: Transition,
    slides: Vec<Slide>,
}

impl DeckBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Append a slide.
    pub fn slide(mut self, slide: SlideBuilder) -> Self {
        self.slides.push(slide.build());
        self
    }

    /// Validate and finish the deck.
    pub fn build(self) -> Result<Deck> {
        let mut deck = Deck::new(self.slides)?;
        deck.title = self.title;
        deck.theme = self.theme;
        deck.transition = self.transition;
        Ok(deck)
    }
}

/// Construction of a single [`Slide`].
///
/// Content added with [`SlideBuilder::show`] goes into step 0 and is visible
/// on entry; each [`SlideBuilder::appear`] call adds one more reveal step.
#[derive(Debug)]
pub struct SlideBuilder {
    style: SlideStyle,
    transition: Option<Transition>,
    notes: Option<String>,
    steps: Vec<Vec<Content>>,
}

impl Default for SlideBuilder {
    fn default() -> Self {
        Self::new(SlideStyle::default())
    }
}

impl SlideBuilder {
    pub fn new(style: SlideStyle) -> Self {
        Self {
            style,
            transition: None,
            notes: None,
            steps: vec![Vec::new()],
        }
    }

    /// Add content to the always-visible first step.
    pub fn show(mut self, content: Content) -> Self {
        self.steps[0].push(content);
        self
    }

    /// Add a new reveal step holding one piece of content.
    pub fn appear(self, content: Content) -> Self {
        self.appear_all(vec![content])
    }

    /// Add a new reveal step holding several pieces of content.
    pub fn appear_all(mut self, content: Vec<Content>) -> Self {
        self.steps.push(content);
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Slide {
        Slide {
            steps: self
                .steps
                .into_iter()
                .enumerate()
                .map(|(index, content)| RevealStep { index, content })
                .collect(),
            style: self.style,
            transition: self.transition,
            notes: self.notes,
        }
    }
}

/// Shorthand constructors for common content.
impl Content {
    pub fn heading(text: impl Into<String>, size: u8) -> Self {
        Self::Heading {
            text: text.into(),
            size,
            color: None,
        }
    }

    pub fn colored_heading(text: impl Into<String>, size: u8, color: ThemeColor) -> Self {
        Self::Heading {
            text: text.into(),
            size,
            color: Some(color),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn item(text: impl Into<String>) -> Self {
        Self::ListItem { text: text.into() }
    }

    pub fn math(tex: impl Into<String>) -> Self {
        Self::Math { tex: tex.into() }
    }

    pub fn image(asset: impl Into<String>) -> Self {
        Self::Image {
            asset: asset.into(),
        }
    }

    /// Asset path referenced by this content, if any.
    pub fn asset(&self) -> Option<&str> {
        match self {
            Self::Image { asset } => Some(asset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize) -> RevealStep {
        RevealStep {
            index,
            content: vec![Content::text(format!("step {}", index))],
        }
    }

    fn slide(steps: Vec<RevealStep>) -> Slide {
        Slide {
            steps,
            style: SlideStyle::default(),
            transition: None,
            notes: None,
        }
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(matches!(Deck::new(vec![]), Err(Error::EmptyDeck)));
    }

    #[test]
    fn test_gap_in_reveal_indices_rejected() {
        let result = Deck::new(vec![slide(vec![step(0), step(2)])]);
        assert!(matches!(
            result,
            Err(Error::NonContiguousReveal {
                slide: 0,
                position: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_reveal_must_start_at_zero() {
        let result = Deck::new(vec![slide(vec![]), slide(vec![step(1)])]);
        assert!(matches!(
            result,
            Err(Error::NonContiguousReveal { slide: 1, .. })
        ));
    }

    #[test]
    fn test_darken_out_of_range_rejected() {
        let mut bad = slide(vec![step(0)]);
        bad.style = SlideStyle::image("volcano.jpg", 1.5);
        assert!(matches!(
            Deck::new(vec![bad]),
            Err(Error::InvalidBackground { slide: 0, .. })
        ));
    }

    #[test]
    fn test_builder_assigns_contiguous_indices() {
        let deck = DeckBuilder::new("Test")
            .slide(
                SlideBuilder::default()
                    .show(Content::heading("Title", 1))
                    .appear(Content::item("one"))
                    .appear(Content::item("two")),
            )
            .build()
            .unwrap();

        let indices: Vec<usize> = deck.slide(0).unwrap().steps.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(deck.title, "Test");
    }

    #[test]
    fn test_slide_title_is_first_heading() {
        let slide = SlideBuilder::default()
            .show(Content::text("intro"))
            .appear(Content::heading("Later heading", 3))
            .build();
        assert_eq!(slide.title(), Some("Later heading"));
        assert_eq!(SlideBuilder::default().build().title(), None);
    }

    #[test]
    fn test_transition_override() {
        let zoom = Transition {
            kind: TransitionKind::Zoom,
            duration_ms: 300,
        };
        let deck = DeckBuilder::new("T")
            .slide(SlideBuilder::default())
            .slide(SlideBuilder::default().transition(zoom))
            .build()
            .unwrap();

        assert_eq!(deck.transition_for(0), Transition::default());
        assert_eq!(deck.transition_for(1), zoom);
    }

    #[test]
    fn test_json_round_trip_keeps_settings() {
        let deck = DeckBuilder::new("Round trip")
            .slide(
                SlideBuilder::new(SlideStyle::color(ThemeColor::Tertiary))
                    .show(Content::heading("Disclaimer", 6))
                    .appear(Content::math("y = mx + c"))
                    .notes("Say hello"),
            )
            .build()
            .unwrap();

        let json = deck.to_json().unwrap();
        let loaded = Deck::from_json(&json).unwrap();
        assert_eq!(loaded, deck);
    }

    #[test]
    fn test_json_with_gap_rejected() {
        let json = r#"{
            "slides": [
                { "steps": [
                    { "index": 0, "content": [] },
                    { "index": 3, "content": [] }
                ] }
            ]
        }"#;
        assert!(matches!(Deck::from_json(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{ "slides": [ { "steps": [] } ] }"#;
        let deck = Deck::from_json(json).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.theme, Theme::default());
        assert_eq!(deck.transition.duration_ms, 500);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Deck::load("/nonexistent/deck.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let deck = DeckBuilder::new("Saved")
            .slide(SlideBuilder::default().show(Content::text("hello")))
            .build()
            .unwrap();
        let path = std::env::temp_dir().join(format!("deck-core-{}.json", std::process::id()));

        deck.save(&path).unwrap();
        let loaded = Deck::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, deck);
    }

    #[test]
    fn test_theme_resolve() {
        let theme = Theme::default();
        assert_eq!(theme.resolve(ThemeColor::Tertiary), "#03A9FC");
        assert_eq!(theme.resolve(ThemeColor::Primary), "white");
    }
}

//! Plain text rendering of the visible part of a slide.
//!
//! The sequencer hands out a [`Frame`]; a [`Renderer`] turns it into output.
//! [`TextRenderer`] is the terminal implementation: math becomes Unicode text,
//! charts are summarised, tables are column aligned.

use crate::chart::ChartSpec;
use crate::math::MathNormalizer;
use crate::sequencer::{CursorPosition, Sequencer};
use crate::types::{Content, Deck, RevealStep, SlideStyle};

/// Everything a renderer needs to paint the current state.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    /// 1-based slide number.
    pub number: usize,
    pub total: usize,
    pub position: CursorPosition,
    pub step_count: usize,
    pub style: &'a SlideStyle,
    pub visible: Vec<&'a RevealStep>,
    pub notes: Option<&'a str>,
}

impl<'a> Frame<'a> {
    /// Project the sequencer's current state.
    pub fn current(sequencer: &'a Sequencer) -> Self {
        let slide = sequencer.current_slide();
        let position = sequencer.position();
        Self {
            number: position.slide + 1,
            total: sequencer.deck().len(),
            position,
            step_count: slide.step_count(),
            style: &slide.style,
            visible: sequencer.current_visible(),
            notes: slide.notes.as_deref(),
        }
    }

    /// Slide `index` with every step revealed.
    pub fn revealed(deck: &'a Deck, index: usize) -> Option<Self> {
        let slide = deck.slide(index)?;
        Some(Self {
            number: index + 1,
            total: deck.len(),
            position: CursorPosition::new(index, slide.step_count()),
            step_count: slide.step_count(),
            style: &slide.style,
            visible: slide.steps.iter().collect(),
            notes: slide.notes.as_deref(),
        })
    }

    /// Visible content pieces in authored order.
    pub fn content(&self) -> impl Iterator<Item = &'a Content> + '_ {
        self.visible.iter().copied().flat_map(|s| s.content.iter())
    }
}

/// Paints a frame.
pub trait Renderer {
    fn render(&self, frame: &Frame<'_>) -> String;
}

/// Terminal renderer.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Width of the header rule.
    width: usize,
    /// Print speaker notes under the slide.
    show_notes: bool,
    math: MathNormalizer,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            width: 60,
            show_notes: false,
            math: MathNormalizer::new(),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    pub fn with_notes(mut self, show: bool) -> Self {
        self.show_notes = show;
        self
    }

    pub fn with_math(mut self, math: MathNormalizer) -> Self {
        self.math = math;
        self
    }

    fn header(&self, frame: &Frame<'_>) -> String {
        let label = format!(
            " Slide {}/{} · step {}/{} ",
            frame.number, frame.total, frame.position.reveal, frame.step_count
        );
        let fill = self.width.saturating_sub(label.chars().count() + 2);
        format!("──{}{}", label, "─".repeat(fill))
    }

    fn content(&self, content: &Content, out: &mut Vec<String>) {
        match content {
            Content::Heading { text, size, .. } => {
                let text = self.math.normalize_inline(text);
                let (text, rule) = if *size <= 2 {
                    (text.to_uppercase(), '=')
                } else {
                    (text, '-')
                };
                let underline = rule.to_string().repeat(text.chars().count());
                out.push(text);
                out.push(underline);
            }
            Content::Text { text } => out.push(self.math.normalize_inline(text)),
            Content::ListItem { text } => {
                out.push(format!("  • {}", self.math.normalize_inline(text)))
            }
            Content::Math { tex } => out.push(format!("    {}", self.math.normalize(tex))),
            Content::Image { asset } => out.push(format!("[image: {}]", asset)),
            Content::Chart(chart) => self.chart(chart, out),
            Content::Table { header, rows } => self.table(header, rows, out),
            Content::Code {
                lang,
                source,
                highlight,
            } => {
                out.push(format!("[{} lines {}-{}]", lang, highlight.0 + 1, highlight.1));
                for (idx, line) in source
                    .lines()
                    .enumerate()
                    .skip(highlight.0)
                    .take(highlight.1.saturating_sub(highlight.0))
                {
                    out.push(format!("{:>4} | {}", idx + 1, line).trim_end().to_string());
                }
            }
        }
    }

    fn chart(&self, chart: &ChartSpec, out: &mut Vec<String>) {
        let mut line = match &chart.title {
            Some(title) => format!("[chart: {}]", title),
            None => "[chart]".to_string(),
        };
        if let Some(((x0, x1), (y0, y1))) = chart.bounds() {
            line.push_str(&format!(
                " x ∈ [{}, {}], y ∈ [{}, {}]",
                number(x0),
                number(x1),
                number(y0),
                number(y1)
            ));
        }
        out.push(line);

        if !chart.points.is_empty() {
            let points: Vec<String> = chart
                .points
                .iter()
                .map(|p| format!("({}, {})", number(p.x), number(p.y)))
                .collect();
            out.push(format!("  points: {}", points.join(" ")));
        }

        for l in &chart.lines {
            out.push(format!(
                "  line: ({}, {}) → ({}, {})",
                number(l.from.x),
                number(l.from.y),
                number(l.to.x),
                number(l.to.y)
            ));
        }
    }

    fn table(&self, header: &[String], rows: &[Vec<String>], out: &mut Vec<String>) {
        let header: Vec<String> = header.iter().map(|h| self.math.normalize_inline(h)).collect();
        let columns = rows.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);

        let mut widths = vec![0; columns];
        for row in std::iter::once(&header).chain(rows) {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let format_row = |row: &[String]| {
            row.iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        out.push(format_row(&header));
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in rows {
            out.push(format_row(row));
        }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, frame: &Frame<'_>) -> String {
        let mut lines = vec![self.header(frame)];

        for content in frame.content() {
            self.content(content, &mut lines);
        }

        if self.show_notes {
            if let Some(notes) = frame.notes {
                lines.push(String::new());
                lines.push(format!("Notes: {}", notes));
            }
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}

/// Format a number with at most three decimals.
fn number(x: f64) -> String {
    let rounded = (x * 1000.0).round() / 1000.0;
    // Avoid printing "-0".
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

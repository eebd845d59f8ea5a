//! CLI tool for presenting slide decks in a terminal.

mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_core::regression::{self, TrainConfig, DEFAULT_ITERATIONS, DEFAULT_LEARNING_RATE, HOUSING_DATA};
use deck_core::{
    assets, lecture, Deck, Error, Frame, MathNormalizer, Navigation, Renderer, Sequencer, TextRenderer,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::input::{Input, HELP};

/// Present the gradient descent lecture, or any deck file, in a terminal.
#[derive(Parser, Debug)]
#[command(name = "deck-present")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Which deck to use.
#[derive(clap::Args, Debug)]
struct DeckArgs {
    /// Deck JSON file (default: the built-in lecture)
    #[arg(short, long)]
    deck: Option<PathBuf>,
}

/// How to draw slides.
#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Include speaker notes in output
    #[arg(short, long)]
    notes: bool,

    /// Width of the slide header rule
    #[arg(short, long, default_value = "60")]
    width: usize,

    /// Keep TeX sub/superscript markers instead of Unicode characters
    #[arg(long)]
    ascii: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Step through the deck interactively, reading commands from stdin
    Present {
        #[command(flatten)]
        deck: DeckArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Slide to start on (1-based)
        #[arg(short, long, default_value = "1")]
        start: usize,
    },

    /// List slide numbers, titles, and reveal step counts
    Outline {
        #[command(flatten)]
        deck: DeckArgs,
    },

    /// Print slides fully revealed
    Print {
        #[command(flatten)]
        deck: DeckArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Only print this slide (1-based)
        #[arg(short, long)]
        slide: Option<usize>,
    },

    /// Write the deck as JSON
    Export {
        #[command(flatten)]
        deck: DeckArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train the housing price regression from the lecture demo
    Train {
        /// Gradient descent learning rate
        #[arg(short = 'r', long, default_value_t = DEFAULT_LEARNING_RATE)]
        learning_rate: f64,

        /// Number of batch updates
        #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: usize,

        /// Features to predict a price for: sqft,bedrooms,bathrooms,viewings
        #[arg(short, long, value_delimiter = ',')]
        predict: Vec<f64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Present {
            deck,
            render,
            start,
        } => {
            let deck = load_deck(&deck)?;
            let mut sequencer = Sequencer::new(deck);
            if start > 1 {
                sequencer
                    .jump_to(start - 1)
                    .with_context(|| format!("Cannot start on slide {}", start))?;
            }

            let stdin = io::stdin();
            let stdout = io::stdout();
            present(&mut sequencer, &renderer(&render), stdin.lock(), stdout.lock())
        }
        Command::Outline { deck } => {
            let deck = load_deck(&deck)?;
            print!("{}", outline(&deck));
            Ok(())
        }
        Command::Print {
            deck,
            render,
            slide,
        } => {
            let deck = load_deck(&deck)?;
            let renderer = renderer(&render);
            let indices: Vec<usize> = match slide {
                Some(n) => vec![slide_index(&deck, n)?],
                None => (0..deck.len()).collect(),
            };
            for index in indices {
                if let Some(frame) = Frame::revealed(&deck, index) {
                    println!("{}", renderer.render(&frame));
                }
            }
            Ok(())
        }
        Command::Export { deck, output } => {
            let deck = load_deck(&deck)?;
            match output {
                Some(path) => {
                    deck.save(&path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Written to: {}", path.display());
                }
                None => println!("{}", deck.to_json()?),
            }
            Ok(())
        }
        Command::Train {
            learning_rate,
            iterations,
            predict,
        } => train(
            TrainConfig {
                learning_rate,
                iterations,
            },
            &predict,
        ),
    }
}

/// Load the requested deck, or build the lecture, and report missing assets.
fn load_deck(args: &DeckArgs) -> Result<Deck> {
    let (deck, base) = match &args.deck {
        Some(path) => {
            let deck = Deck::load(path)
                .with_context(|| format!("Failed to load deck {}", path.display()))?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (deck, base)
        }
        None => (
            lecture::gradient_descent().context("Failed to build the lecture deck")?,
            PathBuf::from("."),
        ),
    };

    for missing in assets::missing_assets(&deck, &base) {
        log::warn!("Asset not found: {}", missing.display());
    }

    log::debug!("Deck \"{}\" has {} slides", deck.title, deck.len());
    Ok(deck)
}

fn renderer(args: &RenderArgs) -> TextRenderer {
    TextRenderer::new()
        .with_width(args.width)
        .with_notes(args.notes)
        .with_math(MathNormalizer::new().with_unicode_scripts(!args.ascii))
}

/// Convert a 1-based slide number to an index, checking it exists.
fn slide_index(deck: &Deck, number: usize) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) if index < deck.len() => Ok(index),
        _ => anyhow::bail!("No slide {} (deck has {} slides)", number, deck.len()),
    }
}

/// One line per slide: number, title, reveal steps.
fn outline(deck: &Deck) -> String {
    let mut out = String::new();
    if !deck.title.is_empty() {
        out.push_str(&format!("{}\n", deck.title));
    }
    for (idx, slide) in deck.slides().iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {} ({} steps)\n",
            idx + 1,
            slide.title().unwrap_or("(untitled)"),
            slide.step_count()
        ));
    }
    out
}

/// Read commands until quit or end of input, redrawing after each move.
///
/// Every command is handled to completion before the next line is read.
fn present<R: BufRead, W: Write>(
    sequencer: &mut Sequencer,
    renderer: &impl Renderer,
    input: R,
    mut out: W,
) -> Result<()> {
    write!(out, "{}", renderer.render(&Frame::current(sequencer)))?;
    out.flush()?;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;

        let navigation = match Input::parse(&line) {
            Input::Next => {
                let nav = sequencer.advance();
                if !nav.moved() {
                    writeln!(out, "(end of deck)")?;
                }
                nav
            }
            Input::Prev => {
                let nav = sequencer.retreat();
                if !nav.moved() {
                    writeln!(out, "(start of deck)")?;
                }
                nav
            }
            Input::Goto(number) => match number.checked_sub(1) {
                Some(index) => goto(sequencer, index, &mut out)?,
                None => {
                    writeln!(out, "No slide 0 (slides are numbered from 1)")?;
                    Navigation::Unchanged
                }
            },
            Input::Home => goto(sequencer, 0, &mut out)?,
            Input::End => sequencer.jump_to_end(),
            Input::Help => {
                writeln!(out, "{}", HELP)?;
                Navigation::Unchanged
            }
            Input::Quit => break,
            Input::Unknown(command) => {
                writeln!(out, "Unknown command: {} (type help)", command)?;
                Navigation::Unchanged
            }
        };

        if let Navigation::Entered { transition } = navigation {
            log::debug!("Transition {:?} for {} ms", transition.kind, transition.duration_ms);
        }
        if navigation.moved() {
            write!(out, "{}", renderer.render(&Frame::current(sequencer)))?;
        }
        out.flush()?;
    }

    Ok(())
}

/// Jump to a slide index, reporting an out-of-range target instead of failing.
fn goto(sequencer: &mut Sequencer, index: usize, out: &mut impl Write) -> Result<Navigation> {
    match sequencer.jump_to(index) {
        Ok(navigation) => Ok(navigation),
        Err(Error::OutOfRange { index, len }) => {
            writeln!(out, "No slide {} (deck has {} slides)", index + 1, len)?;
            Ok(Navigation::Unchanged)
        }
        Err(e) => Err(e.into()),
    }
}

/// Train on the housing data and print the fit.
fn train(config: TrainConfig, features: &[f64]) -> Result<()> {
    let model = regression::train(&HOUSING_DATA, config).context("Training failed")?;

    println!(
        "Trained {} iterations at learning rate {}",
        model.iterations, config.learning_rate
    );
    println!("Loss: {:.6}", model.loss);
    println!("Weights: {:?}", model.weights);

    let features = if features.is_empty() {
        &[3000.0, 2.0, 1.0, 20.0][..]
    } else {
        features
    };
    let price = model.predict(features).context("Prediction failed")?;
    println!("Predicted price for {:?}: {:.1}", features, price);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{Content, CursorPosition, DeckBuilder, SlideBuilder};
    use std::io::Cursor;

    fn sequencer() -> Sequencer {
        let deck = DeckBuilder::new("CLI")
            .slide(
                SlideBuilder::default()
                    .show(Content::heading("First", 3))
                    .appear(Content::item("point"))
                    .appear(Content::item("another point")),
            )
            .slide(SlideBuilder::default().show(Content::heading("Second", 3)))
            .build()
            .unwrap();
        Sequencer::new(deck)
    }

    fn run(seq: &mut Sequencer, commands: &str) -> String {
        let mut out = Vec::new();
        present(seq, &TextRenderer::new(), Cursor::new(commands), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_present_steps_through() {
        let mut seq = sequencer();
        let output = run(&mut seq, "n\nn\nn\n");
        assert_eq!(seq.position(), CursorPosition::new(0, 3));
        assert!(output.contains("another point"));
        assert!(!output.contains("Second"));

        // The slide is fully revealed, so the next command enters slide 2.
        let output = run(&mut seq, "n\n");
        assert_eq!(seq.position(), CursorPosition::new(1, 0));
        assert!(output.contains("Second"));
    }

    #[test]
    fn test_present_stops_on_quit() {
        let mut seq = sequencer();
        run(&mut seq, "n\nq\nn\nn\n");
        assert_eq!(seq.position(), CursorPosition::new(0, 1));
    }

    #[test]
    fn test_present_bad_goto_keeps_position() {
        let mut seq = sequencer();
        let output = run(&mut seq, "n\ng 9\n");
        assert!(output.contains("No slide 9 (deck has 2 slides)"));
        assert_eq!(seq.position(), CursorPosition::new(0, 1));
    }

    #[test]
    fn test_present_goto_zero() {
        let mut seq = sequencer();
        let output = run(&mut seq, "n\ng 0\n");
        assert!(output.contains("No slide 0"));
        assert_eq!(seq.position(), CursorPosition::new(0, 1));
    }

    #[test]
    fn test_goto_reports_out_of_range() {
        let mut seq = sequencer();
        let mut out = Vec::new();
        let navigation = goto(&mut seq, 5, &mut out).unwrap();

        assert_eq!(navigation, Navigation::Unchanged);
        assert_eq!(String::from_utf8(out).unwrap(), "No slide 6 (deck has 2 slides)\n");
        assert!(seq.is_start());

        let mut out = Vec::new();
        assert!(goto(&mut seq, 1, &mut out).unwrap().moved());
        assert_eq!(seq.position(), CursorPosition::new(1, 0));
    }

    #[test]
    fn test_present_boundaries() {
        let mut seq = sequencer();
        let output = run(&mut seq, "p\nend\nn\nhome\n");
        assert!(output.contains("(start of deck)"));
        assert!(output.contains("(end of deck)"));
        assert!(seq.is_start());
    }

    #[test]
    fn test_outline() {
        let seq = sequencer();
        assert_eq!(
            outline(seq.deck()),
            "CLI\n  1. First (3 steps)\n  2. Second (1 steps)\n"
        );
    }

    #[test]
    fn test_slide_index() {
        let seq = sequencer();
        assert_eq!(slide_index(seq.deck(), 2).unwrap(), 1);
        assert!(slide_index(seq.deck(), 0).is_err());
        assert!(slide_index(seq.deck(), 3).is_err());
    }
}

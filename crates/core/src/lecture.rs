//! The bundled lecture: "Gradient Descent (if you suck at math)".

use crate::chart::{line_through, pairs_from_index, ChartSpec, Point};
use crate::error::Result;
use crate::regression::{self, TrainConfig, HOUSING_DATA, SIMPLE_DATA};
use crate::types::{
    Content, Deck, DeckBuilder, SlideBuilder, SlideStyle, Theme, ThemeColor, Transition,
};

/// Source shown in the code walkthrough.
pub const DEMO_SOURCE: &str = include_str!("../assets/diy_gradient_descent.rs");

/// Highlighted line ranges of the walkthrough, in presentation order.
pub const WALKTHROUGH: [(usize, usize); 9] = [
    (75, 84),
    (50, 56),
    (57, 63),
    (2, 13),
    (14, 18),
    (19, 42),
    (43, 49),
    (85, 92),
    (93, 97),
];

pub const GRADIENT_DESCENT_ANIMATION: &str = "assets/gradient-descent-animation.gif";
pub const REGRESSION_ANIMATION: &str = "assets/linear-regression-gradient-descent-animation.gif";
pub const VOLCANO: &str = "assets/volcano.jpg";
pub const DEMO: &str = "assets/demo.gif";

/// Image assets referenced by the lecture.
pub const ASSETS: [&str; 4] = [GRADIENT_DESCENT_ANIMATION, REGRESSION_ANIMATION, VOLCANO, DEMO];

const DOMAIN: (f64, f64) = (-5.0, 5.0);
const RED: &str = "#c43a31";

/// Weights after one update from zero with a learning rate of 0.001.
const FIRST_UPDATE: (f64, f64) = (0.010, 0.019);

/// Simple data on axes crossing at the origin.
fn crosshairs() -> ChartSpec {
    ChartSpec::crosshairs(DOMAIN, DOMAIN, pairs_from_index(0, &SIMPLE_DATA))
}

fn table(header: &[&str], rows: &[&[f64]]) -> Content {
    Content::Table {
        header: header.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect(),
    }
}

/// Add one reveal step per list item.
fn items<S: AsRef<str>>(mut slide: SlideBuilder, items: &[S]) -> SlideBuilder {
    for item in items {
        slide = slide.appear(Content::item(item.as_ref()));
    }
    slide
}

fn math_slide<S: AsRef<str>>(title: &str, list: &[S]) -> SlideBuilder {
    items(
        SlideBuilder::new(SlideStyle::image(VOLCANO, 0.7).with_text_color(ThemeColor::Primary))
            .show(Content::colored_heading(title, 1, ThemeColor::Primary)),
        list,
    )
}

fn section(title: &str) -> SlideBuilder {
    SlideBuilder::new(SlideStyle::color(ThemeColor::Secondary).with_text_color(ThemeColor::Primary))
        .show(Content::colored_heading(title, 1, ThemeColor::Tertiary))
}

/// Gradient of the loss at zero weights, one term per simple data row.
///
/// With `feature` the residual is multiplied by `x_1`, otherwise by `x_0 = 1`.
fn expanded_gradient(feature: bool) -> String {
    SIMPLE_DATA
        .iter()
        .map(|&[x, y]| {
            let multiplier = if feature { x } else { 1.0 };
            format!("(({} - ((0)(1) + (0)({})))({}))", y, x, multiplier)
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Squared residuals of the simple data for the line `w0 + w1 x`.
fn expanded_loss(w0: f64, w1: f64) -> String {
    SIMPLE_DATA
        .iter()
        .map(|&[x, y]| format!("({} - (({:.3})(1) + ({:.3})({})))^2", y, w0, w1, x))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Build the full lecture deck.
pub fn gradient_descent() -> Result<Deck> {
    let simple_rows: Vec<&[f64]> = SIMPLE_DATA.iter().map(|r| r.as_slice()).collect();
    let housing_rows: Vec<&[f64]> = HOUSING_DATA.iter().map(|r| r.as_slice()).collect();

    let fitted = regression::train(&SIMPLE_DATA, TrainConfig::default())?;
    let (intercept, slope) = fitted.line().unwrap_or((0.0, 0.0));

    let (w0, w1) = FIRST_UPDATE;
    // Slides show the summed loss, not the mean.
    let first_loss = regression::loss(&[w0, w1], &SIMPLE_DATA)? * SIMPLE_DATA.len() as f64;
    let gradient_w0 = format!(r"$\partial w_0 = \alpha {}$", expanded_gradient(false));
    let gradient_w1 = format!(r"$\partial w_1 = \alpha {}$", expanded_gradient(true));
    let learning_rate_update = format!(
        "With $0.001$: $w_0 = w_0 + {:.3}$ and $w_1 = w_1 + {:.3}$",
        w0, w1
    );
    let weight_updates: Vec<String> = (0..HOUSING_DATA[0].len())
        .map(|j| {
            format!(
                r"$w_{0} = w_{0} + \alpha \sum_{{i=0}}^n (y_i - \sum_{{k=0}}^v w_kx_{{ik}}) x_{{i{0}}}$",
                j
            )
        })
        .collect();

    let mut walkthrough = SlideBuilder::new(SlideStyle::color(ThemeColor::Secondary))
        .show(Content::colored_heading("The code", 5, ThemeColor::Tertiary))
        .notes("Step through each highlighted range");
    for highlight in WALKTHROUGH {
        walkthrough = walkthrough.appear(Content::Code {
            lang: "rust".to_string(),
            source: DEMO_SOURCE.to_string(),
            highlight,
        });
    }

    let price_charts = [
        "Price vs Sqft",
        "Price vs Bedrooms",
        "Price vs Bathrooms",
        "Price vs Viewings",
    ]
    .iter()
    .enumerate()
    .map(|(column, title)| {
        Content::Chart(ChartSpec::scatter(pairs_from_index(column, &HOUSING_DATA)).with_title(*title))
    })
    .fold(SlideBuilder::new(SlideStyle::color(ThemeColor::Primary)), |slide, chart| {
        slide.show(chart)
    });

    DeckBuilder::new("Gradient Descent")
        .theme(Theme::default())
        .transition(Transition::default())
        .slide(
            SlideBuilder::new(SlideStyle::color(ThemeColor::Primary))
                .show(Content::colored_heading("Gradient Descent", 1, ThemeColor::Secondary))
                .show(Content::text("if you suck at math")),
        )
        .slide(
            SlideBuilder::new(SlideStyle::color(ThemeColor::Tertiary))
                .show(Content::colored_heading("Disclaimer", 6, ThemeColor::Primary))
                .show(Content::text("Maybe I got something wrong")),
        )
        .slide(SlideBuilder::default().show(Content::image(GRADIENT_DESCENT_ANIMATION)))
        .slide(
            SlideBuilder::default()
                .show(Content::colored_heading("Linear Regression", 1, ThemeColor::Secondary))
                .appear(Content::image(REGRESSION_ANIMATION)),
        )
        .slide(items(
            SlideBuilder::new(SlideStyle::color(ThemeColor::Secondary))
                .show(Content::colored_heading("Linear", 6, ThemeColor::Primary)),
            &[
                "Straight line",
                "Constant gradient",
                "$y = mx + c$",
                "$y = c + mx$",
                "$y = w_0 + w_1x$",
                "Solve for $w_0$ and $w_1$",
            ],
        ))
        .slide(
            items(
                SlideBuilder::default()
                    .show(Content::colored_heading("With 2 data points", 5, ThemeColor::Tertiary))
                    .show(Content::heading("this is very easy", 6))
                    .appear(table(&["$x$", "$y$"], &simple_rows[..2])),
                &[
                    "Solve for $w_0$ and $w_1$ in $y = w_0 + w_1x$",
                    "$1 = w_0 + w_1 0$ and $2 = w_0 + w_1 1$",
                    r"$w_0 = 1 - w_1 0$ and $w_1 = \frac{2 - w_0}{1}$",
                    "$w_0 = 1 - 0$",
                    "$w_0 = 1$",
                    "$w_1 = 2 - 1$",
                    "$w_1 = 1$",
                ],
            ),
        )
        .slide(
            SlideBuilder::default()
                .show(Content::Chart(
                    ChartSpec::crosshairs(DOMAIN, DOMAIN, vec![Point::new(0.0, 1.0), Point::new(1.0, 2.0)])
                        .with_line(line_through(1.0, 1.0, DOMAIN).with_stroke(RED)),
                ))
                .appear(Content::heading("$y = (1) + (1)x$", 5)),
        )
        .slide(
            SlideBuilder::default()
                .show(Content::colored_heading("Multiple data points", 5, ThemeColor::Tertiary))
                .appear(table(&["$x$", "$y$"], &simple_rows)),
        )
        .slide(
            SlideBuilder::default()
                .show(Content::Chart(crosshairs()))
                .appear(Content::heading("Not colinear!", 5))
                .appear(Content::colored_heading(
                    "But we can try and fit a line",
                    5,
                    ThemeColor::Tertiary,
                )),
        )
        .slide(
            SlideBuilder::default()
                .show(Content::Chart(crosshairs()))
                .show(Content::math("y = w_0x_0 + w_1x"))
                .show(Content::text(
                    "By \"convention\" we inserted $x_0$, just pretend that it is 1 :)",
                ))
                .show(Content::math("w_0 = ?"))
                .show(Content::math("w_1 = ?"))
                .appear(Content::colored_heading(
                    "No solution can be found by analysis",
                    5,
                    ThemeColor::Tertiary,
                )),
        )
        .slide(items(
            SlideBuilder::default()
                .show(Content::colored_heading("Lets try something else", 5, ThemeColor::Tertiary))
                .show(Content::Chart(crosshairs())),
            &[
                "We can define a function that tells us \"how inaccurate\" our line is",
                r"$Loss(w) = \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i}))^2$",
                "Loss is \"penalized\" quadratically the further an individual data point is from the line",
            ],
        ))
        .slide(items(
            SlideBuilder::default()
                .show(Content::colored_heading("Linear regression", 5, ThemeColor::Tertiary))
                .show(Content::Chart(
                    crosshairs().with_line(line_through(0.0, 0.0, DOMAIN).with_stroke(RED)),
                )),
            &[
                "Lets try it with $w_0 = 0$ and $w_1 = 0$",
                r"$Loss(w) = \sum_{i=0}^n (y_i - (0x_{0i} + 0x_{1i}))^2$",
                "$Loss(w) = 1^2 + 2^2 + 3^2 + 4^2 + 0^2$",
                "$Loss(w) = 30$",
                "That's a lot of loss...",
            ],
        ))
        .slide(items(
            section("Improving the situation"),
            &[
                "We need to adjust $w_0 = 0$ and $w_1 = 0$",
                "But we need to know what direction to go in",
                "Calculus to the rescue!",
                r"The derivative of $Loss(w) = \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i}))^2$ will tell you which direction to go in",
                "Looks messy, how do you take the derivative?",
            ],
        ))
        .slide(math_slide(
            "The dreaded \"math slide\"",
            &[
                r"We are trying to take the derivative of $Loss(w) = \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i}))^2$",
                r"$\frac{d}{dx} x^a = ax^{a - 1}$",
                r"$\frac{d}{dx} 1 = 0$",
                r"Sum: $\frac{d}{dx} (a + b + c) = \frac{d}{dx}a + \frac{d}{dx}b + \frac{d}{dx}c$",
                r"$\frac{d}{dx} \sum_{i=0}^n x_i = \sum_{i=0}^n \frac{d}{dx} x_i$",
                r"Chain: $\frac{d}{dx} (f(x))^a = (a(f(x))^{a - 1})(\frac{d}{dx} f(x))$",
                r"Partial: $\frac{\partial}{\partial x} ax^q + by^r + cz^s = qax^{q - 1}$ (treat $y$ and $z$ as constants)",
            ],
        ))
        .slide(math_slide(
            "The other dreaded \"math slide\"",
            &[
                r"$\frac{d}{dw_i} Loss(w) = \frac{d}{dw_i} \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i}))^2$",
                r"$\frac{\partial}{\partial w_0} \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i}))^2$",
                r"Sum: $\sum_{i=0}^n \frac{\partial}{\partial w_0} (y_i - (w_0x_{0i} + w_1x_{1i}))^2$",
                r"Chain: $\sum_{i=0}^n 2 (y_i - (w_0x_{0i} + w_1x_{1i})) \times \frac{\partial}{\partial w_0} (y_i - (w_0x_{0i} + w_1x_{1i}))$",
                r"Partial: $\sum_{i=0}^n 2 (y_i - (w_0x_{0i} + w_1x_{1i})) \times (0 - (x_{0i} + 0))$",
                r"Rearrange: $-2 \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i})) x_0$",
                r"Same thing for $w_1$: $\sum_{i=0}^n -2 (y_i - (w_0x_{0i} + w_1x_{1i})) x_1$",
                "How do we use this to update our weights?",
            ],
        ))
        .slide(items(
            section("Gradient Descent"),
            &[
                r"-2 is a constant, so we can just replace it with some learning rate $\alpha$",
                r"$\partial w_j = \alpha \sum_{i=0}^n (y_i - (w_0x_{0i} + w_1x_{1i})) x_{ij}$",
                r"Lets plug some values in for $w_0$, $w_1$, $y_i$, $x_{0i}$ and $x_{1i}$ to compute $\partial w_j$",
                gradient_w0.as_str(),
                r"$\alpha (1 + 2 + 3 + 4 + 0)$",
                r"$\alpha 10$",
                r"Add $\alpha 10$ to $w_0$",
                gradient_w1.as_str(),
                r"$\alpha ((1 \times 0) + (2 \times 1) + (3 \times 3) + (4 \times 2) + (0 \times 0))$",
                r"$\alpha 19$",
                r"Add $\alpha 19$ to $w_1$",
            ],
        ))
        .slide(items(
            section("Learning Rate"),
            &[
                r"We probably do not want $\alpha$ to be 1, since this will result in another wildly inaccurate guess",
                "Usually it is something like 0.001",
                "You probably also want to normalize all your training data too, just divide each $x_{i}$ by $max(x_{ij})$",
                learning_rate_update.as_str(),
            ],
        ))
        .slide(items(
            SlideBuilder::default()
                .show(Content::colored_heading("Linear regression", 5, ThemeColor::Tertiary))
                .show(Content::Chart(
                    crosshairs().with_line(line_through(w0, w1, DOMAIN).with_stroke(RED)),
                )),
            &[
                format!("$w_0 = {:.3}$ and $w_1 = {:.3}$", w0, w1),
                format!(
                    r"$Loss(w) = \sum_{{i=0}}^n (y_i - ({:.3}x_{{0i}} + {:.3}x_{{1i}}))^2$",
                    w0, w1
                ),
                format!("$Loss(w) = {}$", expanded_loss(w0, w1)),
                format!("$Loss(w) = {:.2}$", first_loss),
                "We did a little better this time!".to_string(),
            ],
        ))
        .slide(
            SlideBuilder::default()
                .show(Content::colored_heading("After many iterations", 5, ThemeColor::Tertiary))
                .show(Content::Chart(
                    crosshairs().with_line(line_through(intercept, slope, DOMAIN).with_stroke(RED)),
                ))
                .appear(Content::item(format!(
                    "$w_0 = {:.3}$ and $w_1 = {:.3}$",
                    intercept, slope
                ))),
        )
        .slide(items(
            section("Multivariate Linear Regression").appear(table(
                &["sqft $a$", "bed $b$", "bath $c$", "view $d$", "price $s$"],
                &housing_rows,
            )),
            &[
                "How can we generalise to $n$ dimensions?",
                "What does gradient descent look like in $n$ dimensions?",
            ],
        ))
        .slide(price_charts)
        .slide(items(
            section("Multivariate Linear Regression"),
            &[
                "We have $y_i = w_0x_0 + w_1a_i + w_2b_i + w_3c_i + w_4d_i$",
                "Or really: $y_i = w_0x_{0i} + w_1x_{1i} + w_2x_{2i} + w_3x_{3i} + w_4x_{4i}$",
                r"Or *really*: $y_i = w_0x_{0i} + \ldots + w_nx_{ni}$",
                r"Or REALLY: $y_i = \sum_{j=0}^n w_jx_{ji}$",
            ],
        ))
        .slide(math_slide(
            "One more MathSlide™",
            &[
                "With vectors of size $v$ we can find the corresponding weight update equations",
                r"$\frac{d}{dw_j} Loss(w) = \frac{d}{dw_j} \sum_{i=0}^n (y_i - \sum_{k=0}^v w_kx_{ik})^2$",
                r"$\frac{\partial}{\partial w_j} \sum_{i=0}^n (y_i - \sum_{k=0}^v w_kx_{ik})^2$",
                r"Sum: $\sum_{i=0}^n \frac{\partial}{\partial w_j} (y_i - \sum_{k=0}^v w_kx_{ik})^2$",
                r"Chain: $\sum_{i=0}^n 2 (y_i - \sum_{k=0}^v w_kx_{ik}) \times \frac{\partial}{\partial w_j} (y_i - \sum_{k=0}^v w_kx_{ik})$",
                r"Partial: $\sum_{i=0}^n 2 (y_i - \sum_{k=0}^v w_kx_{ik}) \times (0 - x_{ij})$",
                r"Rearrange: $-2 \sum_{i=0}^n (y_i - \sum_{k=0}^v w_kx_{ik}) x_{ij}$",
                r"Learning Rate: $\alpha \sum_{i=0}^n (y_i - \sum_{k=0}^v w_kx_{ik}) x_{ij}$",
            ],
        ))
        .slide(items(section("Weight Updates"), &weight_updates))
        .slide(walkthrough)
        .slide(SlideBuilder::new(SlideStyle::color(ThemeColor::Solarized)).show(Content::image(DEMO)))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Sequencer;
    use crate::types::Slide;

    #[test]
    fn test_lecture_builds() {
        let deck = gradient_descent().unwrap();
        assert_eq!(deck.title, "Gradient Descent");
        assert_eq!(deck.slide(0).unwrap().title(), Some("Gradient Descent"));
        assert_eq!(deck.len(), 26);
    }

    #[test]
    fn test_walkthrough_ranges_fit_source() {
        let lines = DEMO_SOURCE.lines().count();
        for (start, end) in WALKTHROUGH {
            assert!(start < end);
            assert!(end <= lines);
        }
    }

    #[test]
    fn test_walkthrough_has_one_step_per_range() {
        let deck = gradient_descent().unwrap();
        let code_slide = deck
            .slides()
            .iter()
            .find(|s| s.title() == Some("The code"))
            .unwrap();
        assert_eq!(code_slide.step_count(), WALKTHROUGH.len() + 1);
    }

    #[test]
    fn test_only_known_assets_referenced() {
        let deck = gradient_descent().unwrap();
        for slide in deck.slides() {
            for content in slide.steps.iter().flat_map(|s| s.content.iter()) {
                if let Some(asset) = content.asset() {
                    assert!(ASSETS.contains(&asset), "unknown asset {}", asset);
                }
            }
        }
    }

    #[test]
    fn test_walk_whole_lecture() {
        let deck = gradient_descent().unwrap();
        let total_positions: usize = deck.slides().iter().map(|s| s.step_count() + 1).sum();
        let mut seq = Sequencer::new(deck);

        let mut moves = 0;
        while seq.advance().moved() {
            moves += 1;
        }
        assert_eq!(moves, total_positions - 1);
        assert!(seq.is_terminal());
    }

    fn slide_titled<'a>(deck: &'a Deck, title: &str, skip: usize) -> &'a Slide {
        deck.slides()
            .iter()
            .filter(|s| s.title() == Some(title))
            .nth(skip)
            .unwrap()
    }

    #[test]
    fn test_derivation_slides_keep_every_step() {
        let deck = gradient_descent().unwrap();

        // Heading step plus one step per line.
        assert_eq!(slide_titled(&deck, "Gradient Descent", 1).step_count(), 12);
        assert_eq!(slide_titled(&deck, "Linear regression", 1).step_count(), 6);
        assert_eq!(slide_titled(&deck, "One more MathSlide™", 0).step_count(), 9);
        assert_eq!(slide_titled(&deck, "Weight Updates", 0).step_count(), 6);
    }

    #[test]
    fn test_first_update_numbers() {
        assert_eq!(
            expanded_gradient(false),
            "((1 - ((0)(1) + (0)(0)))(1)) + ((2 - ((0)(1) + (0)(1)))(1)) + \
             ((3 - ((0)(1) + (0)(3)))(1)) + ((4 - ((0)(1) + (0)(2)))(1)) + \
             ((0 - ((0)(1) + (0)(0)))(1))"
        );
        assert!(expanded_gradient(true).starts_with("((1 - ((0)(1) + (0)(0)))(0)) + "));

        let deck = gradient_descent().unwrap();
        let after = slide_titled(&deck, "Linear regression", 1);
        let lines: Vec<String> = after
            .steps
            .iter()
            .flat_map(|s| s.content.iter())
            .filter_map(|c| match c {
                Content::ListItem { text } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(lines.contains(&"$Loss(w) = 29.09$".to_string()));
        assert!(lines[2].starts_with("$Loss(w) = (1 - ((0.010)(1) + (0.019)(0)))^2 + "));
    }
}

//! Chart data for scatter plots and fitted lines.
//!
//! Drawing is left to the renderer; this module only reshapes numeric rows
//! into point series.

use serde::{Deserialize, Serialize};

use crate::types::ThemeColor;

/// A single chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A straight line segment drawn over the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
}

impl Line {
    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }
}

/// Scatter chart with optional line overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// X axis bounds. `None` lets the renderer fit the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<(f64, f64)>,

    /// Y axis bounds. `None` lets the renderer fit the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,

    #[serde(default)]
    pub points: Vec<Point>,

    #[serde(default)]
    pub lines: Vec<Line>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ThemeColor>,
}

impl ChartSpec {
    /// Scatter plot of `points` with no fixed axes.
    pub fn scatter(points: Vec<Point>) -> Self {
        Self {
            title: None,
            domain: None,
            range: None,
            points,
            lines: Vec::new(),
            color: None,
        }
    }

    /// Scatter plot with axes crossing at the origin over fixed bounds.
    pub fn crosshairs(domain: (f64, f64), range: (f64, f64), points: Vec<Point>) -> Self {
        Self {
            domain: Some(domain),
            range: Some(range),
            ..Self::scatter(points)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Bounds covering all points and lines, widened by the fixed axes if set.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let all = self
            .points
            .iter()
            .chain(self.lines.iter().flat_map(|l| [&l.from, &l.to]));

        let mut bounds: Option<((f64, f64), (f64, f64))> = None;
        for p in all {
            bounds = Some(match bounds {
                None => ((p.x, p.x), (p.y, p.y)),
                Some(((x0, x1), (y0, y1))) => ((x0.min(p.x), x1.max(p.x)), (y0.min(p.y), y1.max(p.y))),
            });
        }

        match (bounds, self.domain, self.range) {
            (Some((x, y)), domain, range) => Some((
                domain.map_or(x, |d| (d.0.min(x.0), d.1.max(x.1))),
                range.map_or(y, |r| (r.0.min(y.0), r.1.max(y.1))),
            )),
            (None, Some(d), Some(r)) => Some((d, r)),
            _ => None,
        }
    }
}

/// Pair column `column` of each row with the row's last value (the label).
///
/// Rows too short to hold `column` are skipped.
pub fn pairs_from_index<R: AsRef<[f64]>>(column: usize, rows: &[R]) -> Vec<Point> {
    rows.iter()
        .filter_map(|row| {
            let row = row.as_ref();
            let x = *row.get(column)?;
            let y = *row.last()?;
            Some(Point::new(x, y))
        })
        .collect()
}

/// End points of `y = w0 + w1 * x` across `domain`.
pub fn line_through(w0: f64, w1: f64, domain: (f64, f64)) -> Line {
    Line {
        from: Point::new(domain.0, w0 + w1 * domain.0),
        to: Point::new(domain.1, w0 + w1 * domain.1),
        stroke: None,
    }
}

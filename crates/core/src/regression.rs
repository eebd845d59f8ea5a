//! Multivariate linear regression by batch gradient descent.
//!
//! Training rows are `[x_1, ..., x_n, y]`: features followed by the label.
//! Weights are `[w_0, w_1, ..., w_n]` where `w_0` is the bias, i.e. the
//! weight of the constant feature `x_0 = 1`.

use thiserror::Error;

/// Learning rate used by the lecture demo.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Iteration count used by the lecture demo.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Housing data: square feet, bedrooms, bathrooms, viewings, price.
pub const HOUSING_DATA: [[f64; 5]; 4] = [
    [2104.0, 5.0, 1.0, 45.0, 460.0],
    [1416.0, 3.0, 2.0, 40.0, 232.0],
    [1534.0, 3.0, 2.0, 30.0, 315.0],
    [852.0, 2.0, 1.0, 36.0, 178.0],
];

/// Five points that do not lie on one line.
pub const SIMPLE_DATA: [[f64; 2]; 5] = [[0.0, 1.0], [1.0, 2.0], [3.0, 3.0], [2.0, 4.0], [0.0, 0.0]];

/// Errors from the regression routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// No training rows.
    #[error("Training data is empty")]
    EmptyData,

    /// Rows need at least one feature and a label.
    #[error("Training rows need at least 2 columns, found {0}")]
    TooFewColumns(usize),

    /// All rows must have the same width.
    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A column that is zero everywhere cannot be scaled.
    #[error("Column {0} is zero in every row and cannot be normalized")]
    ZeroColumn(usize),

    /// Prediction input has the wrong number of features.
    #[error("Expected {expected} features, found {found}")]
    FeatureWidth { expected: usize, found: usize },

    /// Weights must hold a bias plus one weight per feature column.
    #[error("Expected {expected} weights, found {found}")]
    WeightWidth { expected: usize, found: usize },
}

type Result<T> = std::result::Result<T, RegressionError>;

/// Gradient descent settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub iterations: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// A trained model, expressed over normalized data.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Bias followed by one weight per feature.
    pub weights: Vec<f64>,
    /// Per-column scale factors, label last.
    pub factors: Vec<f64>,
    /// Mean squared error on the normalized training data.
    pub loss: f64,
    pub iterations: usize,
}

impl Model {
    /// Number of input features.
    pub fn features(&self) -> usize {
        self.weights.len().saturating_sub(1)
    }

    /// Predict the label for raw (unnormalized) features.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if self.weights.is_empty() || self.weights.len() != self.factors.len() {
            return Err(RegressionError::WeightWidth {
                expected: self.factors.len().max(1),
                found: self.weights.len(),
            });
        }
        if features.len() != self.features() {
            return Err(RegressionError::FeatureWidth {
                expected: self.features(),
                found: features.len(),
            });
        }

        let normalized: Vec<f64> = features
            .iter()
            .zip(&self.factors)
            .map(|(x, f)| x / f)
            .collect();

        let label_factor = self.factors[self.factors.len() - 1];
        Ok(predict_normalized(&self.weights, &normalized) * label_factor)
    }

    /// Intercept and slope in raw units, for single-feature models.
    pub fn line(&self) -> Option<(f64, f64)> {
        match (self.weights.as_slice(), self.factors.as_slice()) {
            (&[w0, w1], &[fx, fy]) => Some((w0 * fy, w1 * fy / fx)),
            _ => None,
        }
    }
}

fn check_shape<R: AsRef<[f64]>>(rows: &[R]) -> Result<usize> {
    let width = rows
        .first()
        .map(|r| r.as_ref().len())
        .ok_or(RegressionError::EmptyData)?;

    if width < 2 {
        return Err(RegressionError::TooFewColumns(width));
    }

    for (row, r) in rows.iter().enumerate() {
        let found = r.as_ref().len();
        if found != width {
            return Err(RegressionError::RaggedRow {
                row,
                expected: width,
                found,
            });
        }
    }

    Ok(width)
}

/// Shape of `rows` and `weights` must agree before any arithmetic.
fn check_weights<R: AsRef<[f64]>>(weights: &[f64], rows: &[R]) -> Result<()> {
    let width = check_shape(rows)?;
    if weights.len() != width {
        return Err(RegressionError::WeightWidth {
            expected: width,
            found: weights.len(),
        });
    }
    Ok(())
}

/// Largest absolute value of each column.
pub fn normalization_factors<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<f64>> {
    let width = check_shape(rows)?;

    (0..width)
        .map(|col| {
            let max = rows
                .iter()
                .map(|r| r.as_ref()[col].abs())
                .fold(0.0, f64::max);
            if max == 0.0 {
                Err(RegressionError::ZeroColumn(col))
            } else {
                Ok(max)
            }
        })
        .collect()
}

/// Divide every column by its factor.
pub fn normalize_columns<R: AsRef<[f64]>>(rows: &[R], factors: &[f64]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|r| r.as_ref().iter().zip(factors).map(|(x, f)| x / f).collect())
        .collect()
}

fn predict_normalized(weights: &[f64], features: &[f64]) -> f64 {
    weights[0]
        + weights[1..]
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
}

/// Residual `y - prediction` for one row.
fn residual(weights: &[f64], row: &[f64]) -> f64 {
    let (features, label) = row.split_at(row.len() - 1);
    label[0] - predict_normalized(weights, features)
}

/// Mean squared error of `weights` over `rows`.
pub fn loss<R: AsRef<[f64]>>(weights: &[f64], rows: &[R]) -> Result<f64> {
    check_weights(weights, rows)?;
    Ok(mean_squared_error(weights, rows))
}

/// One batch gradient descent update.
///
/// `w_i += learning_rate * mean_k(residual_k * x_ik)` with `x_0k = 1`.
pub fn step<R: AsRef<[f64]>>(weights: &[f64], rows: &[R], learning_rate: f64) -> Result<Vec<f64>> {
    check_weights(weights, rows)?;
    Ok(update(weights, rows, learning_rate))
}

// Shapes already checked by `check_weights`.
fn mean_squared_error<R: AsRef<[f64]>>(weights: &[f64], rows: &[R]) -> f64 {
    let total: f64 = rows
        .iter()
        .map(|r| residual(weights, r.as_ref()).powi(2))
        .sum();
    total / rows.len() as f64
}

fn update<R: AsRef<[f64]>>(weights: &[f64], rows: &[R], learning_rate: f64) -> Vec<f64> {
    let n = rows.len() as f64;
    let mut gradient = vec![0.0; weights.len()];

    for row in rows {
        let row = row.as_ref();
        let err = residual(weights, row);
        gradient[0] += err;
        for (g, x) in gradient[1..].iter_mut().zip(row) {
            *g += err * x;
        }
    }

    weights
        .iter()
        .zip(gradient)
        .map(|(w, g)| w + learning_rate * g / n)
        .collect()
}

/// Normalize `rows` and fit weights from zero.
pub fn train<R: AsRef<[f64]>>(rows: &[R], config: TrainConfig) -> Result<Model> {
    let factors = normalization_factors(rows)?;
    let normalized = normalize_columns(rows, &factors);

    let mut weights = vec![0.0; factors.len()];
    let report_every = (config.iterations / 10).max(1);

    for it in 1..=config.iterations {
        weights = update(&weights, &normalized, config.learning_rate);
        if it % report_every == 0 {
            log::debug!(
                "Iteration {}, loss {:.6}, weights {:?}",
                it,
                mean_squared_error(&weights, &normalized),
                weights
            );
        }
    }

    let loss = mean_squared_error(&weights, &normalized);
    log::info!("Trained {} iterations, final loss {:.6}", config.iterations, loss);

    Ok(Model {
        weights,
        factors,
        loss,
        iterations: config.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_factors() {
        let factors = normalization_factors(&HOUSING_DATA).unwrap();
        assert_eq!(factors, vec![2104.0, 5.0, 2.0, 45.0, 460.0]);
    }

    #[test]
    fn test_normalize_columns_scales_to_unit() {
        let factors = normalization_factors(&SIMPLE_DATA).unwrap();
        let normalized = normalize_columns(&SIMPLE_DATA, &factors);
        assert_eq!(normalized[2], vec![1.0, 0.75]);
        assert!(normalized.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_shape_errors() {
        let empty: Vec<Vec<f64>> = vec![];
        assert_eq!(normalization_factors(&empty), Err(RegressionError::EmptyData));

        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert_eq!(
            normalization_factors(&ragged),
            Err(RegressionError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );

        let narrow = vec![vec![1.0]];
        assert_eq!(
            normalization_factors(&narrow),
            Err(RegressionError::TooFewColumns(1))
        );

        let zero = vec![vec![0.0, 1.0], vec![0.0, 2.0]];
        assert_eq!(
            normalization_factors(&zero),
            Err(RegressionError::ZeroColumn(0))
        );
    }

    #[test]
    fn test_loss_with_zero_weights() {
        // Slide example: with w = 0 the loss is the mean of y^2.
        let rows = vec![vec![0.0, 1.0], vec![1.0, 2.0]];
        assert_eq!(loss(&[0.0, 0.0], &rows), Ok(2.5));
    }

    #[test]
    fn test_loss_zero_for_exact_fit() {
        let rows = vec![vec![0.0, 1.0], vec![1.0, 2.0]];
        assert_eq!(loss(&[1.0, 1.0], &rows), Ok(0.0));
    }

    #[test]
    fn test_loss_decreases_each_step() {
        let factors = normalization_factors(&SIMPLE_DATA).unwrap();
        let rows = normalize_columns(&SIMPLE_DATA, &factors);

        let mut weights = vec![0.0, 0.0];
        let mut previous = loss(&weights, &rows).unwrap();
        for _ in 0..200 {
            weights = step(&weights, &rows, DEFAULT_LEARNING_RATE).unwrap();
            let current = loss(&weights, &rows).unwrap();
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_recovers_exact_line() {
        // y = 1 + 2x
        let rows = vec![
            vec![0.0, 1.0],
            vec![1.0, 3.0],
            vec![2.0, 5.0],
            vec![3.0, 7.0],
        ];
        let model = train(
            &rows,
            TrainConfig {
                learning_rate: 0.5,
                iterations: 5_000,
            },
        )
        .unwrap();

        assert!(model.loss < 1e-10);
        let prediction = model.predict(&[4.0]).unwrap();
        assert!((prediction - 9.0).abs() < 1e-3);

        let (intercept, slope) = model.line().unwrap();
        assert!((intercept - 1.0).abs() < 1e-3);
        assert!((slope - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_housing_demo_improves_on_zero_weights() {
        let model = train(&HOUSING_DATA, TrainConfig::default()).unwrap();
        let factors = normalization_factors(&HOUSING_DATA).unwrap();
        let initial = loss(&[0.0; 5], &normalize_columns(&HOUSING_DATA, &factors)).unwrap();

        assert!(model.loss < initial);
        assert_eq!(model.iterations, DEFAULT_ITERATIONS);
        assert!(model.line().is_none());

        let price = model.predict(&[3000.0, 2.0, 1.0, 20.0]).unwrap();
        assert!(price.is_finite() && price > 0.0);
    }

    #[test]
    fn test_predict_wrong_width() {
        let model = train(&SIMPLE_DATA, TrainConfig::default()).unwrap();
        assert_eq!(
            model.predict(&[1.0, 2.0]),
            Err(RegressionError::FeatureWidth {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_loss_and_step_reject_bad_shapes() {
        let no_columns = vec![Vec::<f64>::new()];
        assert_eq!(
            loss(&[0.0, 0.0], &no_columns),
            Err(RegressionError::TooFewColumns(0))
        );

        let empty: Vec<Vec<f64>> = vec![];
        assert_eq!(
            step(&[0.0, 0.0], &empty, DEFAULT_LEARNING_RATE),
            Err(RegressionError::EmptyData)
        );

        let ragged = vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]];
        assert!(matches!(
            step(&[0.0, 0.0], &ragged, DEFAULT_LEARNING_RATE),
            Err(RegressionError::RaggedRow { row: 1, .. })
        ));

        assert_eq!(
            loss(&[0.0], &SIMPLE_DATA),
            Err(RegressionError::WeightWidth {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_malformed_model() {
        let model = Model {
            weights: vec![],
            factors: vec![],
            loss: 0.0,
            iterations: 0,
        };
        assert_eq!(model.features(), 0);
        assert_eq!(model.line(), None);
        assert_eq!(
            model.predict(&[]),
            Err(RegressionError::WeightWidth {
                expected: 1,
                found: 0
            })
        );
    }
}

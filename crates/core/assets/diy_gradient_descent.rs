// Linear regression from scratch: house prices by batch gradient descent.

/// Squared error of one row. The last column is the label.
fn row_loss(weights: &[f64], row: &[f64]) -> f64 {
    let (features, label) = row.split_at(row.len() - 1);
    let guess = weights[0]
        + weights[1..]
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>();
    (label[0] - guess).powi(2)
}

/// Mean squared error over all rows.
fn loss(weights: &[f64], rows: &[Vec<f64>]) -> f64 {
    rows.iter().map(|r| row_loss(weights, r)).sum::<f64>() / rows.len() as f64
}

/// Move every weight a little way down the slope of the loss.
///
/// d loss / d w_i = -2 * mean(error * x_i), with x_0 = 1. The constant
/// factor is folded into the learning rate.
fn update(weights: &[f64], rows: &[Vec<f64>], learning_rate: f64) -> Vec<f64> {
    let n = rows.len() as f64;
    let mut gradient = vec![0.0; weights.len()];

    for row in rows {
        let (features, label) = row.split_at(row.len() - 1);
        let guess = weights[0]
            + weights[1..]
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let error = label[0] - guess;

        gradient[0] += error;
        for (g, x) in gradient[1..].iter_mut().zip(features) {
            *g += error * x;
        }
    }

    weights
        .iter()
        .zip(gradient)
        .map(|(w, g)| w + learning_rate * g / n)
        .collect()
}

/// Largest value in each column, used to bring everything to unit scale.
fn normalization_factors(rows: &[Vec<f64>]) -> Vec<f64> {
    (0..rows[0].len())
        .map(|col| rows.iter().map(|r| r[col]).fold(0.0, f64::max))
        .collect()
}

/// Divide each column by its factor.
fn normalize(rows: &[Vec<f64>], factors: &[f64]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|r| r.iter().zip(factors).map(|(x, f)| x / f).collect())
        .collect()
}

/// Apply the weights to normalized features.
fn predict(weights: &[f64], features: &[f64]) -> f64 {
    weights[0]
        + weights[1..]
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
}

fn main() {
    // sqft, bedrooms, bathrooms, viewings, price
    let train = vec![
        vec![2104.0, 5.0, 1.0, 45.0, 460.0],
        vec![1416.0, 3.0, 2.0, 40.0, 232.0],
        vec![1534.0, 3.0, 2.0, 30.0, 315.0],
        vec![852.0, 2.0, 1.0, 36.0, 178.0],
    ];
    let factors = normalization_factors(&train);
    let train = normalize(&train, &factors);

    let mut weights = vec![0.0; train[0].len()];
    for it in 1..=10_000 {
        weights = update(&weights, &train, 0.01);
        if it % 1_000 == 0 {
            println!("Iteration {}, loss {:.6}, weights {:?}", it, loss(&weights, &train), weights);
        }
    }

    let house = normalize(&[vec![3000.0, 2.0, 1.0, 20.0]], &factors);
    let price = predict(&weights, &house[0]) * factors[factors.len() - 1];
    println!("Predicted price for {:?}: {:.1}", house[0], price);
}

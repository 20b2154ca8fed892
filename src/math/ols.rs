//! Ordinary least squares for a single regressor.
//!
//! Every strategy in this crate reduces to fitting a straight line:
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! The closed form is small enough that we compute it directly from centered
//! sums instead of pulling in a linear-algebra crate:
//!
//! - `b = Σ(x_i - x̄)(y_i - ȳ) / Σ(x_i - x̄)^2`
//! - `a = ȳ - b x̄`
//!
//! Centering first keeps the sums well conditioned when x is large (e.g. month
//! counts since 1970).

use crate::domain::FittedLine;

/// Number of decimal places kept in every published prediction.
pub const PREDICTION_DECIMALS: i32 = 4;

/// Fit `y = intercept + slope * x` over `(x, y)` points.
///
/// Degenerate inputs never fail:
/// - all x identical (zero variance): `slope = 0`, `intercept = ȳ`
/// - a single point: same as above
/// - no points: the zero line
pub fn fit_line(points: &[(f64, f64)]) -> FittedLine {
    if points.is_empty() {
        return FittedLine {
            slope: 0.0,
            intercept: 0.0,
        };
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for &(x, y) in points {
        let dx = x - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }

    let slope = if den == 0.0 { 0.0 } else { num / den };
    let intercept = mean_y - slope * mean_x;

    FittedLine { slope, intercept }
}

/// Fit against the implicit index axis `0, 1, 2, ...`.
pub fn fit_indexed(values: &[f64]) -> FittedLine {
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (i as f64, y))
        .collect();
    fit_line(&points)
}

/// Round to `PREDICTION_DECIMALS` places so repeated runs print identical digits.
pub fn round_prediction(value: f64) -> f64 {
    let scale = 10f64.powi(PREDICTION_DECIMALS);
    let rounded = (value * scale).round() / scale;
    // Avoid publishing "-0.0000".
    if rounded == 0.0 { 0.0 } else { rounded }
}

//! Closed-form ordinary least squares for a single regressor.

use crate::utils::metrics::r_squared;

/// Fitted line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// In-sample coefficient of determination.
    pub r_squared: f64,
    /// Number of points used.
    pub n: usize,
    /// Fewer than two points, or every x identical.
    pub degenerate: bool,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = m·x + b` by ordinary least squares.
///
/// With fewer than two points the fit is flat (`m = 0`, `b = 0`). A zero
/// denominator `n·Σx² − (Σx)²` is replaced by 1 so the result stays finite;
/// both cases are reported through [`LinearFit::degenerate`].
pub fn linear_regression(x: &[f64], y: &[f64]) -> LinearFit {
    let n = x.len().min(y.len());
    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
            n,
            degenerate: true,
        };
    }

    let nf = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for i in 0..n {
        sum_x += x[i];
        sum_y += y[i];
        sum_xy += x[i] * y[i];
        sum_xx += x[i] * x[i];
    }

    let mut denominator = nf * sum_xx - sum_x * sum_x;
    let degenerate = denominator == 0.0;
    if degenerate {
        denominator = 1.0;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;

    let fitted: Vec<f64> = x[..n].iter().map(|&xi| slope * xi + intercept).collect();

    LinearFit {
        slope,
        intercept,
        r_squared: r_squared(&y[..n], &fitted),
        n,
        degenerate,
    }
}

/// Regression of `values` against their index `0, 1, 2, …`.
pub fn linear_trend(values: &[f64]) -> LinearFit {
    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    linear_regression(&x, values)
}

/// Residuals `y − (m·x + b)` of a trend fit against the index.
pub fn detrend(values: &[f64]) -> Vec<f64> {
    let fit = linear_trend(values);
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v - fit.predict(i as f64))
        .collect()
}

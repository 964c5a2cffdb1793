//! Accuracy metrics for forecast evaluation.

use crate::error::{EngineError, Result};

/// Floor for the residual sum of squares in the likelihood surrogate, so
/// perfect fits keep a finite AIC/BIC.
const MIN_SSE: f64 = 1e-12;

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals (None if all zero)
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// Pairs where either side is NaN are skipped (e.g. the first fitted value
/// of a naive model).
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.len() != predicted.len() {
        return Err(EngineError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let (actual, predicted): (Vec<f64>, Vec<f64>) = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, p)| !a.is_nan() && !p.is_nan())
        .map(|(&a, &p)| (a, p))
        .unzip();

    if actual.is_empty() {
        return Err(EngineError::EmptyData);
    }

    let mse = mse(&actual, &predicted);

    Ok(AccuracyMetrics {
        mae: mae(&actual, &predicted),
        mse,
        rmse: mse.sqrt(),
        mape: mape(&actual, &predicted),
        smape: smape(&actual, &predicted),
        r_squared: r_squared(&actual, &predicted),
    })
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// MAPE in percent, averaged over the points with a non-zero actual.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() != predicted.len() {
        return None;
    }
    let terms: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs())
        .collect();
    if terms.is_empty() {
        return None;
    }
    Some(100.0 * terms.iter().sum::<f64>() / terms.len() as f64)
}

/// Calculate SMAPE between two slices (0–200).
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / n
}

/// Coefficient of determination.
///
/// A constant actual series (`ssTot == 0`) gives 1; any non-finite result
/// is clamped to 0.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return 0.0;
    }
    let n = actual.len() as f64;
    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let r2 = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };
    if r2.is_finite() {
        r2
    } else {
        0.0
    }
}

/// Gaussian AIC/BIC surrogate from residuals.
///
/// `AIC = n·ln(SSE/n) + 2k`, `BIC = n·ln(SSE/n) + k·ln(n)`. NaN residuals
/// are ignored. Returns infinities when no residual is usable.
pub fn information_criteria(residuals: &[f64], parameters: usize) -> (f64, f64) {
    let valid: Vec<f64> = residuals.iter().copied().filter(|r| r.is_finite()).collect();
    if valid.is_empty() {
        return (f64::INFINITY, f64::INFINITY);
    }
    let n = valid.len() as f64;
    let sse = valid.iter().map(|r| r * r).sum::<f64>().max(MIN_SSE);
    let log_lik_term = n * (sse / n).ln();
    let k = parameters as f64;
    (log_lik_term + 2.0 * k, log_lik_term + k * n.ln())
}

/// Share of points whose predicted direction of change matches the actual
/// one, both measured from the previous actual value.
///
/// Equal signs agree, including "no change" on both sides.
pub fn directional_accuracy(previous: &[f64], actual: &[f64], predicted: &[f64]) -> f64 {
    let n = previous.len().min(actual.len()).min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let hits = (0..n)
        .filter(|&i| {
            direction(actual[i] - previous[i]) == direction(predicted[i] - previous[i])
        })
        .count();
    hits as f64 / n as f64
}

fn direction(delta: f64) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

/// Fraction of actuals inside `[lower, upper]`.
pub fn interval_coverage(actual: &[f64], lower: &[f64], upper: &[f64]) -> f64 {
    let n = actual.len().min(lower.len()).min(upper.len());
    if n == 0 {
        return 0.0;
    }
    let inside = (0..n)
        .filter(|&i| actual[i] >= lower[i] && actual[i] <= upper[i])
        .count();
    inside as f64 / n as f64
}

/// Mean of `upper - lower`.
pub fn average_interval_width(lower: &[f64], upper: &[f64]) -> f64 {
    let n = lower.len().min(upper.len());
    if n == 0 {
        return 0.0;
    }
    (0..n).map(|i| upper[i] - lower[i]).sum::<f64>() / n as f64
}

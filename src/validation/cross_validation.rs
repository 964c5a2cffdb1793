//! Rolling-origin cross-validation for time series forecasting.

use crate::core::TimeSeries;
use crate::error::{EngineError, Result};
use crate::models::Forecaster;
use crate::utils::metrics::rmse;
use crate::utils::stats;
use crate::validation::CancellationToken;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cross-validation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvStrategy {
    /// Training window grows from the start of the series.
    #[default]
    Expanding,
    /// Training window keeps `min_train_size` points and slides forward.
    Rolling,
}

/// Configuration for time series cross-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvConfig {
    /// Size of the first training window.
    pub min_train_size: usize,
    /// Points forecast and scored per fold.
    pub test_size: usize,
    /// Step between fold origins.
    pub step_size: usize,
    /// Upper bound on the number of folds.
    pub max_iterations: Option<usize>,
    pub strategy: CvStrategy,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            min_train_size: 10,
            test_size: 1,
            step_size: 1,
            max_iterations: None,
            strategy: CvStrategy::Expanding,
        }
    }
}

impl CvConfig {
    /// Expanding window starting at `min_train_size`.
    pub fn expanding(min_train_size: usize, test_size: usize) -> Self {
        Self {
            min_train_size,
            test_size,
            ..Default::default()
        }
    }

    /// Fixed-size sliding window.
    pub fn rolling(window: usize, test_size: usize) -> Self {
        Self {
            min_train_size: window,
            test_size,
            strategy: CvStrategy::Rolling,
            ..Default::default()
        }
    }

    pub fn with_step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_train_size == 0 {
            return Err(EngineError::InvalidParameter(
                "min_train_size must be positive".to_string(),
            ));
        }
        if self.test_size == 0 {
            return Err(EngineError::InvalidParameter(
                "test_size must be positive".to_string(),
            ));
        }
        if self.step_size == 0 {
            return Err(EngineError::InvalidParameter(
                "step_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Train ranges `[start, origin)` for a series of length `n`; the test
    /// range of each fold is `[origin, origin + test_size)`.
    pub fn splits(&self, n: usize) -> Vec<(usize, usize)> {
        let mut splits = Vec::new();
        if self.step_size == 0 || self.test_size == 0 {
            return splits;
        }
        let mut origin = self.min_train_size;
        while origin + self.test_size <= n {
            if self.max_iterations.is_some_and(|max| splits.len() >= max) {
                break;
            }
            let start = match self.strategy {
                CvStrategy::Expanding => 0,
                CvStrategy::Rolling => origin.saturating_sub(self.min_train_size),
            };
            splits.push((start, origin));
            origin += self.step_size;
        }
        splits
    }
}

/// Outcome of [`cross_validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationResult {
    /// RMSE per fold in fold order; failed folds are `f64::INFINITY`.
    pub fold_scores: Vec<f64>,
    /// The finite subset of `fold_scores`.
    pub valid_scores: Vec<f64>,
    /// Mean of the valid scores.
    pub mean: f64,
    /// Sample standard deviation of the valid scores.
    pub std: f64,
    pub folds: usize,
    pub failed_folds: usize,
}

/// Fit on `train`, forecast `actual.len()` steps and score by RMSE.
///
/// Errors and non-finite output both count as a failed fold.
pub(crate) fn score_fold<F: Forecaster>(model: &mut F, train: &TimeSeries, actual: &[f64]) -> Result<f64> {
    model.fit(train)?;
    let projection = model.predict(actual.len())?;
    if projection.horizon() != actual.len() {
        return Err(EngineError::DimensionMismatch {
            expected: actual.len(),
            got: projection.horizon(),
        });
    }
    let score = rmse(actual, projection.point());
    if score.is_finite() {
        Ok(score)
    } else {
        Err(EngineError::Computation(format!(
            "{} produced a non-finite forecast",
            model.name()
        )))
    }
}

/// Perform rolling-origin cross-validation.
///
/// A fresh model from `model_factory` is fitted per fold. Failed folds
/// score `f64::INFINITY` and are excluded from the mean and std.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::Naive;
/// use insight_forecast::validation::{cross_validate, CancellationToken, CvConfig};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
/// let ts = TimeSeries::daily(start, &values);
///
/// let config = CvConfig::expanding(10, 1).with_step_size(2);
/// let result = cross_validate(&ts, Naive::new, &config, &CancellationToken::new()).unwrap();
/// assert_eq!(result.folds, 5);
/// assert!((result.mean - 1.0).abs() < 1e-12);
/// ```
pub fn cross_validate<F, Factory>(
    series: &TimeSeries,
    model_factory: Factory,
    config: &CvConfig,
    token: &CancellationToken,
) -> Result<CrossValidationResult>
where
    F: Forecaster,
    Factory: Fn() -> F,
{
    config.validate()?;
    let splits = config.splits(series.len());
    if splits.is_empty() {
        return Err(EngineError::InsufficientData {
            needed: config.min_train_size + config.test_size,
            got: series.len(),
        });
    }

    let values = series.values();
    let mut fold_scores = Vec::with_capacity(splits.len());
    for (fold, &(start, origin)) in splits.iter().enumerate() {
        token.check()?;
        let train = series.slice(start, origin)?;
        let actual = &values[origin..origin + config.test_size];

        let mut model = model_factory();
        match score_fold(&mut model, &train, actual) {
            Ok(score) => fold_scores.push(score),
            Err(err) => {
                warn!(fold, origin, error = %err, "cross-validation fold failed");
                fold_scores.push(f64::INFINITY);
            }
        }
    }

    let valid_scores: Vec<f64> = fold_scores.iter().copied().filter(|s| s.is_finite()).collect();
    let failed_folds = fold_scores.len() - valid_scores.len();
    if valid_scores.is_empty() {
        return Err(EngineError::InsufficientData { needed: 1, got: 0 });
    }

    let mean = stats::mean(&valid_scores);
    let std = if valid_scores.len() < 2 {
        0.0
    } else {
        stats::std_dev(&valid_scores)
    };
    debug!(folds = fold_scores.len(), failed_folds, mean, "cross-validation finished");

    Ok(CrossValidationResult {
        folds: fold_scores.len(),
        fold_scores,
        valid_scores,
        mean,
        std,
        failed_folds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ModelKind, Projection};
    use crate::models::{Naive, SimpleMovingAverage};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn linear_series(n: usize) -> TimeSeries {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        TimeSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &values)
    }

    /// Fails whenever the training window has an odd length.
    #[derive(Default)]
    struct OddFails {
        last: Option<f64>,
        fitted: Option<Vec<f64>>,
    }

    impl Forecaster for OddFails {
        fn fit(&mut self, series: &TimeSeries) -> Result<()> {
            if series.len() % 2 == 1 {
                return Err(EngineError::Computation("odd".to_string()));
            }
            self.last = series.last_value();
            self.fitted = Some(series.values());
            Ok(())
        }

        fn predict(&self, horizon: usize) -> Result<Projection> {
            let last = self.last.ok_or(EngineError::FitRequired)?;
            Ok(Projection::from_values(vec![last; horizon]))
        }

        fn fitted_values(&self) -> Option<&[f64]> {
            self.fitted.as_deref()
        }

        fn residuals(&self) -> Option<&[f64]> {
            None
        }

        fn kind(&self) -> ModelKind {
            ModelKind::Naive
        }

        fn name(&self) -> &str {
            "OddFails"
        }
    }

    #[test]
    fn expanding_window_fold_count() {
        let result = cross_validate(
            &linear_series(20),
            Naive::new,
            &CvConfig::expanding(10, 1),
            &CancellationToken::new(),
        )
        .unwrap();
        // origins 10..=19
        assert_eq!(result.folds, 10);
        assert_relative_eq!(result.mean, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.std, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rolling_window_slides() {
        let config = CvConfig::rolling(5, 2).with_step_size(5);
        assert_eq!(config.splits(20), vec![(0, 5), (5, 10), (10, 15)]);
    }

    #[test]
    fn max_iterations_bounds_folds() {
        let config = CvConfig::expanding(5, 1).with_max_iterations(3);
        assert_eq!(config.splits(100).len(), 3);
    }

    #[test]
    fn failed_folds_are_infinite_and_excluded() {
        let result = cross_validate(
            &linear_series(16),
            OddFails::default,
            &CvConfig::expanding(10, 2),
            &CancellationToken::new(),
        )
        .unwrap();
        // origins 10..=14: odd ones fail
        assert_eq!(result.folds, 5);
        assert_eq!(result.failed_folds, 2);
        assert!(result.fold_scores[1].is_infinite());
        assert_eq!(result.valid_scores.len(), 3);
        let expected = result.valid_scores.iter().sum::<f64>() / 3.0;
        assert_relative_eq!(result.mean, expected, epsilon = 1e-12);
        assert!(result.mean.is_finite());
    }

    #[test]
    fn all_folds_failing_is_insufficient_data() {
        let result = cross_validate(
            &linear_series(12),
            || SimpleMovingAverage::new(50),
            &CvConfig::expanding(5, 1),
            &CancellationToken::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InsufficientData { needed: 1, got: 0 })
        ));
    }

    #[test]
    fn too_short_for_any_fold() {
        let result = cross_validate(
            &linear_series(5),
            Naive::new,
            &CvConfig::expanding(10, 1),
            &CancellationToken::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InsufficientData { needed: 11, got: 5 })
        ));
    }

    #[test]
    fn cancelled_before_first_fold() {
        let token = CancellationToken::new();
        token.cancel();
        let result = cross_validate(&linear_series(20), Naive::new, &CvConfig::default(), &token);
        assert_eq!(result, Err(EngineError::Cancelled));
    }

    #[test]
    fn zero_step_is_rejected() {
        let config = CvConfig::default().with_step_size(0);
        assert!(matches!(config.validate(), Err(EngineError::InvalidParameter(_))));
    }
}

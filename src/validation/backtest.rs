//! Expanding-window backtest over a held-out tail.

use crate::core::{Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::linear::FALLBACK_BAND;
use crate::models::Forecaster;
use crate::utils::metrics::{
    average_interval_width, directional_accuracy, interval_coverage, mae, mape, rmse, smape,
};
use crate::validation::CancellationToken;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for [`backtest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Trailing points held out for testing.
    pub test_size: usize,
    /// Steps forecast per window; the model is retrained this often.
    pub horizon: usize,
    /// Upper bound on the number of windows.
    pub max_windows: Option<usize>,
    /// Prediction interval level.
    pub level: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            test_size: 14,
            horizon: 7,
            max_windows: None,
            level: 0.95,
        }
    }
}

impl BacktestConfig {
    pub fn new(test_size: usize, horizon: usize) -> Self {
        Self {
            test_size,
            horizon,
            ..Default::default()
        }
    }

    pub fn with_max_windows(mut self, max_windows: usize) -> Self {
        self.max_windows = Some(max_windows);
        self
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.test_size == 0 || self.horizon == 0 {
            return Err(EngineError::InvalidParameter(
                "backtest test_size and horizon must be positive".to_string(),
            ));
        }
        if !(self.level > 0.0 && self.level < 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {}",
                self.level
            )));
        }
        Ok(())
    }
}

/// Stitched out-of-sample predictions and their accuracy.
///
/// Directional accuracy and coverage are percentages (0–100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub dates: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    /// `actual - predicted` per point.
    pub errors: Vec<f64>,
    pub mae: f64,
    pub rmse: f64,
    pub mape: Option<f64>,
    pub smape: f64,
    pub directional_accuracy: f64,
    pub coverage: f64,
    pub average_interval_width: f64,
    pub windows: usize,
    /// Windows where the model failed and the naive fallback was used.
    pub fallback_windows: usize,
}

impl BacktestResult {
    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Fit, forecast `horizon` steps with intervals, and check the output.
fn window_projection<F: Forecaster>(
    model: &mut F,
    train: &TimeSeries,
    horizon: usize,
    level: f64,
) -> Result<Projection> {
    model.fit(train)?;
    let projection = model.predict_with_intervals(horizon, level)?;
    if projection.horizon() != horizon {
        return Err(EngineError::DimensionMismatch {
            expected: horizon,
            got: projection.horizon(),
        });
    }
    if !projection.is_finite() {
        return Err(EngineError::Computation(format!(
            "{} produced a non-finite forecast",
            model.name()
        )));
    }
    if projection.has_intervals() {
        Ok(projection)
    } else {
        Ok(Projection::with_relative_band(
            projection.point().to_vec(),
            FALLBACK_BAND,
        ))
    }
}

/// Repeat the last training value with the ±15% band.
fn naive_fallback(train: &TimeSeries, horizon: usize) -> Projection {
    let last = train.last_value().unwrap_or(0.0);
    Projection::with_relative_band(vec![last; horizon], FALLBACK_BAND)
}

/// Backtest a model over the trailing `test_size` points.
///
/// Starting at `n - test_size`, each window trains a fresh model on all
/// data before it, forecasts up to `horizon` steps and moves on by
/// `horizon`. A window whose model fails falls back to repeating the last
/// training value.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::LinearTrend;
/// use insight_forecast::validation::{backtest, BacktestConfig, CancellationToken};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
/// let ts = TimeSeries::daily(start, &values);
///
/// let result = backtest(&ts, LinearTrend::new, &BacktestConfig::new(10, 5), &CancellationToken::new())
///     .unwrap();
/// assert_eq!(result.windows, 2);
/// assert_eq!(result.directional_accuracy, 100.0);
/// ```
pub fn backtest<F, Factory>(
    series: &TimeSeries,
    model_factory: Factory,
    config: &BacktestConfig,
    token: &CancellationToken,
) -> Result<BacktestResult>
where
    F: Forecaster,
    Factory: Fn() -> F,
{
    config.validate()?;
    let n = series.len();
    if n <= config.test_size {
        return Err(EngineError::InsufficientData {
            needed: config.test_size + 1,
            got: n,
        });
    }

    let values = series.values();
    let dates = series.dates();
    let test_start = n - config.test_size;

    let mut result = BacktestResult {
        dates: Vec::with_capacity(config.test_size),
        actual: Vec::with_capacity(config.test_size),
        predicted: Vec::with_capacity(config.test_size),
        lower: Vec::with_capacity(config.test_size),
        upper: Vec::with_capacity(config.test_size),
        errors: Vec::with_capacity(config.test_size),
        mae: 0.0,
        rmse: 0.0,
        mape: None,
        smape: 0.0,
        directional_accuracy: 0.0,
        coverage: 0.0,
        average_interval_width: 0.0,
        windows: 0,
        fallback_windows: 0,
    };
    let mut previous = Vec::with_capacity(config.test_size);

    let mut origin = test_start;
    while origin < n {
        if config.max_windows.is_some_and(|max| result.windows >= max) {
            break;
        }
        token.check()?;

        let steps = config.horizon.min(n - origin);
        let train = series.slice(0, origin)?;
        let mut model = model_factory();
        let projection = match window_projection(&mut model, &train, steps, config.level) {
            Ok(projection) => projection,
            Err(err) => {
                warn!(origin, error = %err, "backtest window failed, using naive fallback");
                result.fallback_windows += 1;
                naive_fallback(&train, steps)
            }
        };

        let point = projection.point();
        let lower = projection.lower().unwrap_or(point);
        let upper = projection.upper().unwrap_or(point);
        for i in 0..steps {
            let t = origin + i;
            result.dates.push(dates[t]);
            result.actual.push(values[t]);
            result.predicted.push(point[i]);
            result.lower.push(lower[i].min(upper[i]));
            result.upper.push(upper[i].max(lower[i]));
            result.errors.push(values[t] - point[i]);
            previous.push(values[t - 1]);
        }

        result.windows += 1;
        origin += steps;
    }

    result.mae = mae(&result.actual, &result.predicted);
    result.rmse = rmse(&result.actual, &result.predicted);
    result.mape = mape(&result.actual, &result.predicted);
    result.smape = smape(&result.actual, &result.predicted);
    result.directional_accuracy =
        100.0 * directional_accuracy(&previous, &result.actual, &result.predicted);
    result.coverage = 100.0 * interval_coverage(&result.actual, &result.lower, &result.upper);
    result.average_interval_width = average_interval_width(&result.lower, &result.upper);

    debug!(
        windows = result.windows,
        fallback_windows = result.fallback_windows,
        rmse = result.rmse,
        "backtest finished"
    );
    Ok(result)
}

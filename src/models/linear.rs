//! Linear trend forecaster.
//!
//! Ordinary least squares over the observation index. Intervals use the
//! residual standard error widened by `√(1 + h/n)`; when the residuals
//! carry no spread the forecast gets a ±15% band instead.

use crate::core::{ModelKind, Projection, Record, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::Forecaster;
use crate::utils::ols::{linear_regression, linear_trend, LinearFit};
use crate::utils::stats::z_for_level;
use std::collections::BTreeMap;

/// Band used when no residual spread is available.
pub const FALLBACK_BAND: f64 = 0.15;

/// Residual spread below this is treated as an exact fit.
const MIN_SIGMA: f64 = 1e-9;

/// Linear trend `y = slope·t + intercept` over index `t = 0..n`.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::{Forecaster, LinearTrend};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let ts = TimeSeries::daily(start, &[7.0, 10.0, 13.0, 16.0]);
///
/// let mut model = LinearTrend::new();
/// model.fit(&ts).unwrap();
/// let forecast = model.predict(2).unwrap();
/// assert!((forecast.point()[0] - 19.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearTrend {
    fit: Option<LinearFit>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    /// Residual standard error with `n - 2` degrees of freedom.
    sigma: f64,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fitted line, if any.
    pub fn line(&self) -> Option<&LinearFit> {
        self.fit.as_ref()
    }

    /// Fit against an explicit regressor instead of the index.
    ///
    /// Pairs where either side is non-finite are dropped.
    pub fn fit_xy(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(EngineError::DimensionMismatch {
                expected: y.len(),
                got: x.len(),
            });
        }
        let (x, y): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y)
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(&a, &b)| (a, b))
            .unzip();
        if y.is_empty() {
            return Err(EngineError::EmptyData);
        }
        let fit = linear_regression(&x, &y);
        self.store(fit, &x, &y);
        Ok(())
    }

    /// Evaluate the fitted line at arbitrary regressor values.
    pub fn predict_at(&self, x: &[f64]) -> Result<Vec<f64>> {
        let fit = self.fit.ok_or(EngineError::FitRequired)?;
        Ok(x.iter().map(|&xi| fit.predict(xi)).collect())
    }

    fn store(&mut self, fit: LinearFit, x: &[f64], y: &[f64]) {
        let fitted: Vec<f64> = x.iter().map(|&xi| fit.predict(xi)).collect();
        let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, f)| a - f).collect();

        let n = residuals.len();
        self.sigma = if n > 2 {
            (residuals.iter().map(|r| r * r).sum::<f64>() / (n - 2) as f64).sqrt()
        } else {
            0.0
        };
        self.fit = Some(fit);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
    }
}

impl Forecaster for LinearTrend {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if values.is_empty() {
            return Err(EngineError::EmptyData);
        }
        let fit = linear_trend(&values);
        let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        self.store(fit, &x, &values);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let fit = self.fit.ok_or(EngineError::FitRequired)?;
        let n = fit.n as f64;
        let predictions = (0..horizon).map(|h| fit.predict(n + h as f64)).collect();
        Ok(Projection::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        let fit = self.fit.ok_or(EngineError::FitRequired)?;
        let point = self.predict(horizon)?.point().to_vec();

        if self.sigma <= MIN_SIGMA || fit.n <= 2 {
            return Ok(Projection::with_relative_band(point, FALLBACK_BAND));
        }

        let z = z_for_level(level);
        let n = fit.n as f64;
        let (lower, upper) = point
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let h = (i + 1) as f64;
                let half = z * self.sigma * (1.0 + h / n).sqrt();
                (p - half, p + half)
            })
            .unzip();
        Projection::with_intervals(point, lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LinearTrend
    }

    fn name(&self) -> &str {
        "LinearTrend"
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        let mut params = BTreeMap::new();
        if let Some(fit) = &self.fit {
            params.insert("slope".to_string(), fit.slope);
            params.insert("intercept".to_string(), fit.intercept);
            params.insert("r_squared".to_string(), fit.r_squared);
        }
        params
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn low_confidence(&self) -> bool {
        self.fit.map_or(true, |f| f.degenerate)
    }
}

/// OLS of `y_key` on `x_key` over the rows where both are numeric.
pub fn regress_records(records: &[Record], x_key: &str, y_key: &str) -> LinearFit {
    let (x, y): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| Some((r.number(x_key)?, r.number(y_key)?)))
        .unzip();
    linear_regression(&x, &y)
}

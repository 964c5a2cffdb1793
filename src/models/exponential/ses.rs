//! Simple Exponential Smoothing (SES) forecasting model.
//!
//! SES is suitable for forecasting data with no clear trend or seasonality.

use crate::core::{ModelKind, Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::{residual_sigma, Forecaster};
use crate::utils::stats::z_for_level;
use std::collections::BTreeMap;

const ALPHA_MIN: f64 = 0.0001;
const ALPHA_MAX: f64 = 0.9999;

/// Simple Exponential Smoothing forecaster.
///
/// The model equation is:
/// `level_t = α × y_t + (1-α) × level_{t-1}`
///
/// where α (alpha) is the smoothing parameter (0 < α < 1).
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::{Forecaster, SimpleExponentialSmoothing};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values = [10.0, 12.0, 11.0, 13.0, 12.0, 14.0, 13.0, 15.0, 14.0, 16.0];
/// let ts = TimeSeries::daily(start, &values);
///
/// let mut model = SimpleExponentialSmoothing::new(0.3);
/// model.fit(&ts).unwrap();
///
/// let forecast = model.predict(3).unwrap();
/// assert_eq!(forecast.horizon(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleExponentialSmoothing {
    alpha: Option<f64>,
    /// Pick alpha by grid search on one-step SSE.
    optimize: bool,
    level: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SimpleExponentialSmoothing {
    /// Create a new SES model with a fixed smoothing parameter.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha.clamp(ALPHA_MIN, ALPHA_MAX)),
            optimize: false,
            level: None,
            fitted: None,
            residuals: None,
        }
    }

    /// Create a new SES model with automatic alpha selection.
    pub fn auto() -> Self {
        Self {
            alpha: None,
            optimize: true,
            level: None,
            fitted: None,
            residuals: None,
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    fn calculate_sse(values: &[f64], alpha: f64) -> f64 {
        let Some((&first, rest)) = values.split_first() else {
            return f64::MAX;
        };
        let mut level = first;
        let mut sse = 0.0;
        for &y in rest {
            let error = y - level;
            sse += error * error;
            level = alpha * y + (1.0 - alpha) * level;
        }
        sse
    }

    /// Coarse-to-fine grid search over alpha.
    fn optimize_alpha(values: &[f64]) -> f64 {
        let best_on = |candidates: &mut dyn Iterator<Item = f64>| {
            candidates
                .map(|a| (a, Self::calculate_sse(values, a)))
                .fold((0.5, f64::INFINITY), |best, (a, sse)| {
                    if sse < best.1 {
                        (a, sse)
                    } else {
                        best
                    }
                })
                .0
        };
        let coarse = best_on(&mut (1..20).map(|i| i as f64 * 0.05));
        let fine = best_on(&mut (-10..=10).map(|i| coarse + i as f64 * 0.005));
        fine.clamp(ALPHA_MIN, ALPHA_MAX)
    }
}

impl Default for SimpleExponentialSmoothing {
    fn default() -> Self {
        Self::auto()
    }
}

impl Forecaster for SimpleExponentialSmoothing {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let Some((&first, rest)) = values.split_first() else {
            return Err(EngineError::EmptyData);
        };

        if self.optimize {
            self.alpha = Some(Self::optimize_alpha(&values));
        }
        let alpha = self.alpha.ok_or(EngineError::FitRequired)?;

        let mut level = first;
        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());
        fitted.push(level);
        residuals.push(f64::NAN);

        for &y in rest {
            fitted.push(level);
            residuals.push(y - level);
            level = alpha * y + (1.0 - alpha) * level;
        }

        self.level = Some(level);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let level = self.level.ok_or(EngineError::FitRequired)?;
        Ok(Projection::from_values(vec![level; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        let current = self.level.ok_or(EngineError::FitRequired)?;
        let alpha = self.alpha.ok_or(EngineError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(EngineError::FitRequired)?;
        let Some(sigma) = residual_sigma(residuals) else {
            return self.predict(horizon);
        };

        let z = z_for_level(level);
        let (lower, upper) = (1..=horizon)
            .map(|h| {
                // Var(e_{n+h}) = σ²·(1 + (h-1)·α²)
                let se = sigma * (1.0 + (h - 1) as f64 * alpha * alpha).sqrt();
                (current - z * se, current + z * se)
            })
            .unzip();
        Projection::with_intervals(vec![current; horizon], lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::ExponentialSmoothing
    }

    fn name(&self) -> &str {
        "SES"
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        let mut params = BTreeMap::new();
        if let Some(alpha) = self.alpha {
            params.insert("alpha".to_string(), alpha);
        }
        if let Some(level) = self.level {
            params.insert("level".to_string(), level);
        }
        params
    }

    fn parameter_count(&self) -> usize {
        2
    }
}

//! Naive forecasting model.
//!
//! The naive method simply forecasts the last observed value for all future periods.

use crate::core::{ModelKind, Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::{residual_sigma, Forecaster};
use crate::utils::stats::z_for_level;

/// Naive forecaster that repeats the last value.
#[derive(Debug, Clone, Default)]
pub struct Naive {
    last_value: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Forecaster for Naive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let last = *values.last().ok_or(EngineError::EmptyData)?;
        self.last_value = Some(last);

        // y_hat[t] = y[t-1]
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(f64::NAN);
        fitted.extend_from_slice(&values[..values.len() - 1]);

        let residuals: Vec<f64> = values
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let last = self.last_value.ok_or(EngineError::FitRequired)?;
        Ok(Projection::from_values(vec![last; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        let last = self.last_value.ok_or(EngineError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(EngineError::FitRequired)?;

        let Some(sigma) = residual_sigma(residuals) else {
            return self.predict(horizon);
        };
        let z = z_for_level(level);

        let (lower, upper) = (1..=horizon)
            .map(|h| {
                // random walk variance grows linearly
                let se = sigma * (h as f64).sqrt();
                (last - z * se, last + z * se)
            })
            .unzip();
        Projection::with_intervals(vec![last; horizon], lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Naive
    }

    fn name(&self) -> &str {
        "Naive"
    }
}

//! Simple Moving Average forecaster.

use crate::core::{ModelKind, Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::{residual_sigma, Forecaster};
use crate::utils::stats::z_for_level;
use std::collections::BTreeMap;

/// Predicts future values as the mean of the last `window` observations.
/// If window is 0, uses the mean of all historical data.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
    name: String,
    last_mean: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SimpleMovingAverage {
    /// Create a new SMA with the given window size.
    /// Window of 0 means use the entire history.
    pub fn new(window: usize) -> Self {
        let name = if window == 0 {
            "SMA(all)".to_string()
        } else {
            format!("SMA({window})")
        };
        Self {
            window,
            name,
            last_mean: None,
            fitted: None,
            residuals: None,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Mean of up to `window` values ending before `end`.
    fn mean_before(&self, values: &[f64], end: usize) -> f64 {
        let width = if self.window == 0 || self.window > end {
            end
        } else {
            self.window
        };
        if width == 0 {
            return f64::NAN;
        }
        values[end - width..end].iter().sum::<f64>() / width as f64
    }
}

impl Default for SimpleMovingAverage {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Forecaster for SimpleMovingAverage {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if values.is_empty() {
            return Err(EngineError::EmptyData);
        }
        if self.window > 0 && values.len() < self.window {
            return Err(EngineError::InsufficientData {
                needed: self.window,
                got: values.len(),
            });
        }

        let n = values.len();
        self.last_mean = Some(self.mean_before(&values, n));

        let fitted: Vec<f64> = (0..n).map(|i| self.mean_before(&values, i)).collect();
        let residuals = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let mean = self.last_mean.ok_or(EngineError::FitRequired)?;
        Ok(Projection::from_values(vec![mean; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        let mean = self.last_mean.ok_or(EngineError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(EngineError::FitRequired)?;
        let Some(sigma) = residual_sigma(residuals) else {
            return self.predict(horizon);
        };

        let half = z_for_level(level) * sigma;
        Projection::with_intervals(
            vec![mean; horizon],
            vec![mean - half; horizon],
            vec![mean + half; horizon],
        )
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::MovingAverage
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([("window".to_string(), self.window as f64)])
    }
}

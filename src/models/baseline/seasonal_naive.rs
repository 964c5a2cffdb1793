//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same season in the previous cycle.

use crate::core::{ModelKind, Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::{residual_sigma, Forecaster};
use crate::utils::stats::z_for_level;
use std::collections::BTreeMap;

/// Each forecast equals the observation one seasonal period earlier.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    name: String,
    last_season: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SeasonalNaive {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("SeasonalNaive({period})"),
            last_season: None,
            fitted: None,
            residuals: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self::new(7)
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        if self.period == 0 {
            return Err(EngineError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        let values = series.values();
        if values.len() < self.period {
            return Err(EngineError::InsufficientData {
                needed: self.period,
                got: values.len(),
            });
        }

        let fitted: Vec<f64> = (0..values.len())
            .map(|i| {
                if i < self.period {
                    f64::NAN
                } else {
                    values[i - self.period]
                }
            })
            .collect();
        let residuals = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();

        self.last_season = Some(values[values.len() - self.period..].to_vec());
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let season = self.last_season.as_ref().ok_or(EngineError::FitRequired)?;
        let predictions = (0..horizon).map(|h| season[h % self.period]).collect();
        Ok(Projection::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        let point = self.predict(horizon)?.point().to_vec();
        let residuals = self.residuals.as_ref().ok_or(EngineError::FitRequired)?;
        let Some(sigma) = residual_sigma(residuals) else {
            return Ok(Projection::from_values(point));
        };

        let z = z_for_level(level);
        let (lower, upper) = point
            .iter()
            .enumerate()
            .map(|(h, &p)| {
                // number of full seasons reached
                let k = (h / self.period + 1) as f64;
                let se = sigma * k.sqrt();
                (p - z * se, p + z * se)
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
        ModelKind::SeasonalNaive
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([("period".to_string(), self.period as f64)])
    }
}

//! Degraded-mode baseline for series too short to fit.
//!
//! Projects the recent level forward with a small daily growth rate,
//! dampens weekends, and adds bounded multiplicative noise from a seeded
//! generator so the same seed always yields the same projection.

use crate::core::{ModelKind, Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::linear::FALLBACK_BAND;
use crate::models::Forecaster;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for [`SyntheticBaseline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub seed: u64,
    /// Compound growth per day.
    pub daily_growth: f64,
    /// Maximum relative noise, e.g. 0.05 for ±5%.
    pub noise: f64,
    /// Multiplier applied on Saturdays and Sundays.
    pub weekend_factor: f64,
    /// Level used when there is no history at all.
    pub default_level: f64,
    /// Number of trailing observations averaged into the level.
    pub recent_window: usize,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            daily_growth: 0.002,
            noise: 0.05,
            weekend_factor: 0.8,
            default_level: 100.0,
            recent_window: 7,
        }
    }
}

impl BaselineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_daily_growth(mut self, growth: f64) -> Self {
        self.daily_growth = growth;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_default_level(mut self, level: f64) -> Self {
        self.default_level = level;
        self
    }

    /// Reject values the projection cannot use.
    pub fn validate(&self) -> Result<()> {
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(EngineError::InvalidParameter(format!(
                "baseline noise must be finite and non-negative, got {}",
                self.noise
            )));
        }
        if !(self.daily_growth.is_finite() && self.daily_growth > -1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "baseline daily_growth must be finite and above -1, got {}",
                self.daily_growth
            )));
        }
        if !(self.weekend_factor.is_finite() && self.weekend_factor >= 0.0) {
            return Err(EngineError::InvalidParameter(format!(
                "baseline weekend_factor must be finite and non-negative, got {}",
                self.weekend_factor
            )));
        }
        if !self.default_level.is_finite() {
            return Err(EngineError::InvalidParameter(format!(
                "baseline default_level must be finite, got {}",
                self.default_level
            )));
        }
        Ok(())
    }
}

/// Synthetic projection used when real data cannot support a model.
#[derive(Debug, Clone)]
pub struct SyntheticBaseline {
    config: BaselineConfig,
    /// Date the projection continues from when the series is empty.
    origin: Option<NaiveDate>,
    level: Option<f64>,
    last_date: Option<NaiveDate>,
    step_days: i64,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SyntheticBaseline {
    pub fn new(config: BaselineConfig) -> Self {
        Self {
            config,
            origin: None,
            level: None,
            last_date: None,
            step_days: 1,
            fitted: None,
            residuals: None,
        }
    }

    pub fn with_origin(mut self, origin: NaiveDate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    fn weekday_factor(&self, date: NaiveDate) -> f64 {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => self.config.weekend_factor,
            _ => 1.0,
        }
    }
}

impl Default for SyntheticBaseline {
    fn default() -> Self {
        Self::new(BaselineConfig::default())
    }
}

impl Forecaster for SyntheticBaseline {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values: Vec<f64> = series
            .values()
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();

        let window = self.config.recent_window.max(1);
        let recent = &values[values.len().saturating_sub(window)..];
        let level = if recent.is_empty() {
            self.config.default_level
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        };

        self.level = Some(level);
        self.last_date = series.last_date().or(self.origin);
        self.step_days = series.step_days();
        self.fitted = Some(vec![level; values.len()]);
        self.residuals = Some(values.iter().map(|v| v - level).collect());
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let level = self.level.ok_or(EngineError::FitRequired)?;
        self.config.validate()?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let noise = self.config.noise.abs();

        let predictions = (1..=horizon)
            .map(|h| {
                let days = (self.step_days * h as i64) as f64;
                let trend = level * (1.0 + self.config.daily_growth).powf(days);
                let factor = self
                    .last_date
                    .map(|d| self.weekday_factor(d + Duration::days(self.step_days * h as i64)))
                    .unwrap_or(1.0);
                let jitter = if noise > 0.0 {
                    1.0 + rng.gen_range(-noise..=noise)
                } else {
                    1.0
                };
                (trend * factor * jitter).max(0.0)
            })
            .collect();
        Ok(Projection::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, _level: f64) -> Result<Projection> {
        let point = self.predict(horizon)?.point().to_vec();
        Ok(Projection::with_relative_band(
            point,
            FALLBACK_BAND.max(self.config.noise.abs()),
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::SyntheticBaseline
    }

    fn name(&self) -> &str {
        "SyntheticBaseline"
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        let mut params = BTreeMap::from([
            ("daily_growth".to_string(), self.config.daily_growth),
            ("noise".to_string(), self.config.noise),
            ("seed".to_string(), self.config.seed as f64),
        ]);
        if let Some(level) = self.level {
            params.insert("level".to_string(), level);
        }
        params
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn low_confidence(&self) -> bool {
        true
    }
}

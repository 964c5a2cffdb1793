//! Anomaly detection by standardized deviation.
//!
//! Two scoring methods:
//! - `ZScore`: `(v - mean) / std` over the whole series, population std.
//! - `TrendResidual`: robust z of the OLS residuals,
//!   `(r - median) / (MAD / 0.6745)`, which catches dips against a trend.

use crate::core::TimeSeries;
use crate::utils::ols::linear_regression;
use crate::utils::stats::{mad, mean, median, population_std};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 0.75 quantile of the standard normal; scales MAD to a std estimate.
const MAD_SCALE: f64 = 0.6745;

/// Spread below this means there is nothing to score against.
const MIN_SPREAD: f64 = 1e-10;

/// How points are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMethod {
    #[default]
    ZScore,
    TrendResidual,
}

/// Whether the point sits above or below its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyDirection {
    Spike,
    Drop,
}

/// Configuration for anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Minimum `|z|` to flag.
    pub threshold: f64,
    pub method: AnomalyMethod,
    /// Cap on the reported confidence.
    pub max_confidence: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            method: AnomalyMethod::ZScore,
            max_confidence: 95.0,
        }
    }
}

impl AnomalyConfig {
    pub fn z_score(threshold: f64) -> Self {
        Self {
            threshold,
            method: AnomalyMethod::ZScore,
            ..Default::default()
        }
    }

    pub fn trend_residual(threshold: f64) -> Self {
        Self {
            threshold,
            method: AnomalyMethod::TrendResidual,
            ..Default::default()
        }
    }

    pub fn with_max_confidence(mut self, cap: f64) -> Self {
        self.max_confidence = cap;
        self
    }

    /// `min(50 + 15·|z|, cap)`.
    pub fn confidence(&self, z: f64) -> f64 {
        (50.0 + 15.0 * z.abs()).min(self.max_confidence)
    }
}

/// A flagged point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub date: Option<NaiveDate>,
    pub value: f64,
    /// Baseline the point was compared against.
    pub expected: f64,
    pub z_score: f64,
    pub direction: AnomalyDirection,
    pub confidence: f64,
}

impl Anomaly {
    /// Signed deviation from the baseline, relative to it.
    pub fn relative_deviation(&self) -> Option<f64> {
        if self.expected == 0.0 {
            None
        } else {
            Some((self.value - self.expected) / self.expected.abs())
        }
    }
}

/// Per-point `(z, expected)`; `None` for non-finite inputs. Returns `None`
/// overall when the series has no usable spread.
fn score(values: &[f64], method: AnomalyMethod) -> Option<Vec<Option<(f64, f64)>>> {
    let finite: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();
    if finite.len() < 2 {
        return None;
    }
    let ys: Vec<f64> = finite.iter().map(|&(_, v)| v).collect();

    let mut scores = vec![None; values.len()];
    match method {
        AnomalyMethod::ZScore => {
            let m = mean(&ys);
            let std = population_std(&ys);
            if std < MIN_SPREAD {
                return None;
            }
            for &(i, v) in &finite {
                scores[i] = Some(((v - m) / std, m));
            }
        }
        AnomalyMethod::TrendResidual => {
            let xs: Vec<f64> = finite.iter().map(|&(i, _)| i as f64).collect();
            let fit = linear_regression(&xs, &ys);
            let residuals: Vec<f64> = finite
                .iter()
                .map(|&(i, v)| v - fit.predict(i as f64))
                .collect();
            let center = median(&residuals);
            let spread = mad(&residuals) / MAD_SCALE;
            if spread < MIN_SPREAD {
                return None;
            }
            for (&(i, _), r) in finite.iter().zip(&residuals) {
                scores[i] = Some(((r - center) / spread, fit.predict(i as f64) + center));
            }
        }
    }
    Some(scores)
}

/// Flag points whose `|z|` reaches the threshold, in index order.
///
/// A constant series (no spread) has no anomalies.
pub fn detect_anomalies(values: &[f64], config: &AnomalyConfig) -> Vec<Anomaly> {
    let Some(scores) = score(values, config.method) else {
        return Vec::new();
    };

    scores
        .into_iter()
        .enumerate()
        .filter_map(|(index, s)| {
            let (z, expected) = s?;
            if z.abs() < config.threshold {
                return None;
            }
            Some(Anomaly {
                index,
                date: None,
                value: values[index],
                expected,
                z_score: z,
                direction: if z > 0.0 {
                    AnomalyDirection::Spike
                } else {
                    AnomalyDirection::Drop
                },
                confidence: config.confidence(z),
            })
        })
        .collect()
}

/// [`detect_anomalies`] over a dated series, attaching each point's date.
pub fn detect_series_anomalies(series: &TimeSeries, config: &AnomalyConfig) -> Vec<Anomaly> {
    let points = series.points();
    let mut anomalies = detect_anomalies(&series.values(), config);
    for anomaly in &mut anomalies {
        anomaly.date = points.get(anomaly.index).map(|p| p.date);
    }
    anomalies
}

//! Seasonality detection on detrended data.
//!
//! Strength is the share of detrended variance explained by the seasonal
//! position (a one-way ANOVA ratio), reported on a 0–100 scale.

use crate::core::TimeSeries;
use crate::utils::ols::detrend;
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

/// Configuration for seasonality detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityConfig {
    /// Period to test, in observations.
    pub period: usize,
    /// Strength (0–100) at or above which seasonality counts as detected.
    pub min_strength: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            period: 7,
            min_strength: 30.0,
        }
    }
}

impl SeasonalityConfig {
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_min_strength(mut self, min_strength: f64) -> Self {
        self.min_strength = min_strength.clamp(0.0, 100.0);
        self
    }
}

/// Result of seasonality detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub period: usize,
    /// Share of detrended variance explained by position, 0–100.
    pub strength: f64,
    /// Mean detrended deviation per position `0..period`.
    pub indices: Vec<f64>,
    pub detected: bool,
}

impl SeasonalityResult {
    fn none(period: usize) -> Self {
        Self {
            period,
            strength: 0.0,
            indices: Vec::new(),
            detected: false,
        }
    }

    /// Position with the largest seasonal index.
    pub fn peak_position(&self) -> Option<usize> {
        extreme_position(&self.indices, |a, b| a > b)
    }

    /// Position with the smallest seasonal index.
    pub fn trough_position(&self) -> Option<usize> {
        extreme_position(&self.indices, |a, b| a < b)
    }
}

fn extreme_position(indices: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in indices.iter().enumerate() {
        match best {
            Some((_, b)) if !better(v, b) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Detrended variation below this is treated as none.
const MIN_TOTAL_SS: f64 = 1e-12;

/// Between-group / total sum of squares for residuals grouped by `group`.
///
/// Returns `(strength in 0–100, per-group mean deviation)`.
fn anova_strength(residuals: &[f64], groups: &[usize], n_groups: usize) -> (f64, Vec<f64>) {
    let n = residuals.len() as f64;
    let overall = residuals.iter().sum::<f64>() / n;

    let mut sums = vec![0.0; n_groups];
    let mut counts = vec![0usize; n_groups];
    for (&r, &g) in residuals.iter().zip(groups) {
        sums[g] += r;
        counts[g] += 1;
    }
    let indices: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c == 0 { 0.0 } else { s / c as f64 - overall })
        .collect();

    let ss_total: f64 = residuals.iter().map(|r| (r - overall).powi(2)).sum();
    let ss_between: f64 = indices
        .iter()
        .zip(&counts)
        .map(|(d, &c)| c as f64 * d * d)
        .sum();

    let strength = if ss_total > MIN_TOTAL_SS {
        (ss_between / ss_total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    (strength, indices)
}

/// Seasonal strength and indices of `values` at `period`.
///
/// Needs at least two full periods and `period >= 2`; otherwise the
/// strength is 0 with no indices.
pub fn seasonal_profile(values: &[f64], period: usize) -> SeasonalityResult {
    if period < 2 || values.len() < 2 * period {
        return SeasonalityResult::none(period);
    }

    let residuals = detrend(values);
    let groups: Vec<usize> = (0..values.len()).map(|i| i % period).collect();
    let (strength, indices) = anova_strength(&residuals, &groups, period);
    SeasonalityResult {
        period,
        strength,
        indices,
        detected: false,
    }
}

/// Seasonal strength (0–100) of `values` at `period`.
pub fn seasonal_strength(values: &[f64], period: usize) -> f64 {
    seasonal_profile(values, period).strength
}

/// Detect seasonality at the configured period.
pub fn detect_seasonality(values: &[f64], config: &SeasonalityConfig) -> SeasonalityResult {
    let mut result = seasonal_profile(values, config.period);
    result.detected = !result.indices.is_empty() && result.strength >= config.min_strength;
    result
}

/// Day-of-week pattern of a dated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPattern {
    pub strength: f64,
    /// Mean detrended deviation for Monday through Sunday.
    pub weekday_indices: Vec<f64>,
    pub detected: bool,
}

impl WeeklyPattern {
    pub fn strongest_day(&self) -> Option<Weekday> {
        extreme_position(&self.weekday_indices, |a, b| a > b).map(weekday_from_index)
    }

    pub fn weakest_day(&self) -> Option<Weekday> {
        extreme_position(&self.weekday_indices, |a, b| a < b).map(weekday_from_index)
    }
}

fn weekday_from_index(i: usize) -> Weekday {
    match i {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Group detrended values by calendar weekday.
///
/// Needs at least two weeks of points.
pub fn weekly_seasonality(series: &TimeSeries, min_strength: f64) -> WeeklyPattern {
    if series.len() < 14 {
        return WeeklyPattern {
            strength: 0.0,
            weekday_indices: Vec::new(),
            detected: false,
        };
    }

    let residuals = detrend(&series.values());
    let groups: Vec<usize> = series
        .dates()
        .iter()
        .map(|d| d.weekday().num_days_from_monday() as usize)
        .collect();
    let (strength, weekday_indices) = anova_strength(&residuals, &groups, 7);
    WeeklyPattern {
        strength,
        weekday_indices,
        detected: strength >= min_strength,
    }
}

//! The forecast handed to callers: dated predictions plus diagnostics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of the model that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearTrend,
    Naive,
    MovingAverage,
    ExponentialSmoothing,
    SeasonalNaive,
    /// Degraded mode: not fitted to data.
    SyntheticBaseline,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LinearTrend => "linear_trend",
            ModelKind::Naive => "naive",
            ModelKind::MovingAverage => "moving_average",
            ModelKind::ExponentialSmoothing => "exponential_smoothing",
            ModelKind::SeasonalNaive => "seasonal_naive",
            ModelKind::SyntheticBaseline => "synthetic_baseline",
        }
    }

    /// Whether results from this model are fitted to the caller's data.
    pub fn is_data_driven(&self) -> bool {
        !matches!(self, ModelKind::SyntheticBaseline)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One predicted step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    /// Confidence in percent (0–100).
    pub confidence: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
}

/// In-sample accuracy of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    pub mae: f64,
    pub rmse: f64,
    /// `None` when every actual value was zero.
    pub mape: Option<f64>,
    pub smape: f64,
    /// Relative ranking only.
    pub aic: f64,
    pub bic: f64,
}

/// Statistic and p-value of a residual test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestStatistic {
    /// Not enough residuals to run the test.
    pub fn unavailable() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
        }
    }

    /// True if the null hypothesis is rejected at `alpha`.
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value.is_finite() && self.p_value < alpha
    }
}

/// Residual diagnostics attached to a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Autocorrelation in residuals.
    pub ljung_box: TestStatistic,
    /// Normality of residuals.
    pub jarque_bera: TestStatistic,
    /// Conditional heteroskedasticity.
    pub arch: TestStatistic,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            ljung_box: TestStatistic::unavailable(),
            jarque_bera: TestStatistic::unavailable(),
            arch: TestStatistic::unavailable(),
        }
    }
}

/// Dated predictions with accuracy and residual diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predictions: Vec<ForecastPoint>,
    pub accuracy: ForecastAccuracy,
    pub model: ModelKind,
    pub parameters: BTreeMap<String, f64>,
    pub diagnostics: Diagnostics,
}

impl Forecast {
    pub fn horizon(&self) -> usize {
        self.predictions.len()
    }

    pub fn predicted_values(&self) -> Vec<f64> {
        self.predictions.iter().map(|p| p.predicted).collect()
    }

    /// True when produced by the synthetic fallback rather than a fit.
    pub fn is_synthetic(&self) -> bool {
        !self.model.is_data_driven()
    }

    /// Every point satisfies `lower ≤ predicted ≤ upper`.
    pub fn bounds_are_ordered(&self) -> bool {
        self.predictions
            .iter()
            .all(|p| p.lower_bound <= p.predicted && p.predicted <= p.upper_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ModelKind::SyntheticBaseline).unwrap();
        assert_eq!(json, "\"synthetic_baseline\"");
        assert_eq!(ModelKind::LinearTrend.to_string(), "linear_trend");
        assert!(!ModelKind::SyntheticBaseline.is_data_driven());
        assert!(ModelKind::Naive.is_data_driven());
    }

    #[test]
    fn unavailable_statistic_never_rejects() {
        assert!(!TestStatistic::unavailable().rejects(0.05));
        let t = TestStatistic {
            statistic: 12.0,
            p_value: 0.01,
        };
        assert!(t.rejects(0.05));
    }

    #[test]
    fn bound_ordering_check() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut forecast = Forecast {
            predictions: vec![ForecastPoint {
                date,
                predicted: 10.0,
                confidence: 80.0,
                upper_bound: 12.0,
                lower_bound: 8.0,
            }],
            accuracy: ForecastAccuracy::default(),
            model: ModelKind::LinearTrend,
            parameters: BTreeMap::new(),
            diagnostics: Diagnostics::default(),
        };
        assert!(forecast.bounds_are_ordered());
        forecast.predictions[0].lower_bound = 11.0;
        assert!(!forecast.bounds_are_ordered());
    }
}

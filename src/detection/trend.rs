//! Linear trend analysis.

use crate::utils::ols::linear_trend;
use serde::{Deserialize, Serialize};

/// Sign of the fitted slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

/// OLS trend over the observation index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
    /// `clamp(R², 0, 1) · 100`.
    pub confidence: f64,
    /// Number of points fitted.
    pub n: usize,
}

impl TrendAnalysis {
    /// True when the slope magnitude and the confidence both clear the
    /// given minimums.
    pub fn is_significant(&self, min_slope: f64, min_confidence: f64) -> bool {
        self.slope.abs() >= min_slope && self.confidence >= min_confidence
    }

    /// Change implied over `steps` observations.
    pub fn change_over(&self, steps: usize) -> f64 {
        self.slope * steps as f64
    }
}

/// Fit a linear trend to `values`.
///
/// Non-finite values are ignored. Fewer than two points give a flat,
/// zero-confidence trend.
pub fn analyze_trend(values: &[f64]) -> TrendAnalysis {
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let fit = linear_trend(&clean);

    let direction = if fit.degenerate || fit.slope == 0.0 {
        TrendDirection::Flat
    } else if fit.slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    let confidence = if fit.degenerate {
        0.0
    } else {
        fit.r_squared.clamp(0.0, 1.0) * 100.0
    };

    TrendAnalysis {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        direction,
        confidence,
        n: fit.n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn increasing_line() {
        let values: Vec<f64> = (0..20).map(|i| 3.0 * i as f64 + 7.0).collect();
        let trend = analyze_trend(&values);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_relative_eq!(trend.slope, 3.0, epsilon = 1e-10);
        assert_relative_eq!(trend.confidence, 100.0, epsilon = 1e-8);
        assert!(trend.is_significant(1.0, 90.0));
        assert_relative_eq!(trend.change_over(7), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn decreasing_line() {
        let values: Vec<f64> = (0..10).map(|i| 50.0 - 2.0 * i as f64).collect();
        assert_eq!(analyze_trend(&values).direction, TrendDirection::Decreasing);
    }

    #[test]
    fn constant_series_is_flat() {
        let trend = analyze_trend(&[4.0; 8]);
        assert_eq!(trend.direction, TrendDirection::Flat);
        assert_relative_eq!(trend.slope, 0.0);
        assert!(!trend.is_significant(0.1, 0.0));
    }

    #[test]
    fn single_point_has_no_confidence() {
        let trend = analyze_trend(&[1.0, f64::NAN]);
        assert_eq!(trend.direction, TrendDirection::Flat);
        assert_relative_eq!(trend.confidence, 0.0);
        assert_eq!(trend.n, 1);
    }

    #[test]
    fn noisy_series_has_partial_confidence() {
        let values = [10.0, 14.0, 9.0, 15.0, 12.0, 18.0, 11.0, 19.0];
        let trend = analyze_trend(&values);
        assert!(trend.confidence > 0.0 && trend.confidence < 100.0);
    }
}

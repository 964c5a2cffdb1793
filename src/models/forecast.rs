//! Turning a fitted model into a dated [`Forecast`].

use crate::core::{Forecast, ForecastAccuracy, ForecastPoint, Projection, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::linear::FALLBACK_BAND;
use crate::models::Forecaster;
use crate::utils::metrics::{calculate_metrics, information_criteria};
use crate::validation::residual_tests::diagnose;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How forecasts are dated, banded and scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Prediction interval level.
    pub level: f64,
    /// Confidence lost per additional step ahead.
    pub confidence_decay: f64,
    /// Lowest confidence a step can decay to.
    pub confidence_floor: f64,
    /// Starting confidence for low-confidence fits.
    pub low_confidence_base: f64,
    /// Date forecasts continue from when the series is empty.
    pub origin: Option<NaiveDate>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            level: 0.95,
            confidence_decay: 2.0,
            confidence_floor: 10.0,
            low_confidence_base: 25.0,
            origin: None,
        }
    }
}

impl ForecastConfig {
    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn with_confidence_decay(mut self, decay: f64) -> Self {
        self.confidence_decay = decay;
        self
    }

    pub fn with_origin(mut self, origin: NaiveDate) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Confidence of the first step for a fit with the given R².
    pub fn base_confidence(&self, r_squared: f64, low_confidence: bool) -> f64 {
        if low_confidence {
            self.low_confidence_base
        } else {
            50.0 + 45.0 * r_squared.clamp(0.0, 1.0)
        }
    }

    /// Confidence at step `h` (1-based); never increases with `h`.
    pub fn step_confidence(&self, base: f64, h: usize) -> f64 {
        let decayed = base - self.confidence_decay.max(0.0) * h.saturating_sub(1) as f64;
        decayed.max(self.confidence_floor).clamp(0.0, 100.0)
    }
}

/// Fit `model` on `series` and produce a dated forecast of `horizon` steps.
///
/// Bounds come from the model's intervals when it has them, else a ±15%
/// band; either way each point satisfies `lower ≤ predicted ≤ upper`.
pub fn build_forecast(
    model: &mut dyn Forecaster,
    series: &TimeSeries,
    horizon: usize,
    config: &ForecastConfig,
) -> Result<Forecast> {
    model.fit(series)?;
    let projection = model.predict_with_intervals(horizon, config.level)?;
    if projection.horizon() != horizon {
        return Err(EngineError::DimensionMismatch {
            expected: horizon,
            got: projection.horizon(),
        });
    }
    if !projection.is_finite() {
        return Err(EngineError::Computation(format!(
            "{} produced non-finite predictions",
            model.name()
        )));
    }

    let actual = series.values();
    let fitted = model.fitted_values().unwrap_or(&[]);
    let residuals: Vec<f64> = model.residuals().map(<[f64]>::to_vec).unwrap_or_default();

    let metrics = if fitted.len() == actual.len() {
        calculate_metrics(&actual, fitted).ok()
    } else {
        None
    };
    let r_squared = metrics.as_ref().map_or(0.0, |m| m.r_squared);
    let (aic, bic) = information_criteria(&residuals, model.parameter_count());
    let accuracy = match &metrics {
        Some(m) => ForecastAccuracy {
            mae: m.mae,
            rmse: m.rmse,
            mape: m.mape,
            smape: m.smape,
            aic,
            bic,
        },
        None => ForecastAccuracy {
            aic,
            bic,
            ..Default::default()
        },
    };

    let dates = forecast_dates(series, horizon, config.origin);
    let base = config.base_confidence(r_squared, model.low_confidence());
    let predictions = dated_points(&projection, &dates, |h| config.step_confidence(base, h));

    debug!(
        model = model.name(),
        horizon,
        r_squared,
        base_confidence = base,
        "forecast built"
    );

    Ok(Forecast {
        predictions,
        accuracy,
        model: model.kind(),
        parameters: model.parameters(),
        diagnostics: diagnose(&residuals, model.parameter_count()),
    })
}

/// Dates following the series, or following `origin` (default today) when
/// the series is empty.
pub fn forecast_dates(series: &TimeSeries, horizon: usize, origin: Option<NaiveDate>) -> Vec<NaiveDate> {
    if !series.is_empty() {
        return series.future_dates(horizon);
    }
    let start = origin.unwrap_or_else(|| Utc::now().date_naive());
    (1..=horizon as i64).map(|h| start + Duration::days(h)).collect()
}

fn dated_points(
    projection: &Projection,
    dates: &[NaiveDate],
    confidence: impl Fn(usize) -> f64,
) -> Vec<ForecastPoint> {
    let point = projection.point();
    let fallback = Projection::with_relative_band(point.to_vec(), FALLBACK_BAND);
    let (lower, upper) = match (projection.lower(), projection.upper()) {
        (Some(l), Some(u)) => (l, u),
        _ => (
            fallback.lower().unwrap_or(point),
            fallback.upper().unwrap_or(point),
        ),
    };

    dates
        .iter()
        .zip(point)
        .enumerate()
        .map(|(i, (&date, &predicted))| ForecastPoint {
            date,
            predicted,
            confidence: confidence(i + 1),
            lower_bound: lower[i].min(upper[i]).min(predicted),
            upper_bound: upper[i].max(lower[i]).max(predicted),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelKind;
    use crate::models::{LinearTrend, Naive, SyntheticBaseline};
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn linear_forecast_is_dated_and_ordered() {
        let ts = TimeSeries::daily(d(2024, 1, 1), &[100.0, 110.0, 90.0, 120.0, 130.0, 95.0, 140.0]);
        let forecast =
            build_forecast(&mut LinearTrend::new(), &ts, 2, &ForecastConfig::default()).unwrap();

        assert_eq!(forecast.model, ModelKind::LinearTrend);
        assert_eq!(forecast.predictions[0].date, d(2024, 1, 8));
        assert_eq!(forecast.predictions[1].date, d(2024, 1, 9));
        assert!(forecast.bounds_are_ordered());
        assert!(forecast.predictions[0].confidence >= forecast.predictions[1].confidence);
        assert!(forecast.accuracy.aic.is_finite());
        assert!(forecast.parameters.contains_key("slope"));
    }

    #[test]
    fn perfect_fit_gets_high_confidence() {
        let values: Vec<f64> = (0..10).map(|i| 5.0 + i as f64).collect();
        let ts = TimeSeries::daily(d(2024, 1, 1), &values);
        let forecast =
            build_forecast(&mut LinearTrend::new(), &ts, 3, &ForecastConfig::default()).unwrap();
        assert_relative_eq!(forecast.predictions[0].confidence, 95.0, epsilon = 1e-9);
        assert_relative_eq!(forecast.predictions[2].confidence, 91.0, epsilon = 1e-9);
    }

    #[test]
    fn confidence_floors() {
        let config = ForecastConfig::default().with_confidence_decay(30.0);
        assert_relative_eq!(config.step_confidence(50.0, 1), 50.0);
        assert_relative_eq!(config.step_confidence(50.0, 2), 20.0);
        assert_relative_eq!(config.step_confidence(50.0, 3), 10.0);
    }

    #[test]
    fn single_point_naive_gets_fallback_band() {
        let ts = TimeSeries::daily(d(2024, 1, 1), &[40.0]);
        let forecast =
            build_forecast(&mut Naive::new(), &ts, 1, &ForecastConfig::default()).unwrap();
        let p = forecast.predictions[0];
        assert_relative_eq!(p.lower_bound, 34.0, epsilon = 1e-9);
        assert_relative_eq!(p.upper_bound, 46.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_series_uses_origin() {
        let config = ForecastConfig::default().with_origin(d(2024, 3, 1));
        let forecast = build_forecast(
            &mut SyntheticBaseline::default(),
            &TimeSeries::default(),
            2,
            &config,
        )
        .unwrap();
        assert_eq!(forecast.predictions[0].date, d(2024, 3, 2));
        assert!(forecast.is_synthetic());
        assert_relative_eq!(forecast.predictions[0].confidence, 25.0);
    }

    #[test]
    fn fit_errors_propagate() {
        let result = build_forecast(
            &mut LinearTrend::new(),
            &TimeSeries::default(),
            2,
            &ForecastConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::EmptyData)));
    }
}

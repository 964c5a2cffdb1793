//! In-sample model selection by information criteria.

use crate::core::TimeSeries;
use crate::error::{EngineError, Result};
use crate::models::{Forecaster, ModelSpec};
use crate::utils::metrics::information_criteria;
use crate::validation::comparison::{ModelComparison, RankedModel};
use tracing::{debug, warn};

/// `AIC + BIC` of a model fitted to the whole series.
fn criterion_score(model: &mut dyn Forecaster, series: &TimeSeries) -> Result<f64> {
    model.fit(series)?;
    let residuals = model.residuals().ok_or(EngineError::FitRequired)?;
    let (aic, bic) = information_criteria(residuals, model.parameter_count());
    let score = aic + bic;
    if score.is_finite() {
        Ok(score)
    } else {
        Err(EngineError::Computation(format!(
            "{} has no usable residuals",
            model.name()
        )))
    }
}

/// Fit every candidate to the full series and rank by `AIC + BIC`.
///
/// Candidates that fail to fit score `f64::INFINITY`.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::ModelRegistry;
/// use insight_forecast::validation::select_model;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values: Vec<f64> = (0..30).map(|i| 50.0 + 2.0 * i as f64 + (i % 3) as f64).collect();
/// let ts = TimeSeries::daily(start, &values);
///
/// let registry = ModelRegistry::standard();
/// let comparison = select_model(&ts, registry.specs()).unwrap();
/// assert_eq!(comparison.best().unwrap().name, "LinearTrend");
/// ```
pub fn select_model(series: &TimeSeries, specs: &[ModelSpec]) -> Result<ModelComparison> {
    if specs.is_empty() {
        return Err(EngineError::InvalidParameter(
            "at least one model is required".to_string(),
        ));
    }

    let ranked = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let mut model = spec.create();
            let (score, valid) = match criterion_score(&mut model, series) {
                Ok(score) => (score, 1),
                Err(err) => {
                    warn!(model = %spec.name, error = %err, "model selection fit failed");
                    (f64::INFINITY, 0)
                }
            };
            debug!(model = %spec.name, score, "information criterion score");
            RankedModel {
                name: spec.name.clone(),
                index,
                model: model.kind(),
                forecast: None,
                score,
                rank: 0,
                valid_iterations: valid,
                failed_iterations: 1 - valid,
            }
        })
        .collect();

    ModelComparison::rank(ranked, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearTrend, Naive, SimpleMovingAverage};
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values)
    }

    #[test]
    fn trend_beats_naive_on_a_noisy_line() {
        let values: Vec<f64> = (0..40)
            .map(|i| 10.0 + 5.0 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let specs = vec![
            ModelSpec::new("Naive", || Box::new(Naive::new())),
            ModelSpec::new("LinearTrend", || Box::new(LinearTrend::new())),
        ];
        let comparison = select_model(&series(&values), &specs).unwrap();
        assert_eq!(comparison.best().unwrap().name, "LinearTrend");
        assert_eq!(comparison.get("Naive").unwrap().rank, 2);
        assert_eq!(comparison.summary.iterations, 1);
    }

    #[test]
    fn failing_candidate_scores_infinite() {
        let specs = vec![
            ModelSpec::new("SMA(100)", || Box::new(SimpleMovingAverage::new(100))),
            ModelSpec::new("Naive", || Box::new(Naive::new())),
        ];
        let comparison = select_model(&series(&[1.0, 3.0, 2.0, 4.0, 3.0]), &specs).unwrap();
        let failed = comparison.get("SMA(100)").unwrap();
        assert!(failed.score.is_infinite());
        assert_eq!(failed.rank, 2);
        assert_eq!(failed.failed_iterations, 1);
    }

    #[test]
    fn all_failing_is_no_valid_model() {
        let specs = vec![ModelSpec::new("SMA(100)", || {
            Box::new(SimpleMovingAverage::new(100))
        })];
        assert_eq!(
            select_model(&series(&[1.0, 2.0]), &specs),
            Err(EngineError::NoValidModel)
        );
    }

    #[test]
    fn no_candidates_is_invalid() {
        assert!(matches!(
            select_model(&series(&[1.0, 2.0]), &[]),
            Err(EngineError::InvalidParameter(_))
        ));
    }
}

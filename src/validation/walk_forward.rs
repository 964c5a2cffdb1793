//! Walk-forward comparison of several models on identical splits.

use crate::core::TimeSeries;
use crate::error::{EngineError, Result};
use crate::models::{build_forecast, ForecastConfig, Forecaster, ModelSpec};
use crate::validation::comparison::{ModelComparison, RankedModel};
use crate::validation::cross_validation::score_fold;
use crate::validation::{CancellationToken, CvConfig};
use tracing::{debug, info, warn};

/// How many of the best-ranked models get a full-series forecast attached.
const REFIT_TOP: usize = 3;

/// Score every spec over the same rolling-origin splits and rank them.
///
/// A model's score is its mean RMSE over the iterations it survived; a
/// model that failed every iteration scores `f64::INFINITY` and ranks
/// last. The best models are refit on the whole series and carry a
/// `horizon`-step forecast.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::{LinearTrend, ModelSpec, Naive};
/// use insight_forecast::validation::{walk_forward, CancellationToken, CvConfig};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values: Vec<f64> = (0..30).map(|i| 2.0 * i as f64 + 5.0).collect();
/// let ts = TimeSeries::daily(start, &values);
///
/// let specs = vec![
///     ModelSpec::new("Naive", || Box::new(Naive::new())),
///     ModelSpec::new("LinearTrend", || Box::new(LinearTrend::new())),
/// ];
/// let comparison =
///     walk_forward(&ts, &specs, &CvConfig::expanding(10, 3), 7, &CancellationToken::new()).unwrap();
/// assert_eq!(comparison.best().unwrap().name, "LinearTrend");
/// ```
pub fn walk_forward(
    series: &TimeSeries,
    specs: &[ModelSpec],
    config: &CvConfig,
    horizon: usize,
    token: &CancellationToken,
) -> Result<ModelComparison> {
    if specs.is_empty() {
        return Err(EngineError::InvalidParameter(
            "at least one model is required".to_string(),
        ));
    }
    config.validate()?;
    let splits = config.splits(series.len());
    if splits.is_empty() {
        return Err(EngineError::InsufficientData {
            needed: config.min_train_size + config.test_size,
            got: series.len(),
        });
    }

    let values = series.values();
    let mut scores: Vec<Vec<f64>> = vec![Vec::with_capacity(splits.len()); specs.len()];
    for &(start, origin) in &splits {
        token.check()?;
        let train = series.slice(start, origin)?;
        let actual = &values[origin..origin + config.test_size];

        for (spec, model_scores) in specs.iter().zip(scores.iter_mut()) {
            let mut model = spec.create();
            match score_fold(&mut model, &train, actual) {
                Ok(score) => model_scores.push(score),
                Err(err) => {
                    warn!(model = %spec.name, origin, error = %err, "walk-forward iteration failed");
                    model_scores.push(f64::INFINITY);
                }
            }
        }
    }

    let ranked: Vec<RankedModel> = specs
        .iter()
        .zip(&scores)
        .enumerate()
        .map(|(index, (spec, model_scores))| {
            let valid: Vec<f64> = model_scores.iter().copied().filter(|s| s.is_finite()).collect();
            let score = if valid.is_empty() {
                f64::INFINITY
            } else {
                valid.iter().sum::<f64>() / valid.len() as f64
            };
            RankedModel {
                name: spec.name.clone(),
                index,
                model: spec.create().kind(),
                forecast: None,
                score,
                rank: 0,
                valid_iterations: valid.len(),
                failed_iterations: model_scores.len() - valid.len(),
            }
        })
        .collect();

    let mut comparison = ModelComparison::rank(ranked, splits.len())?;

    let forecast_config = ForecastConfig::default();
    for entry in comparison
        .models
        .iter_mut()
        .filter(|m| m.score.is_finite())
        .take(REFIT_TOP)
    {
        token.check()?;
        let Some(spec) = specs.get(entry.index) else {
            continue;
        };
        let mut model = spec.create();
        match build_forecast(&mut model, series, horizon, &forecast_config) {
            Ok(forecast) => entry.forecast = Some(forecast),
            Err(err) => debug!(model = %entry.name, error = %err, "refit on full series failed"),
        }
    }

    info!(
        models = specs.len(),
        iterations = splits.len(),
        best = comparison.best().map(|m| m.name.as_str()).unwrap_or_default(),
        "walk-forward validation finished"
    );
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelKind;
    use crate::models::{LinearTrend, Naive, SimpleMovingAverage};
    use chrono::NaiveDate;

    fn trending(n: usize) -> TimeSeries {
        let values: Vec<f64> = (0..n).map(|i| 3.0 * i as f64 + 7.0).collect();
        TimeSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &values)
    }

    fn specs() -> Vec<ModelSpec> {
        vec![
            ModelSpec::new("Naive", || Box::new(Naive::new())),
            ModelSpec::new("SMA(50)", || Box::new(SimpleMovingAverage::new(50))),
            ModelSpec::new("LinearTrend", || Box::new(LinearTrend::new())),
        ]
    }

    #[test]
    fn linear_wins_on_a_line_and_failing_model_ranks_last() {
        let comparison = walk_forward(
            &trending(30),
            &specs(),
            &CvConfig::expanding(10, 2),
            5,
            &CancellationToken::new(),
        )
        .unwrap();

        let names: Vec<&str> = comparison.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["LinearTrend", "Naive", "SMA(50)"]);
        let ranks: Vec<usize> = comparison.models.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        let failing = comparison.get("SMA(50)").unwrap();
        assert!(failing.score.is_infinite());
        assert_eq!(failing.valid_iterations, 0);
        assert!(failing.forecast.is_none());

        let best = comparison.best().unwrap();
        assert_eq!(best.forecast.as_ref().unwrap().horizon(), 5);
        assert_eq!(comparison.summary.iterations, 19);
        assert_eq!(comparison.summary.evaluated_models, 3);
    }

    #[test]
    fn duplicate_names_refit_their_own_candidate() {
        let specs = vec![
            ModelSpec::new("candidate", || Box::new(Naive::new())),
            ModelSpec::new("candidate", || Box::new(LinearTrend::new())),
        ];
        let comparison = walk_forward(
            &trending(30),
            &specs,
            &CvConfig::expanding(10, 2),
            4,
            &CancellationToken::new(),
        )
        .unwrap();

        let best = comparison.best().unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.model, ModelKind::LinearTrend);
        assert_eq!(best.forecast.as_ref().unwrap().model, ModelKind::LinearTrend);

        let runner_up = &comparison.models[1];
        assert_eq!(runner_up.index, 0);
        assert_eq!(runner_up.forecast.as_ref().unwrap().model, ModelKind::Naive);
    }

    #[test]
    fn every_model_failing_is_no_valid_model() {
        let specs = vec![ModelSpec::new("SMA(50)", || {
            Box::new(SimpleMovingAverage::new(50))
        })];
        let result = walk_forward(
            &trending(20),
            &specs,
            &CvConfig::expanding(10, 1),
            3,
            &CancellationToken::new(),
        );
        assert_eq!(result, Err(EngineError::NoValidModel));
    }

    #[test]
    fn cancellation_stops_the_run() {
        let token = CancellationToken::new();
        token.cancel();
        let result = walk_forward(&trending(30), &specs(), &CvConfig::default(), 3, &token);
        assert_eq!(result, Err(EngineError::Cancelled));
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let result = walk_forward(
            &trending(30),
            &[],
            &CvConfig::default(),
            3,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(EngineError::InvalidParameter(_))));
    }
}

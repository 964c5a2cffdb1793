//! Accuracy and runtime benchmark on a fixed train/test split.

use crate::core::{ModelKind, TimeSeries};
use crate::error::{EngineError, Result};
use crate::models::ModelSpec;
use crate::validation::cross_validation::score_fold;
use crate::validation::CancellationToken;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

/// Configuration for [`benchmark`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Repetitions per model.
    pub trials: usize,
    /// Trailing points used as the test set.
    pub test_size: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            trials: 5,
            test_size: 7,
        }
    }
}

impl BenchmarkConfig {
    pub fn new(trials: usize, test_size: usize) -> Self {
        Self { trials, test_size }
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 || self.test_size == 0 {
            return Err(EngineError::InvalidParameter(
                "benchmark trials and test_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One model's benchmark outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub name: String,
    pub model: ModelKind,
    /// Mean test RMSE over successful trials.
    pub mean_score: f64,
    /// Mean wall-clock seconds per successful trial.
    pub mean_seconds: f64,
    /// `mean_score + mean_seconds`; infinite when no trial succeeded.
    pub composite_score: f64,
    pub rank: usize,
    pub successful_trials: usize,
}

/// Run each model `trials` times on the same split and rank by composite
/// score, ascending.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::models::{LinearTrend, ModelSpec, Naive};
/// use insight_forecast::validation::{benchmark, BenchmarkConfig, CancellationToken};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values: Vec<f64> = (0..40).map(|i| 10.0 * i as f64).collect();
/// let ts = TimeSeries::daily(start, &values);
/// let specs = vec![
///     ModelSpec::new("Naive", || Box::new(Naive::new())),
///     ModelSpec::new("LinearTrend", || Box::new(LinearTrend::new())),
/// ];
///
/// let entries = benchmark(&ts, &specs, &BenchmarkConfig::new(2, 7), &CancellationToken::new()).unwrap();
/// assert_eq!(entries[0].name, "LinearTrend");
/// assert_eq!(entries[0].rank, 1);
/// ```
pub fn benchmark(
    series: &TimeSeries,
    specs: &[ModelSpec],
    config: &BenchmarkConfig,
    token: &CancellationToken,
) -> Result<Vec<BenchmarkEntry>> {
    config.validate()?;
    if specs.is_empty() {
        return Err(EngineError::InvalidParameter(
            "at least one model is required".to_string(),
        ));
    }
    let n = series.len();
    if n <= config.test_size {
        return Err(EngineError::InsufficientData {
            needed: config.test_size + 1,
            got: n,
        });
    }

    let split = n - config.test_size;
    let train = series.slice(0, split)?;
    let values = series.values();
    let actual = &values[split..];

    let mut entries = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut scores = Vec::with_capacity(config.trials);
        let mut seconds = Vec::with_capacity(config.trials);
        for trial in 0..config.trials {
            token.check()?;
            let started = Instant::now();
            let mut model = spec.create();
            let outcome = score_fold(&mut model, &train, actual);
            let elapsed = started.elapsed().as_secs_f64();
            match outcome {
                Ok(score) => {
                    scores.push(score);
                    seconds.push(elapsed);
                }
                Err(err) => warn!(model = %spec.name, trial, error = %err, "benchmark trial failed"),
            }
        }

        let successful_trials = scores.len();
        let (mean_score, mean_seconds) = if successful_trials == 0 {
            (f64::INFINITY, 0.0)
        } else {
            let k = successful_trials as f64;
            (scores.iter().sum::<f64>() / k, seconds.iter().sum::<f64>() / k)
        };
        entries.push(BenchmarkEntry {
            name: spec.name.clone(),
            model: spec.create().kind(),
            mean_score,
            mean_seconds,
            composite_score: mean_score + mean_seconds,
            rank: 0,
            successful_trials,
        });
    }

    if entries.iter().all(|e| !e.composite_score.is_finite()) {
        return Err(EngineError::NoValidModel);
    }
    entries.sort_by(|a, b| a.composite_score.total_cmp(&b.composite_score));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    info!(
        models = entries.len(),
        trials = config.trials,
        best = %entries[0].name,
        "benchmark finished"
    );
    Ok(entries)
}

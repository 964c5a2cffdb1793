//! Cancellation between folds, windows and trials of a running validator.

use chrono::NaiveDate;
use insight_forecast::core::{ModelKind, Projection, TimeSeries};
use insight_forecast::models::{Forecaster, ModelSpec};
use insight_forecast::validation::{
    backtest, benchmark, cross_validate, walk_forward, BacktestConfig, BenchmarkConfig,
    CancellationToken, CvConfig,
};
use insight_forecast::{EngineError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Repeats the last value and cancels `token` on its `cancel_at`-th fit
/// across all instances sharing `fits`.
struct CancelOnFit {
    token: CancellationToken,
    fits: Arc<AtomicUsize>,
    cancel_at: usize,
    last: Option<f64>,
    fitted: Option<Vec<f64>>,
}

impl CancelOnFit {
    fn new(token: &CancellationToken, fits: &Arc<AtomicUsize>, cancel_at: usize) -> Self {
        Self {
            token: token.clone(),
            fits: Arc::clone(fits),
            cancel_at,
            last: None,
            fitted: None,
        }
    }
}

impl Forecaster for CancelOnFit {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let count = self.fits.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.cancel_at {
            self.token.cancel();
        }
        self.last = series.last_value();
        self.fitted = Some(series.values());
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        let last = self.last.ok_or(EngineError::FitRequired)?;
        Ok(Projection::from_values(vec![last; horizon]))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        None
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Naive
    }

    fn name(&self) -> &str {
        "CancelOnFit"
    }
}

fn series(n: usize) -> TimeSeries {
    let values: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
    TimeSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &values)
}

fn cancelling_spec(token: &CancellationToken, fits: &Arc<AtomicUsize>, cancel_at: usize) -> ModelSpec {
    let token = token.clone();
    let fits = Arc::clone(fits);
    ModelSpec::new("CancelOnFit", move || {
        Box::new(CancelOnFit::new(&token, &fits, cancel_at))
    })
}

#[test]
fn cross_validation_stops_at_the_next_fold() {
    let token = CancellationToken::new();
    let fits = Arc::new(AtomicUsize::new(0));

    // 15 folds available
    let result = cross_validate(
        &series(20),
        || CancelOnFit::new(&token, &fits, 3),
        &CvConfig::expanding(5, 1),
        &token,
    );

    assert_eq!(result, Err(EngineError::Cancelled));
    assert_eq!(fits.load(Ordering::SeqCst), 3);
}

#[test]
fn backtest_stops_at_the_next_window() {
    let token = CancellationToken::new();
    let fits = Arc::new(AtomicUsize::new(0));

    // 6 windows of 2 steps
    let result = backtest(
        &series(30),
        || CancelOnFit::new(&token, &fits, 2),
        &BacktestConfig::new(12, 2),
        &token,
    );

    assert_eq!(result, Err(EngineError::Cancelled));
    assert_eq!(fits.load(Ordering::SeqCst), 2);
}

#[test]
fn walk_forward_finishes_the_current_split_then_stops() {
    let token = CancellationToken::new();
    let fits = Arc::new(AtomicUsize::new(0));
    let specs = vec![
        cancelling_spec(&token, &fits, 3),
        cancelling_spec(&token, &fits, 3),
    ];

    let result = walk_forward(&series(20), &specs, &CvConfig::expanding(5, 1), 3, &token);

    assert_eq!(result, Err(EngineError::Cancelled));
    // two candidates per split; the third fit lands in the second split
    assert_eq!(fits.load(Ordering::SeqCst), 4);
}

#[test]
fn benchmark_stops_at_the_next_trial() {
    let token = CancellationToken::new();
    let fits = Arc::new(AtomicUsize::new(0));
    let specs = vec![cancelling_spec(&token, &fits, 2)];

    let result = benchmark(&series(20), &specs, &BenchmarkConfig::new(5, 5), &token);

    assert_eq!(result, Err(EngineError::Cancelled));
    assert_eq!(fits.load(Ordering::SeqCst), 2);
}

#[test]
fn uncancelled_run_fits_every_fold() {
    let token = CancellationToken::new();
    let fits = Arc::new(AtomicUsize::new(0));

    let result = cross_validate(
        &series(20),
        || CancelOnFit::new(&token, &fits, usize::MAX),
        &CvConfig::expanding(5, 1),
        &token,
    )
    .unwrap();

    assert_eq!(result.folds, 15);
    assert_eq!(fits.load(Ordering::SeqCst), 15);
}

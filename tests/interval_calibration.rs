//! Interval calibration tests.
//!
//! Backtests models on seeded synthetic data and checks that prediction
//! intervals cover the held-out actuals at a reasonable rate.

use chrono::NaiveDate;
use insight_forecast::core::TimeSeries;
use insight_forecast::models::{LinearTrend, Naive, SimpleExponentialSmoothing};
use insight_forecast::validation::{backtest, BacktestConfig, CancellationToken};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_ts(values: &[f64]) -> TimeSeries {
    TimeSeries::daily(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), values)
}

fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values = vec![100.0];
    for i in 1..n {
        values.push(values[i - 1] + rng.gen_range(-5.0..5.0));
    }
    values
}

fn noisy_line(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| 50.0 + 0.8 * i as f64 + rng.gen_range(-10.0..10.0))
        .collect()
}

// ============================================================================
// Coverage Rate Tests
// ============================================================================

#[test]
fn coverage_naive_95() {
    let ts = make_ts(&random_walk(200, 7));
    let result = backtest(
        &ts,
        Naive::new,
        &BacktestConfig::new(60, 5),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(result.fallback_windows, 0);
    assert!(
        result.coverage >= 70.0,
        "Naive 95% interval coverage too low: {:.2}%",
        result.coverage
    );
}

#[test]
fn coverage_ses_95() {
    let ts = make_ts(&random_walk(200, 11));
    let result = backtest(
        &ts,
        SimpleExponentialSmoothing::auto,
        &BacktestConfig::new(60, 5),
        &CancellationToken::new(),
    )
    .unwrap();

    assert!(
        result.coverage >= 70.0,
        "SES 95% interval coverage too low: {:.2}%",
        result.coverage
    );
}

#[test]
fn coverage_linear_trend_95() {
    let ts = make_ts(&noisy_line(150, 3));
    let result = backtest(
        &ts,
        LinearTrend::new,
        &BacktestConfig::new(40, 7),
        &CancellationToken::new(),
    )
    .unwrap();

    assert!(
        result.coverage >= 80.0,
        "LinearTrend 95% interval coverage too low: {:.2}%",
        result.coverage
    );
    assert!(result.directional_accuracy > 50.0);
}

#[test]
fn coverage_levels_ordering() {
    let ts = make_ts(&random_walk(150, 21));
    let run = |level: f64| {
        backtest(
            &ts,
            Naive::new,
            &BacktestConfig::new(50, 5).with_level(level),
            &CancellationToken::new(),
        )
        .unwrap()
    };

    let narrow = run(0.80);
    let wide = run(0.99);
    assert!(narrow.average_interval_width < wide.average_interval_width);
    assert!(narrow.coverage <= wide.coverage);
    assert_eq!(narrow.predicted, wide.predicted);
}

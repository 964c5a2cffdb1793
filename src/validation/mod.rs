//! Model validation: residual diagnostics and out-of-sample comparison.
//!
//! Every runner takes a [`CancellationToken`] and checks it between folds,
//! windows and trials. Runs share no state, so separate datasets can be
//! validated on separate threads.
//!
//! # Example
//!
//! ```
//! use insight_forecast::core::TimeSeries;
//! use insight_forecast::models::ModelRegistry;
//! use insight_forecast::validation::{ljung_box, walk_forward, CancellationToken, CvConfig};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let values: Vec<f64> = (0..42).map(|i| 100.0 + i as f64 + (i % 7) as f64).collect();
//! let ts = TimeSeries::daily(start, &values);
//!
//! let registry = ModelRegistry::standard();
//! let comparison =
//!     walk_forward(&ts, registry.specs(), &CvConfig::expanding(21, 7).with_step_size(7), 7, &CancellationToken::new())
//!         .unwrap();
//! assert_eq!(comparison.models.len(), 5);
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05];
//! let lb = ljung_box(&residuals, Some(5), 0);
//! assert!(lb.p_value.is_finite());
//! ```

mod cancel;

pub mod backtest;
pub mod benchmark;
pub mod comparison;
pub mod cross_validation;
pub mod selection;
pub mod walk_forward;

pub use backtest::{backtest, BacktestConfig, BacktestResult};
pub use benchmark::{benchmark, BenchmarkConfig, BenchmarkEntry};
pub use cancel::CancellationToken;
pub use comparison::{ComparisonSummary, ModelComparison, RankedModel};
pub use cross_validation::{cross_validate, CrossValidationResult, CvConfig, CvStrategy};
pub use residual_tests::{arch_lm, diagnose, jarque_bera, ljung_box};
pub use selection::select_model;
pub use walk_forward::walk_forward;

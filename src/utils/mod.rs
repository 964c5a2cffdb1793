//! Numeric helpers shared by models, detectors and validators.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use metrics::{calculate_metrics, information_criteria, AccuracyMetrics};
pub use ols::{linear_regression, linear_trend, LinearFit};
pub use stats::{quantile_normal, z_for_level};

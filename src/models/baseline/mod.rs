//! Baseline forecasting models.
//!
//! Simple methods that serve as benchmarks, plus the synthetic fallback.

mod naive;
mod seasonal_naive;
mod sma;
mod synthetic;

pub use naive::Naive;
pub use seasonal_naive::SeasonalNaive;
pub use sma::SimpleMovingAverage;
pub use synthetic::{BaselineConfig, SyntheticBaseline};

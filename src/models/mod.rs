//! Forecasting models.
//!
//! Every model implements [`Forecaster`]; [`build_forecast`] turns a fitted
//! model into a dated [`Forecast`](crate::core::Forecast).

mod traits;

pub mod baseline;
pub mod exponential;
pub mod forecast;
pub mod linear;

pub use baseline::{BaselineConfig, Naive, SeasonalNaive, SimpleMovingAverage, SyntheticBaseline};
pub use exponential::SimpleExponentialSmoothing;
pub use forecast::{build_forecast, ForecastConfig};
pub use linear::{regress_records, LinearTrend};
pub use traits::{BoxedForecaster, Forecaster, ModelRegistry, ModelSpec};

/// Root mean square of the finite residuals; `None` when there are none.
pub(crate) fn residual_sigma(residuals: &[f64]) -> Option<f64> {
    let (sum, count) = residuals
        .iter()
        .filter(|r| r.is_finite())
        .fold((0.0, 0usize), |(s, c), r| (s + r * r, c + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count as f64).sqrt())
    }
}

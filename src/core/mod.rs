//! Core data structures shared by every stage of the engine.

mod forecast;
mod projection;
mod record;
mod time_series;

pub use forecast::{
    Diagnostics, Forecast, ForecastAccuracy, ForecastPoint, ModelKind, TestStatistic,
};
pub use projection::Projection;
pub use record::{Record, Value};
pub use time_series::{TimeSeries, TimeSeriesPoint};

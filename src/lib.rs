//! # insight-forecast
//!
//! Time-series analytics engine for content and marketing metrics.
//!
//! Takes ordered, time-stamped records and:
//! - cleans and reshapes them ([`transform`])
//! - fits simple forecast models ([`models`])
//! - finds trend, weekly seasonality and anomalies ([`detection`])
//! - compares candidate models out of sample ([`validation`])
//! - packages the results as ranked insights ([`insights`])
//!
//! [`service::AnalyticsService`] ties the stages together behind an
//! explicit start/ingest/flush/stop lifecycle.
//!
//! # Example
//!
//! ```
//! use insight_forecast::prelude::*;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let ts = TimeSeries::daily(start, &[100.0, 110.0, 90.0, 120.0, 130.0, 95.0, 140.0]);
//!
//! let forecast = build_forecast(&mut LinearTrend::new(), &ts, 2, &ForecastConfig::default()).unwrap();
//! assert_eq!(forecast.predictions[0].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
//! assert!(forecast.bounds_are_ordered());
//! ```

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod insights;
pub mod models;
pub mod service;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{EngineError, Result};

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::{Forecast, ModelKind, Record, TimeSeries, Value};
    pub use crate::error::{EngineError, Result};
    pub use crate::insights::{Insight, InsightConfig, InsightGenerator};
    pub use crate::models::{build_forecast, ForecastConfig, Forecaster, LinearTrend, ModelSpec};
    pub use crate::service::AnalyticsService;
    pub use crate::utils::{calculate_metrics, quantile_normal, AccuracyMetrics};
    pub use crate::validation::CancellationToken;
}

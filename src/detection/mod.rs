//! Trend, seasonality and anomaly detection.
//!
//! # Example
//!
//! ```
//! use insight_forecast::detection::{analyze_trend, detect_anomalies, AnomalyConfig, TrendDirection};
//!
//! let values = [100.0, 110.0, 90.0, 120.0, 130.0, 95.0, 140.0];
//! assert_eq!(analyze_trend(&values).direction, TrendDirection::Increasing);
//!
//! let dips = detect_anomalies(&values, &AnomalyConfig::trend_residual(1.5));
//! assert_eq!(dips.len(), 2);
//! ```

mod anomaly;
mod seasonality;
mod trend;

pub use anomaly::{
    detect_anomalies, detect_series_anomalies, Anomaly, AnomalyConfig, AnomalyDirection,
    AnomalyMethod,
};
pub use seasonality::{
    detect_seasonality, seasonal_profile, seasonal_strength, weekly_seasonality,
    SeasonalityConfig, SeasonalityResult, WeeklyPattern,
};
pub use trend::{analyze_trend, TrendAnalysis, TrendDirection};

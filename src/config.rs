//! Root configuration for the engine.
//!
//! Every section has defaults, so a JSON document only needs the keys it
//! changes:
//!
//! ```
//! use insight_forecast::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{
//!     "transform": { "fields": ["views"], "moving_average": 3 },
//!     "insights": { "horizon": 14, "anomaly": { "threshold": 2.5 } }
//! }"#).unwrap();
//! assert_eq!(config.insights.horizon, 14);
//! assert_eq!(config.insights.anomaly.threshold, 2.5);
//! assert_eq!(config.cv.min_train_size, 10);
//! ```

use crate::error::{EngineError, Result};
use crate::insights::InsightConfig;
use crate::transform::TransformConfig;
use crate::validation::{BacktestConfig, BenchmarkConfig, CvConfig};
use serde::{Deserialize, Serialize};

/// Configuration for every stage of the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub transform: TransformConfig,
    /// Insight thresholds plus the anomaly, seasonality, forecast and
    /// baseline settings they run with.
    pub insights: InsightConfig,
    pub cv: CvConfig,
    pub backtest: BacktestConfig,
    pub benchmark: BenchmarkConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_insights(mut self, insights: InsightConfig) -> Self {
        self.insights = insights;
        self
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.transform.date_key.is_empty() {
            return Err(EngineError::Config("transform.date_key must not be empty".to_string()));
        }
        self.insights
            .validate()
            .and_then(|_| self.cv.validate())
            .and_then(|_| self.backtest.validate())
            .and_then(|_| self.benchmark.validate())
            .map_err(|err| EngineError::Config(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::NormalizeMethod;
    use crate::validation::CvStrategy;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn nested_sections_parse() {
        let config = EngineConfig::from_json_str(
            r#"{
                "transform": { "normalize": "zscore", "formula": { "name": "ctr", "expression": "clicks / views" } },
                "cv": { "strategy": "rolling", "min_train_size": 14 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.transform.normalize, NormalizeMethod::ZScore);
        assert_eq!(config.transform.formula.unwrap().name, "ctr");
        assert_eq!(config.cv.strategy, CvStrategy::Rolling);
        assert_eq!(config.cv.test_size, 1);
    }

    #[test]
    fn round_trips_through_json() {
        let config = EngineConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ \"cv\": "),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "cv": { "step_size": 0 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(msg) if msg.contains("step_size")));

        let err = EngineConfig::from_json_str(r#"{ "insights": { "horizon": 0 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}

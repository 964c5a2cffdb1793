//! Fixed-order transform pipeline.

use super::bucket::{bucket_records, BucketMode};
use super::formula::{apply_formula, Formula};
use super::scale::{normalize_records, NormalizeMethod};
use super::window::{add_band_width, smooth_records};
use crate::core::Record;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A derived field computed from an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaSpec {
    /// Output field name.
    pub name: String,
    pub expression: String,
}

/// Lower/upper bound fields used to compute a band width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSpec {
    pub lower: String,
    pub upper: String,
    #[serde(default = "default_band_output")]
    pub output: String,
}

fn default_band_output() -> String {
    "width".to_string()
}

impl BandSpec {
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
            output: default_band_output(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// Configuration for [`apply_pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub formula: Option<FormulaSpec>,
    pub bucket: BucketMode,
    /// Field holding the row date.
    pub date_key: String,
    /// Fields that bucketing, normalization and smoothing operate on.
    pub fields: Vec<String>,
    pub normalize: NormalizeMethod,
    pub band: Option<BandSpec>,
    /// Moving-average window; values `<= 1` disable smoothing.
    pub moving_average: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            formula: None,
            bucket: BucketMode::None,
            date_key: "date".to_string(),
            fields: Vec::new(),
            normalize: NormalizeMethod::None,
            band: None,
            moving_average: 0,
        }
    }
}

impl TransformConfig {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_formula(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.formula = Some(FormulaSpec {
            name: name.into(),
            expression: expression.into(),
        });
        self
    }

    pub fn with_bucket(mut self, bucket: BucketMode) -> Self {
        self.bucket = bucket;
        self
    }

    pub fn with_date_key(mut self, date_key: impl Into<String>) -> Self {
        self.date_key = date_key.into();
        self
    }

    pub fn with_normalize(mut self, method: NormalizeMethod) -> Self {
        self.normalize = method;
        self
    }

    pub fn with_band(mut self, band: BandSpec) -> Self {
        self.band = Some(band);
        self
    }

    pub fn with_moving_average(mut self, window: usize) -> Self {
        self.moving_average = window;
        self
    }

    /// Target fields plus the formula output when the formula parses.
    pub fn effective_fields(&self) -> Vec<String> {
        let mut fields = self.fields.clone();
        if let Some(formula) = &self.formula {
            let derives = !formula.name.trim().is_empty()
                && Formula::parse(&formula.expression).is_ok();
            if derives && !fields.contains(&formula.name) {
                fields.push(formula.name.clone());
            }
        }
        fields
    }
}

/// Run formula, bucketing, normalization, band width and smoothing in
/// that order.
pub fn apply_pipeline(records: &[Record], config: &TransformConfig) -> Vec<Record> {
    let fields = config.effective_fields();

    let mut rows = match &config.formula {
        Some(spec) => apply_formula(records, &spec.name, &spec.expression),
        None => records.to_vec(),
    };
    rows = bucket_records(&rows, config.bucket, &config.date_key, &fields);
    rows = normalize_records(&rows, config.normalize, &fields);
    if let Some(band) = &config.band {
        rows = add_band_width(&rows, &band.lower, &band.upper, &band.output);
    }
    rows = smooth_records(&rows, config.moving_average, &fields);

    debug!(
        input_rows = records.len(),
        output_rows = rows.len(),
        fields = fields.len(),
        "transform pipeline applied"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_is_identity() {
        let rows = vec![
            Record::new().with("date", "2024-01-01").with("v", 1.0),
            Record::new().with("date", "2024-01-02").with("v", 2.0),
        ];
        assert_eq!(apply_pipeline(&rows, &TransformConfig::default()), rows);
    }

    #[test]
    fn formula_output_flows_into_later_steps() {
        let rows = vec![
            Record::new().with("date", "2024-01-01").with("a", 1.0).with("b", 1.0),
            Record::new().with("date", "2024-01-02").with("a", 2.0).with("b", 2.0),
            Record::new().with("date", "2024-01-03").with("a", 3.0).with("b", 3.0),
        ];
        let config = TransformConfig::new(&["a"])
            .with_formula("total", "a + b")
            .with_normalize(NormalizeMethod::MinMax);
        let out = apply_pipeline(&rows, &config);
        assert_relative_eq!(out[0].number("total").unwrap(), 0.0);
        assert_relative_eq!(out[1].number("total").unwrap(), 0.5);
        assert_relative_eq!(out[2].number("total").unwrap(), 1.0);
        assert_relative_eq!(out[2].number("a").unwrap(), 1.0);
        // b is not a target field
        assert_relative_eq!(out[2].number("b").unwrap(), 3.0);
    }

    #[test]
    fn rejected_formula_adds_no_field() {
        let rows = vec![
            Record::new().with("date", "2024-01-01").with("v", 1.0),
            Record::new().with("date", "2024-01-02").with("v", 2.0),
        ];
        let config = TransformConfig::new(&["v"])
            .with_formula("score", "v + * 2")
            .with_bucket(BucketMode::Day)
            .with_normalize(NormalizeMethod::MinMax);
        assert_eq!(config.effective_fields(), vec!["v".to_string()]);

        let out = apply_pipeline(&rows, &config);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| !r.contains("score")));
        assert_relative_eq!(out[1].number("v").unwrap(), 1.0);
    }

    #[test]
    fn bucket_then_band_then_smooth() {
        let rows: Vec<Record> = (1..=4)
            .map(|day| {
                Record::new()
                    .with("date", format!("2024-01-0{day}"))
                    .with("v", day as f64)
                    .with("lo", 0.0)
                    .with("hi", 2.0 * day as f64)
            })
            .collect();
        let config = TransformConfig::new(&["v"])
            .with_bucket(BucketMode::Day)
            .with_band(BandSpec::new("lo", "hi").with_output("spread"))
            .with_moving_average(3);
        let out = apply_pipeline(&rows, &config);
        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[0].number("v").unwrap(), 1.5);
        assert_relative_eq!(out[3].number("spread").unwrap(), 8.0);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: TransformConfig =
            serde_json::from_str(r#"{"bucket":"week","fields":["views"],"normalize":"zscore"}"#)
                .unwrap();
        assert_eq!(config.bucket, BucketMode::Week);
        assert_eq!(config.normalize, NormalizeMethod::ZScore);
        assert_eq!(config.date_key, "date");
        assert!(config.formula.is_none());
    }
}

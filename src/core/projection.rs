//! Raw model output: point predictions with optional intervals.

use crate::error::{EngineError, Result};

/// Point predictions for the next `horizon` steps, optionally with
/// prediction interval bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Projection {
    /// Create an empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a projection from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a projection with prediction intervals.
    pub fn with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != values.len() {
            return Err(EngineError::DimensionMismatch {
                expected: values.len(),
                got: lower.len(),
            });
        }
        if upper.len() != values.len() {
            return Err(EngineError::DimensionMismatch {
                expected: values.len(),
                got: upper.len(),
            });
        }
        Ok(Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        })
    }

    /// Symmetric band of `fraction * |value|` around each point.
    pub fn with_relative_band(values: Vec<f64>, fraction: f64) -> Self {
        let fraction = fraction.abs();
        let lower = values.iter().map(|v| v - fraction * v.abs()).collect();
        let upper = values.iter().map(|v| v + fraction * v.abs()).collect();
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// True when every point (and bound, if present) is finite.
    pub fn is_finite(&self) -> bool {
        let finite = |v: &[f64]| v.iter().all(|x| x.is_finite());
        finite(&self.point)
            && self.lower.as_deref().map_or(true, finite)
            && self.upper.as_deref().map_or(true, finite)
    }
}

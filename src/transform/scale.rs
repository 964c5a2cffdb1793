//! Per-field normalization.

use crate::core::Record;
use serde::{Deserialize, Serialize};

/// Normalization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    #[default]
    None,
    /// `(x - min) / (max - min)`
    MinMax,
    /// `(x - mean) / std` with population std
    ZScore,
}

/// Scaling parameters fitted on one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParams {
    /// Value subtracted (min or mean).
    pub center: f64,
    /// Divisor (range or std); 1 when the spread is zero.
    pub scale: f64,
}

impl ScaleParams {
    /// Fit parameters for `method`; `None` for [`NormalizeMethod::None`] or
    /// an empty input.
    pub fn fit(values: &[f64], method: NormalizeMethod) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        match method {
            NormalizeMethod::None => None,
            NormalizeMethod::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                Some(Self {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                })
            }
            NormalizeMethod::ZScore => {
                // the computed mean of identical values can be off by an ulp
                if values.iter().all(|&x| x == values[0]) {
                    return Some(Self {
                        center: values[0],
                        scale: 1.0,
                    });
                }
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let std = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
                Some(Self {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                })
            }
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        (x - self.center) / self.scale
    }

    /// Map a scaled value back to the original units.
    pub fn inverse(&self, x: f64) -> f64 {
        x * self.scale + self.center
    }
}

/// Scale a slice to `[0, 1]`; a constant slice maps to all zeros.
pub fn min_max(values: &[f64]) -> Vec<f64> {
    scale_with(values, NormalizeMethod::MinMax)
}

/// Standardize a slice; a constant slice maps to all zeros.
pub fn z_score(values: &[f64]) -> Vec<f64> {
    scale_with(values, NormalizeMethod::ZScore)
}

fn scale_with(values: &[f64], method: NormalizeMethod) -> Vec<f64> {
    match ScaleParams::fit(values, method) {
        Some(params) => values.iter().map(|&x| params.apply(x)).collect(),
        None => values.to_vec(),
    }
}

/// Normalize each named field independently across all rows.
///
/// Statistics use the numeric cells of the field; non-numeric cells are
/// left as they are.
pub fn normalize_records(
    records: &[Record],
    method: NormalizeMethod,
    fields: &[String],
) -> Vec<Record> {
    let mut out = records.to_vec();
    if method == NormalizeMethod::None {
        return out;
    }
    for field in fields {
        let values: Vec<f64> = records.iter().filter_map(|r| r.number(field)).collect();
        let Some(params) = ScaleParams::fit(&values, method) else {
            continue;
        };
        for row in out.iter_mut() {
            if let Some(v) = row.number(field) {
                row.set(field.as_str(), params.apply(v));
            }
        }
    }
    out
}

//! Centered moving averages and confidence-band widths.

use crate::core::Record;

/// Centered moving average with a boundary-shrinking window.
///
/// Index `i` averages `[i - w/2, i + w/2]` clipped to the slice, so edge
/// points use fewer neighbours. `window <= 1` returns the input.
pub fn centered_moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || series.is_empty() {
        return series.to_vec();
    }

    let n = series.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            series[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

/// Apply [`centered_moving_average`] to each named field.
///
/// Only numeric cells take part; a non-numeric cell keeps its value and
/// is skipped when averaging its neighbours.
pub fn smooth_records(records: &[Record], window: usize, fields: &[String]) -> Vec<Record> {
    let mut out = records.to_vec();
    if window <= 1 {
        return out;
    }

    let n = records.len();
    let half = window / 2;
    for field in fields {
        let cells: Vec<Option<f64>> = records.iter().map(|r| r.number(field)).collect();
        for (i, row) in out.iter_mut().enumerate() {
            if cells[i].is_none() {
                continue;
            }
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            let (sum, count) = cells[start..end]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            row.set(field.as_str(), sum / count as f64);
        }
    }
    out
}

/// Add `output = max(0, upper - lower)` to every row.
///
/// Missing or non-numeric bounds count as 0.
pub fn add_band_width(records: &[Record], lower: &str, upper: &str, output: &str) -> Vec<Record> {
    records
        .iter()
        .map(|row| {
            let lo = row.number(lower).unwrap_or(0.0);
            let hi = row.number(upper).unwrap_or(0.0);
            let mut out = row.clone();
            out.set(output, (hi - lo).max(0.0));
            out
        })
        .collect()
}

//! Dated univariate series.

use crate::core::record::Record;
use crate::error::{EngineError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A univariate series ordered ascending by date.
///
/// Construction always sorts (stably) by date, so equal dates keep
/// their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    /// Create a series from points in any order.
    pub fn new(mut points: Vec<TimeSeriesPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// Create a series from parallel date/value vectors.
    pub fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(EngineError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        Ok(Self::new(
            dates
                .into_iter()
                .zip(values)
                .map(|(date, value)| TimeSeriesPoint { date, value })
                .collect(),
        ))
    }

    /// Create a daily series starting at `start`.
    pub fn daily(start: NaiveDate, values: &[f64]) -> Self {
        Self {
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| TimeSeriesPoint {
                    date: start + Duration::days(i as i64),
                    value,
                })
                .collect(),
        }
    }

    /// Extract a series from records.
    ///
    /// Rows whose date does not parse or whose value is not numeric are
    /// dropped.
    pub fn from_records(records: &[Record], date_key: &str, value_key: &str) -> Self {
        let mut dropped = 0usize;
        let points: Vec<TimeSeriesPoint> = records
            .iter()
            .filter_map(|r| match (r.date(date_key), r.number(value_key)) {
                (Some(date), Some(value)) => Some(TimeSeriesPoint { date, value }),
                _ => {
                    dropped += 1;
                    None
                }
            })
            .collect();
        if dropped > 0 {
            debug!(dropped, date_key, value_key, "dropped rows without a usable date or value");
        }
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Sub-series `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end || end > self.points.len() {
            return Err(EngineError::InvalidParameter(format!(
                "invalid slice [{}, {}) for series of length {}",
                start,
                end,
                self.points.len()
            )));
        }
        Ok(TimeSeries {
            points: self.points[start..end].to_vec(),
        })
    }

    /// Typical spacing between observations in days.
    ///
    /// Median of the positive gaps; 1 when there are none.
    pub fn step_days(&self) -> i64 {
        let mut gaps: Vec<i64> = self
            .points
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .filter(|&g| g > 0)
            .collect();
        if gaps.is_empty() {
            return 1;
        }
        gaps.sort_unstable();
        gaps[gaps.len() / 2]
    }

    /// The `horizon` dates following the last observation.
    pub fn future_dates(&self, horizon: usize) -> Vec<NaiveDate> {
        let Some(last) = self.last_date() else {
            return Vec::new();
        };
        let step = self.step_days();
        (1..=horizon as i64)
            .map(|h| last + Duration::days(step * h))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn construction_sorts_by_date() {
        let ts = TimeSeries::from_parts(
            vec![d(2024, 1, 3), d(2024, 1, 1), d(2024, 1, 2)],
            vec![3.0, 1.0, 2.0],
        )
        .unwrap();
        assert_eq!(ts.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ts.first_date(), Some(d(2024, 1, 1)));
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        let err = TimeSeries::from_parts(vec![d(2024, 1, 1)], vec![]).unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch { .. }));
    }

    #[test]
    fn from_records_drops_unusable_rows() {
        let records = vec![
            Record::new().with("date", "2024-01-02").with("views", 5.0),
            Record::new().with("date", "bogus").with("views", 6.0),
            Record::new().with("date", "2024-01-01").with("views", "n/a"),
            Record::new().with("date", "2024-01-01").with("views", 4.0),
        ];
        let ts = TimeSeries::from_records(&records, "date", "views");
        assert_eq!(ts.len(), 2);
        assert_eq!(ts.values(), vec![4.0, 5.0]);
    }

    #[test]
    fn future_dates_follow_the_observed_step() {
        let weekly = TimeSeries::from_parts(
            vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        assert_eq!(weekly.step_days(), 7);
        assert_eq!(weekly.future_dates(2), vec![d(2024, 1, 22), d(2024, 1, 29)]);

        let daily = TimeSeries::daily(d(2024, 1, 1), &[1.0, 2.0]);
        assert_eq!(daily.future_dates(1), vec![d(2024, 1, 3)]);
        assert!(TimeSeries::default().future_dates(3).is_empty());
    }

    #[test]
    fn slice_bounds_are_checked() {
        let ts = TimeSeries::daily(d(2024, 1, 1), &[1.0, 2.0, 3.0]);
        assert_eq!(ts.slice(1, 3).unwrap().values(), vec![2.0, 3.0]);
        assert!(ts.slice(2, 4).is_err());
        assert!(ts.slice(0, 0).unwrap().is_empty());
    }
}

//! Calendar bucketing of records.

use crate::core::{Record, Value};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    #[default]
    None,
    Day,
    /// ISO weeks, starting Monday.
    Week,
    Month,
}

impl BucketMode {
    /// Start of the bucket containing `date`.
    pub fn truncate(self, date: NaiveDate) -> NaiveDate {
        match self {
            BucketMode::None | BucketMode::Day => date,
            BucketMode::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            BucketMode::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

/// Group rows into calendar buckets and average `fields` within each.
///
/// Every row's `date_key` must parse as a date; if any row fails the
/// input is returned unchanged. Each output row carries the first row's
/// other fields, the bucket start date under `date_key`, and the mean of
/// the numeric values of each target field (0 when the bucket has none).
/// Buckets come out in ascending date order.
pub fn bucket_records(
    records: &[Record],
    mode: BucketMode,
    date_key: &str,
    fields: &[String],
) -> Vec<Record> {
    if mode == BucketMode::None || records.is_empty() {
        return records.to_vec();
    }

    let mut dates = Vec::with_capacity(records.len());
    for (index, row) in records.iter().enumerate() {
        match row.date(date_key) {
            Some(d) => dates.push(d),
            None => {
                warn!(index, date_key, "unparsable date; skipping bucketing");
                return records.to_vec();
            }
        }
    }

    // bucket start -> (first row, per-field (sum, count))
    let mut buckets: BTreeMap<NaiveDate, (&Record, Vec<(f64, usize)>)> = BTreeMap::new();
    for (row, date) in records.iter().zip(dates) {
        let key = mode.truncate(date);
        let entry = buckets
            .entry(key)
            .or_insert_with(|| (row, vec![(0.0, 0); fields.len()]));
        for (acc, field) in entry.1.iter_mut().zip(fields) {
            if let Some(v) = row.number(field) {
                acc.0 += v;
                acc.1 += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(start, (first, sums))| {
            let mut out = first.clone();
            out.set(date_key, Value::Date(start));
            for ((sum, count), field) in sums.into_iter().zip(fields) {
                if count == 0 && !out.contains(field) {
                    continue;
                }
                let mean = if count == 0 { 0.0 } else { sum / count as f64 };
                out.set(field.as_str(), mean);
            }
            out
        })
        .collect()
}

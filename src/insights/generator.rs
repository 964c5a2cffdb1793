//! Rule-based insight generation.
//!
//! Each rule runs a detector or model and only emits an insight when its
//! threshold is cleared:
//! - trend: confidence above `trend_min_confidence` and a projected change
//!   of at least `trend_min_change` relative to the mean
//! - anomaly: the most recent `max_recent_anomalies` flagged points
//! - seasonality: weekly strength at or above the configured minimum
//! - forecast: always, from a linear fit or the synthetic baseline
//! - segments: best/worst group gap of at least `segment_min_gap`

use super::types::{rank_insights, Impact, Insight, InsightCategory};
use crate::core::{
    Diagnostics, Forecast, ForecastAccuracy, ForecastPoint, ModelKind, Record, TimeSeries,
};
use crate::detection::{
    analyze_trend, detect_seasonality, detect_series_anomalies, weekly_seasonality, Anomaly,
    AnomalyConfig, AnomalyDirection, SeasonalityConfig, TrendDirection,
};
use crate::error::{EngineError, Result};
use crate::models::forecast::forecast_dates;
use crate::models::linear::FALLBACK_BAND;
use crate::models::{build_forecast, BaselineConfig, ForecastConfig, LinearTrend, SyntheticBaseline};
use crate::utils::stats::mean;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Thresholds and sub-configurations for [`InsightGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Trend confidence (0–100) that must be exceeded.
    pub trend_min_confidence: f64,
    /// Minimum `|slope · horizon|` as a fraction of `|mean|`.
    pub trend_min_change: f64,
    /// Only this many of the latest anomalies become insights.
    pub max_recent_anomalies: usize,
    /// Minimum relative gap between best and worst segment mean.
    pub segment_min_gap: f64,
    /// Rows each compared segment needs.
    pub segment_min_samples: usize,
    /// Shorter series get the synthetic baseline instead of a fit.
    pub min_history: usize,
    /// Forecast steps.
    pub horizon: usize,
    /// Confidence cap for insights built on the synthetic baseline.
    pub baseline_max_confidence: f64,
    pub anomaly: AnomalyConfig,
    pub seasonality: SeasonalityConfig,
    pub forecast: ForecastConfig,
    pub baseline: BaselineConfig,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            trend_min_confidence: 70.0,
            trend_min_change: 0.05,
            max_recent_anomalies: 3,
            segment_min_gap: 0.2,
            segment_min_samples: 3,
            min_history: 7,
            horizon: 7,
            baseline_max_confidence: 40.0,
            anomaly: AnomalyConfig::default(),
            seasonality: SeasonalityConfig::default(),
            forecast: ForecastConfig::default(),
            baseline: BaselineConfig::default(),
        }
    }
}

impl InsightConfig {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn with_anomaly(mut self, anomaly: AnomalyConfig) -> Self {
        self.anomaly = anomaly;
        self
    }

    pub fn with_segment_thresholds(mut self, min_gap: f64, min_samples: usize) -> Self {
        self.segment_min_gap = min_gap;
        self.segment_min_samples = min_samples;
        self
    }

    pub fn with_forecast(mut self, forecast: ForecastConfig) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.trend_min_confidence) {
            return Err(EngineError::InvalidParameter(format!(
                "trend_min_confidence must be within 0..=100, got {}",
                self.trend_min_confidence
            )));
        }
        if self.trend_min_change < 0.0 || self.segment_min_gap < 0.0 {
            return Err(EngineError::InvalidParameter(
                "insight thresholds must be non-negative".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(EngineError::InvalidParameter(
                "insight horizon must be positive".to_string(),
            ));
        }
        if !(self.forecast.level > 0.0 && self.forecast.level < 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "forecast level must be in (0, 1), got {}",
                self.forecast.level
            )));
        }
        self.baseline.validate()
    }
}

/// Turns a metric series into ranked insights.
///
/// # Example
/// ```
/// use insight_forecast::core::TimeSeries;
/// use insight_forecast::insights::{InsightCategory, InsightConfig, InsightGenerator};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let values: Vec<f64> = (0..30).map(|i| 100.0 + 5.0 * i as f64).collect();
/// let ts = TimeSeries::daily(start, &values);
///
/// let generator = InsightGenerator::new(InsightConfig::default());
/// let insights = generator.generate(&ts, "views");
/// assert!(insights.iter().any(|i| i.category == InsightCategory::Trend));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    config: InsightConfig,
}

impl InsightGenerator {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// All insights for `series`, ranked.
    pub fn generate(&self, series: &TimeSeries, metric: &str) -> Vec<Insight> {
        let forecast = self.forecast_or_baseline(series, self.config.horizon);
        self.generate_with_forecast(series, metric, &forecast)
    }

    /// Like [`generate`](Self::generate), reusing a forecast the caller
    /// already obtained from [`forecast_or_baseline`](Self::forecast_or_baseline).
    pub fn generate_with_forecast(
        &self,
        series: &TimeSeries,
        metric: &str,
        forecast: &Forecast,
    ) -> Vec<Insight> {
        let n = series.len();
        if n < self.config.min_history {
            debug!(metric, points = n, "history too short, using synthetic baseline");
            return vec![self.baseline_insight(series, metric, forecast)];
        }

        let mut insights = Vec::new();
        insights.extend(self.trend_insight(series, metric));
        insights.extend(self.anomaly_insights(series, metric));
        insights.extend(self.seasonality_insight(series, metric));
        insights.extend(self.forecast_insight(series, metric, forecast));

        rank_insights(&mut insights);
        debug!(metric, points = n, insights = insights.len(), "insights generated");
        insights
    }

    /// A data-driven linear forecast, or the synthetic baseline when the
    /// history is shorter than `min_history` or the fit fails.
    pub fn forecast_or_baseline(&self, series: &TimeSeries, horizon: usize) -> Forecast {
        if series.len() >= self.config.min_history {
            match build_forecast(&mut LinearTrend::new(), series, horizon, &self.config.forecast) {
                Ok(forecast) => return forecast,
                Err(err) => warn!(error = %err, "linear forecast failed, using synthetic baseline"),
            }
        }
        self.baseline_forecast(series, horizon)
    }

    fn baseline_forecast(&self, series: &TimeSeries, horizon: usize) -> Forecast {
        let origin = self
            .config
            .forecast
            .origin
            .unwrap_or_else(|| Utc::now().date_naive());
        let forecast_config = self.config.forecast.clone().with_origin(origin);
        let mut baseline = SyntheticBaseline::new(self.config.baseline.clone()).with_origin(origin);

        match build_forecast(&mut baseline, series, horizon, &forecast_config) {
            Ok(forecast) => forecast,
            Err(err) => {
                warn!(error = %err, "synthetic baseline failed, using flat projection");
                self.flat_forecast(series, horizon, origin)
            }
        }
    }

    /// Last resort: the default level repeated with the ±15% band.
    fn flat_forecast(&self, series: &TimeSeries, horizon: usize, origin: NaiveDate) -> Forecast {
        let level = self.config.baseline.default_level;
        let predictions = forecast_dates(series, horizon, Some(origin))
            .into_iter()
            .map(|date| ForecastPoint {
                date,
                predicted: level,
                confidence: self.config.forecast.confidence_floor,
                lower_bound: level - FALLBACK_BAND * level.abs(),
                upper_bound: level + FALLBACK_BAND * level.abs(),
            })
            .collect();
        Forecast {
            predictions,
            accuracy: ForecastAccuracy::default(),
            model: ModelKind::SyntheticBaseline,
            parameters: BTreeMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    fn baseline_insight(&self, series: &TimeSeries, metric: &str, forecast: &Forecast) -> Insight {
        let horizon = forecast.horizon();
        let confidence = forecast
            .predictions
            .first()
            .map_or(0.0, |p| p.confidence)
            .min(self.config.baseline_max_confidence);
        let end = forecast.predicted_values().last().copied().unwrap_or(0.0);

        Insight::new(
            format!("{metric}-baseline"),
            InsightCategory::Opportunity,
            Impact::Neutral,
            confidence,
        )
        .titled(
            format!("Not enough history to forecast {metric}"),
            format!(
                "Only {} data points are available, so this {}-step projection to {:.1} is a synthetic baseline, not a fitted model.",
                series.len(),
                horizon,
                end
            ),
        )
        .over(format!("next {horizon} periods"), series.len())
        .recommend(format!(
            "Collect at least {} data points for a data-driven forecast",
            self.config.min_history
        ))
        .from_model(ModelKind::SyntheticBaseline)
    }

    fn trend_insight(&self, series: &TimeSeries, metric: &str) -> Option<Insight> {
        let values = series.values();
        let trend = analyze_trend(&values);
        if trend.direction == TrendDirection::Flat
            || trend.confidence <= self.config.trend_min_confidence
        {
            return None;
        }

        let level = mean(&values).abs();
        let change = trend.change_over(self.config.horizon);
        if change.abs() < self.config.trend_min_change * level {
            return None;
        }

        let (impact, word, action) = match trend.direction {
            TrendDirection::Increasing => (
                Impact::Positive,
                "up",
                "Double down on the content driving the growth",
            ),
            _ => (
                Impact::Negative,
                "down",
                "Review recent changes that may be suppressing performance",
            ),
        };
        let relative = if level > 0.0 {
            format!(" ({:+.1}% of the average)", 100.0 * change / level)
        } else {
            String::new()
        };

        Some(
            Insight::new(
                format!("{metric}-trend"),
                InsightCategory::Trend,
                impact,
                trend.confidence,
            )
            .titled(
                format!("{metric} is trending {word}"),
                format!(
                    "{metric} changes by {:.2} per period and is projected to move {:+.1} over the next {} periods{}.",
                    trend.slope, change, self.config.horizon, relative
                ),
            )
            .over(format!("last {} periods", trend.n), trend.n)
            .recommend(action)
            .from_model(ModelKind::LinearTrend),
        )
    }

    fn anomaly_insights(&self, series: &TimeSeries, metric: &str) -> Vec<Insight> {
        let anomalies = detect_series_anomalies(series, &self.config.anomaly);
        let skip = anomalies
            .len()
            .saturating_sub(self.config.max_recent_anomalies);
        anomalies
            .iter()
            .skip(skip)
            .map(|a| anomaly_insight(a, metric))
            .collect()
    }

    fn seasonality_insight(&self, series: &TimeSeries, metric: &str) -> Option<Insight> {
        let config = &self.config.seasonality;
        if config.period == 7 && series.step_days() == 1 {
            let pattern = weekly_seasonality(series, config.min_strength);
            if !pattern.detected {
                return None;
            }
            let (best, worst) = (pattern.strongest_day()?, pattern.weakest_day()?);
            return Some(
                Insight::new(
                    format!("{metric}-seasonality"),
                    InsightCategory::Engagement,
                    Impact::Neutral,
                    pattern.strength,
                )
                .titled(
                    format!("{metric} follows a weekly rhythm"),
                    format!(
                        "The day of week explains {:.0}% of the variation in {metric}; {best:?} is strongest and {worst:?} weakest.",
                        pattern.strength
                    ),
                )
                .over("weekly", series.len())
                .recommend(format!("Schedule key releases for {best:?}"))
                .recommend(format!("Use {worst:?} for maintenance or low-stakes posts")),
            );
        }

        let result = detect_seasonality(&series.values(), config);
        if !result.detected {
            return None;
        }
        let peak = result.peak_position()?;
        Some(
            Insight::new(
                format!("{metric}-seasonality"),
                InsightCategory::Engagement,
                Impact::Neutral,
                result.strength,
            )
            .titled(
                format!("{metric} repeats every {} periods", result.period),
                format!(
                    "Position within the cycle explains {:.0}% of the variation; position {} peaks.",
                    result.strength,
                    peak + 1
                ),
            )
            .over(format!("{}-period cycle", result.period), series.len())
            .recommend("Align publishing with the peak of the cycle"),
        )
    }

    fn forecast_insight(&self, series: &TimeSeries, metric: &str, forecast: &Forecast) -> Option<Insight> {
        let last_actual = series.last_value()?;
        let last_point = forecast.predictions.last()?;
        let first_point = forecast.predictions.first()?;
        let change = last_point.predicted - last_actual;
        let relative = if last_actual != 0.0 {
            change / last_actual.abs()
        } else {
            0.0
        };

        let impact = if relative > 0.0 {
            Impact::Positive
        } else if relative < 0.0 {
            Impact::Negative
        } else {
            Impact::Neutral
        };
        let mut confidence = first_point.confidence;
        if forecast.is_synthetic() {
            confidence = confidence.min(self.config.baseline_max_confidence);
        }
        let recommendation = match impact {
            Impact::Positive => "Plan capacity and promotion around the expected growth",
            Impact::Negative => "Schedule fresh content ahead of the projected dip",
            Impact::Neutral => "Keep the current cadence and monitor",
        };

        Some(
            Insight::new(
                format!("{metric}-forecast"),
                InsightCategory::Opportunity,
                impact,
                confidence,
            )
            .titled(
                format!("{metric} forecast for {}", last_point.date),
                format!(
                    "Expected to reach {:.1} ({:+.1}%) by {}, between {:.1} and {:.1}.",
                    last_point.predicted,
                    100.0 * relative,
                    last_point.date,
                    last_point.lower_bound,
                    last_point.upper_bound
                ),
            )
            .over(format!("next {} periods", forecast.horizon()), series.len())
            .recommend(recommendation)
            .from_model(forecast.model),
        )
    }

    /// Performance-gap insight across the groups of `group_key`.
    ///
    /// Only groups with at least `segment_min_samples` numeric rows are
    /// compared; at least two must qualify. The gap is relative to the
    /// worst mean, or absolute when that mean is zero.
    pub fn compare_segments(
        &self,
        records: &[Record],
        group_key: &str,
        value_key: &str,
        metric: &str,
    ) -> Option<Insight> {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in records {
            let (Some(group), Some(value)) = (record.get(group_key), record.number(value_key))
            else {
                continue;
            };
            groups.entry(group.to_string()).or_default().push(value);
        }

        let qualified: Vec<(String, f64, usize)> = groups
            .into_iter()
            .filter(|(_, values)| values.len() >= self.config.segment_min_samples.max(1))
            .map(|(name, values)| (name, mean(&values), values.len()))
            .collect();
        if qualified.len() < 2 {
            return None;
        }

        let best = qualified.iter().max_by(|a, b| a.1.total_cmp(&b.1))?;
        let worst = qualified.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
        let gap = if worst.1 == 0.0 {
            best.1 - worst.1
        } else {
            (best.1 - worst.1) / worst.1.abs()
        };
        if gap < self.config.segment_min_gap {
            return None;
        }

        let samples = best.2.min(worst.2);
        let confidence = (50.0 + 5.0 * samples as f64).min(95.0);
        let gap_text = if worst.1 == 0.0 {
            format!("{:.1} higher", gap)
        } else {
            format!("{:.0}% higher", 100.0 * gap)
        };

        Some(
            Insight::new(
                format!("{metric}-segment-{}", best.0),
                InsightCategory::Performance,
                Impact::Positive,
                confidence,
            )
            .titled(
                format!("{} outperforms {} on {metric}", best.0, worst.0),
                format!(
                    "{} averages {:.1} against {:.1} for {}, {gap_text}.",
                    best.0, best.1, worst.1, worst.0
                ),
            )
            .over(
                format!("{} segments", qualified.len()),
                qualified.iter().map(|q| q.2).sum(),
            )
            .recommend(format!("Study what drives {} and apply it to {}", best.0, worst.0)),
        )
    }
}

fn anomaly_insight(anomaly: &Anomaly, metric: &str) -> Insight {
    let (impact, word, action) = match anomaly.direction {
        AnomalyDirection::Spike => (
            Impact::Positive,
            "spike",
            "Find what drove the spike and repeat it",
        ),
        AnomalyDirection::Drop => (
            Impact::Negative,
            "drop",
            "Check tracking and distribution around this date",
        ),
    };
    let when = anomaly
        .date
        .map_or_else(|| format!("point {}", anomaly.index), |d| d.to_string());

    Insight::new(
        format!("{metric}-anomaly-{}", anomaly.index),
        InsightCategory::Anomaly,
        impact,
        anomaly.confidence,
    )
    .titled(
        format!("Unusual {word} in {metric} on {when}"),
        format!(
            "{metric} was {:.1} against an expected {:.1} (z = {:.2}).",
            anomaly.value, anomaly.expected, anomaly.z_score
        ),
    )
    .over(when, 1)
    .recommend(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::models::Naive;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn generator() -> InsightGenerator {
        InsightGenerator::new(InsightConfig::default())
    }

    #[test]
    fn strong_trend_produces_trend_insight() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + 5.0 * i as f64).collect();
        let insights = generator().generate(&TimeSeries::daily(start(), &values), "views");

        let trend = insights
            .iter()
            .find(|i| i.category == InsightCategory::Trend)
            .unwrap();
        assert_eq!(trend.impact, Impact::Positive);
        assert_eq!(trend.model, Some(ModelKind::LinearTrend));
        assert_eq!(trend.data_points, 30);
        assert!(trend.confidence > 99.0);
        // ranked by confidence
        assert!(insights
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn tiny_slope_is_not_a_trend() {
        let values: Vec<f64> = (0..30).map(|i| 10_000.0 + 0.01 * i as f64).collect();
        let insights = generator().generate(&TimeSeries::daily(start(), &values), "views");
        assert!(insights.iter().all(|i| i.category != InsightCategory::Trend));
    }

    #[test]
    fn only_recent_anomalies_are_reported() {
        let mut values = vec![50.0; 60];
        for (k, i) in [5usize, 15, 25, 35, 45].iter().enumerate() {
            values[*i] = 50.0 + 100.0 * (k + 1) as f64;
        }
        let config = InsightConfig::default().with_anomaly(AnomalyConfig::z_score(1.0));
        let insights =
            InsightGenerator::new(config).generate(&TimeSeries::daily(start(), &values), "clicks");

        let mut ids: Vec<&str> = insights
            .iter()
            .filter(|i| i.category == InsightCategory::Anomaly)
            .map(|i| i.id.as_str())
            .collect();
        ids.sort_unstable();
        // 15, 25, 35 and 45 are flagged; only the latest three are kept
        assert_eq!(
            ids,
            vec!["clicks-anomaly-25", "clicks-anomaly-35", "clicks-anomaly-45"]
        );
    }

    #[test]
    fn weekly_pattern_produces_engagement_insight() {
        let pattern = [10.0, 12.0, 11.0, 13.0, 25.0, 2.0, 1.0];
        let values: Vec<f64> = (0..28).map(|i| 100.0 + pattern[i % 7]).collect();
        let insights = generator().generate(&TimeSeries::daily(start(), &values), "views");
        let engagement = insights
            .iter()
            .find(|i| i.category == InsightCategory::Engagement)
            .unwrap();
        assert!(engagement.description.contains("Fri"));
        assert_eq!(engagement.recommendations.len(), 2);
    }

    #[test]
    fn short_history_uses_tagged_baseline() {
        let ts = TimeSeries::daily(start(), &[10.0, 12.0, 11.0]);
        let insights = generator().generate(&ts, "views");
        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert!(insight.is_synthetic());
        assert!(insight.confidence <= 40.0);
        assert!(insight.recommendations[0].contains("Collect at least 7"));
    }

    #[test]
    fn forecast_or_baseline_on_empty_series() {
        let config = InsightConfig::default()
            .with_forecast(ForecastConfig::default().with_origin(start()));
        let forecast =
            InsightGenerator::new(config).forecast_or_baseline(&TimeSeries::default(), 3);
        assert_eq!(forecast.model, ModelKind::SyntheticBaseline);
        assert_eq!(forecast.horizon(), 3);
        assert_eq!(forecast.predictions[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(forecast.bounds_are_ordered());
    }

    #[test]
    fn infinite_baseline_noise_is_rejected_and_never_panics() {
        let mut config = InsightConfig::default()
            .with_forecast(ForecastConfig::default().with_origin(start()));
        config.baseline.noise = f64::INFINITY;
        assert!(matches!(config.validate(), Err(EngineError::InvalidParameter(_))));

        let forecast = InsightGenerator::new(config).forecast_or_baseline(&TimeSeries::default(), 3);
        assert_eq!(forecast.horizon(), 3);
        assert!(forecast.bounds_are_ordered());
    }

    #[test]
    fn forecast_or_baseline_fits_when_history_suffices() {
        let values: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();
        let forecast = generator().forecast_or_baseline(&TimeSeries::daily(start(), &values), 2);
        assert_eq!(forecast.model, ModelKind::LinearTrend);
        assert!((forecast.predictions[0].predicted - 20.0).abs() < 1e-9);
    }

    #[test]
    fn supplied_forecast_drives_the_forecast_insight() {
        let values: Vec<f64> = (0..20).map(|i| 40.0 + 2.0 * i as f64).collect();
        let ts = TimeSeries::daily(start(), &values);
        let generator = generator();

        let own = generator.forecast_or_baseline(&ts, 7);
        assert_eq!(
            generator.generate(&ts, "views"),
            generator.generate_with_forecast(&ts, "views", &own)
        );

        let naive = build_forecast(&mut Naive::new(), &ts, 3, &ForecastConfig::default()).unwrap();
        let insights = generator.generate_with_forecast(&ts, "views", &naive);
        let forecast = insights.iter().find(|i| i.id == "views-forecast").unwrap();
        assert_eq!(forecast.model, Some(ModelKind::Naive));
        assert_eq!(forecast.timeframe, "next 3 periods");
        assert_eq!(forecast.impact, Impact::Neutral);
    }

    fn segment_rows() -> Vec<Record> {
        let mut rows = Vec::new();
        for (group, values) in [("video", [30.0, 34.0, 32.0]), ("blog", [10.0, 12.0, 11.0])] {
            for v in values {
                rows.push(Record::new().with("format", group).with("ctr", v));
            }
        }
        rows.push(Record::new().with("format", "podcast").with("ctr", 99.0));
        rows.push(Record::new().with("format", "blog").with("ctr", Value::Text("n/a".into())));
        rows
    }

    #[test]
    fn segment_gap_above_threshold() {
        let insight = generator()
            .compare_segments(&segment_rows(), "format", "ctr", "ctr")
            .unwrap();
        assert_eq!(insight.category, InsightCategory::Performance);
        assert!(insight.title.starts_with("video outperforms blog"));
        // podcast has one row and is ignored
        assert_eq!(insight.data_points, 6);
        assert!(insight.description.contains("191% higher"));
    }

    #[test]
    fn segment_gap_below_threshold_or_too_few_samples() {
        let strict = InsightGenerator::new(InsightConfig::default().with_segment_thresholds(5.0, 3));
        assert!(strict
            .compare_segments(&segment_rows(), "format", "ctr", "ctr")
            .is_none());

        let sparse = InsightGenerator::new(InsightConfig::default().with_segment_thresholds(0.1, 4));
        assert!(sparse
            .compare_segments(&segment_rows(), "format", "ctr", "ctr")
            .is_none());
    }

    #[test]
    fn zero_worst_mean_uses_absolute_gap() {
        let rows: Vec<Record> = [("a", 0.0), ("a", 0.0), ("a", 0.0), ("b", 1.0), ("b", 1.0), ("b", 1.0)]
            .into_iter()
            .map(|(g, v)| Record::new().with("g", g).with("v", v))
            .collect();
        let insight = generator().compare_segments(&rows, "g", "v", "v").unwrap();
        assert!(insight.description.contains("1.0 higher"));
    }
}

//! Caller-owned analytics service.
//!
//! Buffers records per metric between `start()` and `stop()`; `flush()`
//! runs the full pipeline on each metric and clears the buffer. Nothing is
//! shared between service instances.

use crate::config::EngineConfig;
use crate::core::{Forecast, Record, TimeSeries};
use crate::error::{EngineError, Result};
use crate::insights::{Insight, InsightGenerator};
use crate::transform::apply_pipeline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything computed for one metric on flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub metric: String,
    /// Rows after the transform pipeline.
    pub records: Vec<Record>,
    /// Points that made it into the series.
    pub series_len: usize,
    pub forecast: Forecast,
    pub insights: Vec<Insight>,
}

/// Analytics service with an explicit lifecycle.
///
/// The series for a metric is read from the field named after the metric
/// (after transforms, so it may be a formula output), dated by the
/// configured `date_key`.
///
/// # Example
/// ```
/// use insight_forecast::config::EngineConfig;
/// use insight_forecast::core::Record;
/// use insight_forecast::service::AnalyticsService;
///
/// let mut service = AnalyticsService::new(EngineConfig::default()).unwrap();
/// service.start();
///
/// let rows: Vec<Record> = (1..=9)
///     .map(|d| Record::new().with("date", format!("2024-01-0{d}")).with("views", 10.0 * d as f64))
///     .collect();
/// service.ingest("views", rows).unwrap();
///
/// let reports = service.flush().unwrap();
/// assert_eq!(reports[0].series_len, 9);
/// assert!(!reports[0].insights.is_empty());
/// service.stop();
/// ```
#[derive(Debug)]
pub struct AnalyticsService {
    config: EngineConfig,
    generator: InsightGenerator,
    buffer: BTreeMap<String, Vec<Record>>,
    running: bool,
}

impl AnalyticsService {
    /// Create a stopped service; the configuration is validated first.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator: InsightGenerator::new(config.insights.clone()),
            config,
            buffer: BTreeMap::new(),
            running: false,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            info!("analytics service started");
        }
    }

    /// Stop the service, discarding anything not yet flushed.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        let discarded = self.buffered();
        if discarded > 0 {
            warn!(discarded, "analytics service stopped with unflushed records");
        }
        self.buffer.clear();
        self.running = false;
        info!("analytics service stopped");
    }

    /// Buffer `records` for `metric`. Returns the rows now buffered for it.
    pub fn ingest<I>(&mut self, metric: &str, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        if !self.running {
            return Err(EngineError::ServiceNotRunning);
        }
        let rows = self.buffer.entry(metric.to_string()).or_default();
        let before = rows.len();
        rows.extend(records);
        debug!(metric, added = rows.len() - before, buffered = rows.len(), "records ingested");
        Ok(rows.len())
    }

    /// Total rows waiting for the next flush.
    pub fn buffered(&self) -> usize {
        self.buffer.values().map(Vec::len).sum()
    }

    /// Analyze every buffered metric, in metric-name order, and clear the
    /// buffer.
    pub fn flush(&mut self) -> Result<Vec<MetricReport>> {
        if !self.running {
            return Err(EngineError::ServiceNotRunning);
        }
        let started = Instant::now();
        let buffer = std::mem::take(&mut self.buffer);
        let reports: Vec<MetricReport> = buffer
            .into_iter()
            .map(|(metric, rows)| self.analyze(metric, &rows))
            .collect();

        info!(
            metrics = reports.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analytics flush complete"
        );
        Ok(reports)
    }

    fn analyze(&self, metric: String, rows: &[Record]) -> MetricReport {
        let records = apply_pipeline(rows, &self.config.transform);
        let series = TimeSeries::from_records(&records, &self.config.transform.date_key, &metric);
        let forecast = self
            .generator
            .forecast_or_baseline(&series, self.config.insights.horizon);
        let insights = self
            .generator
            .generate_with_forecast(&series, &metric, &forecast);

        debug!(
            metric = %metric,
            rows = rows.len(),
            points = series.len(),
            model = %forecast.model,
            insights = insights.len(),
            "metric analyzed"
        );
        MetricReport {
            series_len: series.len(),
            metric,
            records,
            forecast,
            insights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelKind;
    use crate::transform::TransformConfig;

    fn rows(metric: &str, values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Record::new()
                    .with("date", format!("2024-02-{:02}", i + 1))
                    .with(metric, v)
            })
            .collect()
    }

    #[test]
    fn not_running_rejects_ingest_and_flush() {
        let mut service = AnalyticsService::new(EngineConfig::default()).unwrap();
        assert_eq!(
            service.ingest("views", rows("views", &[1.0])),
            Err(EngineError::ServiceNotRunning)
        );
        assert_eq!(service.flush(), Err(EngineError::ServiceNotRunning));

        service.start();
        service.stop();
        assert_eq!(service.flush(), Err(EngineError::ServiceNotRunning));
    }

    #[test]
    fn flush_reports_each_metric_and_clears() {
        let mut service = AnalyticsService::new(EngineConfig::default()).unwrap();
        service.start();
        let views: Vec<f64> = (0..20).map(|i| 100.0 + 3.0 * i as f64).collect();
        service.ingest("views", rows("views", &views)).unwrap();
        assert_eq!(service.ingest("clicks", rows("clicks", &[4.0, 5.0])).unwrap(), 2);
        assert_eq!(service.buffered(), 22);

        let reports = service.flush().unwrap();
        assert_eq!(service.buffered(), 0);
        let metrics: Vec<&str> = reports.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["clicks", "views"]);

        assert_eq!(reports[0].forecast.model, ModelKind::SyntheticBaseline);
        assert!(reports[0].insights[0].is_synthetic());
        assert_eq!(reports[1].forecast.model, ModelKind::LinearTrend);
        assert_eq!(reports[1].series_len, 20);
        assert_eq!(reports[1].forecast.horizon(), 7);
        let last = reports[1].forecast.predictions.last().unwrap();
        let forecast_insight = reports[1]
            .insights
            .iter()
            .find(|i| i.id == "views-forecast")
            .unwrap();
        assert!(forecast_insight.title.contains(&last.date.to_string()));

        assert!(service.flush().unwrap().is_empty());
    }

    #[test]
    fn formula_output_can_be_the_metric() {
        let config = EngineConfig::default()
            .with_transform(TransformConfig::default().with_formula("ctr", "clicks * 100 / views"));
        let mut service = AnalyticsService::new(config).unwrap();
        service.start();
        let input: Vec<Record> = (1..=10)
            .map(|d| {
                Record::new()
                    .with("date", format!("2024-03-{d:02}"))
                    .with("clicks", d as f64)
                    .with("views", 50.0)
            })
            .collect();
        service.ingest("ctr", input).unwrap();
        let report = service.flush().unwrap().remove(0);
        assert_eq!(report.series_len, 10);
        assert_eq!(report.records[0].number("ctr"), Some(2.0));
    }

    #[test]
    fn stop_discards_buffer() {
        let mut service = AnalyticsService::new(EngineConfig::default()).unwrap();
        service.start();
        service.ingest("views", rows("views", &[1.0, 2.0])).unwrap();
        service.stop();
        assert!(!service.is_running());
        assert_eq!(service.buffered(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.cv.test_size = 0;
        assert!(matches!(AnalyticsService::new(config), Err(EngineError::Config(_))));
    }
}

//! Insight records handed to the presentation layer.

use crate::core::ModelKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the finding is good or bad news for the metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

/// Kind of finding. Declaration order breaks confidence ties when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Performance,
    Engagement,
    Trend,
    Anomaly,
    Opportunity,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Performance => "performance",
            InsightCategory::Engagement => "engagement",
            InsightCategory::Trend => "trend",
            InsightCategory::Anomaly => "anomaly",
            InsightCategory::Opportunity => "opportunity",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked, human-readable finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 0–100.
    pub confidence: f64,
    pub impact: Impact,
    pub category: InsightCategory,
    pub timeframe: String,
    pub recommendations: Vec<String>,
    /// Number of observations the finding rests on.
    pub data_points: usize,
    /// Model behind the finding, if any. `SyntheticBaseline` marks
    /// degraded-mode output.
    pub model: Option<ModelKind>,
}

impl Insight {
    pub(crate) fn new(
        id: impl Into<String>,
        category: InsightCategory,
        impact: Impact,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            confidence: confidence.clamp(0.0, 100.0),
            impact,
            category,
            timeframe: String::new(),
            recommendations: Vec::new(),
            data_points: 0,
            model: None,
        }
    }

    pub(crate) fn titled(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.title = title.into();
        self.description = description.into();
        self
    }

    pub(crate) fn over(mut self, timeframe: impl Into<String>, data_points: usize) -> Self {
        self.timeframe = timeframe.into();
        self.data_points = data_points;
        self
    }

    pub(crate) fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub(crate) fn from_model(mut self, model: ModelKind) -> Self {
        self.model = Some(model);
        self
    }

    /// True when the finding comes from the synthetic fallback.
    pub fn is_synthetic(&self) -> bool {
        self.model == Some(ModelKind::SyntheticBaseline)
    }
}

/// Sort by confidence (descending), then category order.
pub(crate) fn rank_insights(insights: &mut [Insight]) {
    insights.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(a.category.cmp(&b.category))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_serialize_lowercase() {
        let json = serde_json::to_string(&InsightCategory::Opportunity).unwrap();
        assert_eq!(json, "\"opportunity\"");
        let impact: Impact = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(impact, Impact::Negative);
    }

    #[test]
    fn ranking_uses_confidence_then_category() {
        let mut insights = vec![
            Insight::new("a", InsightCategory::Opportunity, Impact::Neutral, 80.0),
            Insight::new("b", InsightCategory::Trend, Impact::Positive, 90.0),
            Insight::new("c", InsightCategory::Anomaly, Impact::Negative, 80.0),
        ];
        rank_insights(&mut insights);
        let ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn confidence_is_clamped() {
        let insight = Insight::new("x", InsightCategory::Trend, Impact::Neutral, 140.0);
        assert_eq!(insight.confidence, 100.0);
    }
}

//! Ranked comparison of candidate models.

use crate::core::{Forecast, ModelKind};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// One candidate's place in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    pub name: String,
    /// Position of the candidate in the input list.
    pub index: usize,
    pub model: ModelKind,
    /// Attached for the best-ranked models only.
    pub forecast: Option<Forecast>,
    /// Lower is better; `f64::INFINITY` when every iteration failed.
    pub score: f64,
    /// 1 = best.
    pub rank: usize,
    pub valid_iterations: usize,
    pub failed_iterations: usize,
}

/// Aggregates over the finite scores of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub best_score: f64,
    pub mean_score: f64,
    pub evaluated_models: usize,
    pub iterations: usize,
}

/// Models ranked by score, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub models: Vec<RankedModel>,
    pub summary: ComparisonSummary,
}

impl ModelComparison {
    /// Sort `models` by score (stable, so ties keep input order), assign
    /// ranks and compute the summary.
    ///
    /// Fails with [`EngineError::NoValidModel`] when no score is finite.
    pub(crate) fn rank(mut models: Vec<RankedModel>, iterations: usize) -> Result<Self> {
        let finite: Vec<f64> = models
            .iter()
            .map(|m| m.score)
            .filter(|s| s.is_finite())
            .collect();
        if finite.is_empty() {
            return Err(EngineError::NoValidModel);
        }

        models.sort_by(|a, b| a.score.total_cmp(&b.score));
        for (i, model) in models.iter_mut().enumerate() {
            model.rank = i + 1;
        }

        let best_score = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mean_score = finite.iter().sum::<f64>() / finite.len() as f64;
        Ok(Self {
            summary: ComparisonSummary {
                best_score,
                mean_score,
                evaluated_models: models.len(),
                iterations,
            },
            models,
        })
    }

    /// The rank-1 model.
    pub fn best(&self) -> Option<&RankedModel> {
        self.models.first()
    }

    pub fn get(&self, name: &str) -> Option<&RankedModel> {
        self.models.iter().find(|m| m.name == name)
    }
}

//! Forecaster trait defining the common interface for all models.

use crate::core::{ModelKind, Projection, TimeSeries};
use crate::error::Result;
use std::collections::BTreeMap;

/// Common interface for all forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster + Send>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Projection>;

    /// Generate predictions with confidence intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Model family tag.
    fn kind(&self) -> ModelKind;

    /// Display name, including parameters where they matter.
    fn name(&self) -> &str;

    /// Named parameters of the fitted model.
    fn parameters(&self) -> BTreeMap<String, f64> {
        BTreeMap::new()
    }

    /// Number of estimated parameters, used by information criteria.
    fn parameter_count(&self) -> usize {
        self.parameters().len().max(1)
    }

    /// True when the fit carries little information (too few points or a
    /// degenerate design).
    fn low_confidence(&self) -> bool {
        false
    }

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

impl<T: Forecaster + ?Sized> Forecaster for Box<T> {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        (**self).fit(series)
    }

    fn predict(&self, horizon: usize) -> Result<Projection> {
        (**self).predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Projection> {
        (**self).predict_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        (**self).fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        (**self).residuals()
    }

    fn kind(&self) -> ModelKind {
        (**self).kind()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        (**self).parameters()
    }

    fn parameter_count(&self) -> usize {
        (**self).parameter_count()
    }

    fn low_confidence(&self) -> bool {
        (**self).low_confidence()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use insight_forecast::models::{BoxedForecaster, Forecaster, Naive};
///
/// let model: BoxedForecaster = Box::new(Naive::new());
/// assert_eq!(model.name(), "Naive");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster + Send>;

/// A named model factory.
///
/// Validators call [`ModelSpec::create`] once per fold so no state leaks
/// between iterations.
///
/// # Example
///
/// ```
/// use insight_forecast::models::{ModelSpec, Naive, SeasonalNaive};
///
/// let specs = vec![
///     ModelSpec::new("Naive", || Box::new(Naive::new())),
///     ModelSpec::with_period("SeasonalNaive", |p| Box::new(SeasonalNaive::new(p)), 7),
/// ];
///
/// for spec in &specs {
///     let model = spec.create();
///     assert!(!model.is_fitted());
/// }
/// ```
pub struct ModelSpec {
    /// Display name of the model
    pub name: String,
    factory: Box<dyn Fn() -> BoxedForecaster + Send + Sync>,
}

impl ModelSpec {
    /// Create a model spec with a simple factory.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> BoxedForecaster + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// Create a model spec with a period or window parameter.
    pub fn with_period<F>(name: impl Into<String>, factory: F, period: usize) -> Self
    where
        F: Fn(usize) -> BoxedForecaster + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(move || factory(period)),
        }
    }

    /// Create a new model instance.
    pub fn create(&self) -> BoxedForecaster {
        (self.factory)()
    }
}

impl std::fmt::Debug for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSpec").field("name", &self.name).finish()
    }
}

/// Ordered collection of candidate models.
///
/// # Example
///
/// ```
/// use insight_forecast::models::{ModelRegistry, ModelSpec, Naive};
///
/// let mut registry = ModelRegistry::new();
/// registry.register(ModelSpec::new("Naive", || Box::new(Naive::new())));
///
/// for spec in registry.iter() {
///     let model = spec.create();
///     assert_eq!(model.name(), spec.name);
/// }
/// ```
#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// Default candidates: linear trend, naive, 7-point moving average,
    /// exponential smoothing and weekly seasonal naive.
    pub fn standard() -> Self {
        use super::{
            LinearTrend, Naive, SeasonalNaive, SimpleExponentialSmoothing, SimpleMovingAverage,
        };

        let mut registry = Self::new();
        registry.register(ModelSpec::new("LinearTrend", || {
            Box::new(LinearTrend::new())
        }));
        registry.register(ModelSpec::new("Naive", || Box::new(Naive::new())));
        registry.register(ModelSpec::with_period(
            "SMA(7)",
            |w| Box::new(SimpleMovingAverage::new(w)),
            7,
        ));
        registry.register(ModelSpec::new("SES(0.3)", || {
            Box::new(SimpleExponentialSmoothing::new(0.3))
        }));
        registry.register(ModelSpec::with_period(
            "SeasonalNaive(7)",
            |p| Box::new(SeasonalNaive::new(p)),
            7,
        ));
        registry
    }

    /// Register a model specification.
    pub fn register(&mut self, spec: ModelSpec) {
        self.models.push(spec);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }

    pub fn specs(&self) -> &[ModelSpec] {
        &self.models
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

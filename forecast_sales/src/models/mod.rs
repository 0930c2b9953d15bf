//! Forecasting strategies over feature frames

use chrono::NaiveDate;
use std::fmt::Debug;

use crate::error::{ForecastError, Result};
use crate::features::FeatureFrame;

/// Forecast result: one (date, value, confidence) triple per horizon step
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub(crate) target_dates: Vec<NaiveDate>,
    pub(crate) values: Vec<f64>,
    pub(crate) confidences: Vec<f64>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(
        target_dates: Vec<NaiveDate>,
        values: Vec<f64>,
        confidences: Vec<f64>,
    ) -> Result<Self> {
        if values.len() != target_dates.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match target dates ({})",
                values.len(),
                target_dates.len()
            )));
        }
        if confidences.len() != target_dates.len() {
            return Err(ForecastError::ValidationError(format!(
                "Confidences length ({}) doesn't match target dates ({})",
                confidences.len(),
                target_dates.len()
            )));
        }
        if let Some(bad) = confidences.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(ForecastError::ValidationError(format!(
                "Confidence {bad} outside [0, 1]"
            )));
        }
        Ok(Self {
            target_dates,
            values,
            confidences,
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the per-step confidence scores
    pub fn confidences(&self) -> &[f64] {
        &self.confidences
    }

    /// Get the forecasted dates
    pub fn target_dates(&self) -> &[NaiveDate] {
        &self.target_dates
    }

    /// Number of horizon steps
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (target_date, value, confidence) triples.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64, f64)> + '_ {
        self.target_dates
            .iter()
            .zip(self.values.iter())
            .zip(self.confidences.iter())
            .map(|((date, value), confidence)| (*date, *value, *confidence))
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        if self.values.len() != actual.len() || actual.is_empty() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }
        let sum: f64 = self
            .values
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).abs())
            .sum();
        Ok(sum / self.values.len() as f64)
    }

    /// Calculate mean squared error between forecast and actual values
    pub fn mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        if self.values.len() != actual.len() || actual.is_empty() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }
        let sum: f64 = self
            .values
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).powi(2))
            .sum();
        Ok(sum / self.values.len() as f64)
    }
}

/// Fitted strategy state, ready to forecast
pub trait TrainedForecastModel: Debug {
    /// Forecast a value and confidence for each requested target date
    fn predict(&self, target_dates: &[NaiveDate]) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecasting strategy that can be fitted to a feature frame
pub trait ForecastModel: Debug + Clone {
    /// The type of trained state produced
    type Trained: TrainedForecastModel;

    /// Fit the strategy to historical features
    fn fit(&self, frame: &FeatureFrame) -> Result<Self::Trained>;

    /// Get the name of the strategy
    fn name(&self) -> &str;
}

/// Confidence for one horizon step: the base score shrinks with horizon
/// distance and with historical volatility, clamped to [0, 1]. Monotonically
/// non-increasing in `step`.
pub(crate) fn horizon_confidence(
    base: f64,
    decay_per_day: f64,
    volatility_weight: f64,
    volatility: f64,
    step: usize,
) -> f64 {
    (base - decay_per_day * (step as f64 + 1.0) - volatility_weight * volatility).clamp(0.0, 1.0)
}

pub mod delegate;
pub mod seasonal_trend;

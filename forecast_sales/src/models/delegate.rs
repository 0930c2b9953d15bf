//! Pluggable slot for external forecasting delegates

use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::features::FeatureFrame;
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

type FitFn = dyn Fn(&FeatureFrame) -> Result<TrainedDelegate> + Send + Sync;
type PredictFn = dyn Fn(&[NaiveDate]) -> Result<ForecastResult> + Send + Sync;

/// Wraps an external forecasting implementation behind the strategy trait
/// pair. The delegate owns its own training protocol; a delegate driven
/// before its backing model is ready should return `ModelNotTrained`.
pub struct DelegateModel {
    name: String,
    fit_fn: Arc<FitFn>,
}

impl DelegateModel {
    pub fn new<F>(name: impl Into<String>, fit_fn: F) -> Self
    where
        F: Fn(&FeatureFrame) -> Result<TrainedDelegate> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fit_fn: Arc::new(fit_fn),
        }
    }
}

impl Clone for DelegateModel {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fit_fn: Arc::clone(&self.fit_fn),
        }
    }
}

impl fmt::Debug for DelegateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateModel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ForecastModel for DelegateModel {
    type Trained = TrainedDelegate;

    fn fit(&self, frame: &FeatureFrame) -> Result<TrainedDelegate> {
        (self.fit_fn)(frame)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted external delegate
pub struct TrainedDelegate {
    name: String,
    predict_fn: Arc<PredictFn>,
}

impl TrainedDelegate {
    pub fn new<F>(name: impl Into<String>, predict_fn: F) -> Self
    where
        F: Fn(&[NaiveDate]) -> Result<ForecastResult> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predict_fn: Arc::new(predict_fn),
        }
    }
}

impl fmt::Debug for TrainedDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedDelegate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TrainedForecastModel for TrainedDelegate {
    fn predict(&self, target_dates: &[NaiveDate]) -> Result<ForecastResult> {
        (self.predict_fn)(target_dates)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

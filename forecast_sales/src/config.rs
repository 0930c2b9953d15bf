//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ForecastError, Result};
use crate::features::FeatureGranularity;

/// Tunable knobs for feature building, forecasting and metric targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum number of distinct observed days required to build features.
    pub min_history_days: usize,
    /// Confidence of the nearest-horizon forecast before penalties.
    pub base_confidence: f64,
    /// Confidence lost per day of horizon distance.
    pub confidence_decay_per_day: f64,
    /// Weight of historical volatility in the confidence penalty.
    pub volatility_weight: f64,
    /// Upper bound on requested forecast horizons.
    pub max_horizon_days: u32,
    /// Whether features are bucketed per day or kept per raw observation.
    pub granularity: FeatureGranularity,
    /// Optional daily sales target; metric variance is reported against it.
    pub daily_sales_target: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_history_days: 14,
            base_confidence: 0.95,
            confidence_decay_per_day: 0.01,
            volatility_weight: 0.1,
            max_horizon_days: 30,
            granularity: FeatureGranularity::Daily,
            daily_sales_target: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_history_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_history_days must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.base_confidence) {
            return Err(ForecastError::InvalidParameter(format!(
                "base_confidence must be within [0, 1], got {}",
                self.base_confidence
            )));
        }
        if self.confidence_decay_per_day < 0.0 || !self.confidence_decay_per_day.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "confidence_decay_per_day must be non-negative".to_string(),
            ));
        }
        if self.volatility_weight < 0.0 || !self.volatility_weight.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "volatility_weight must be non-negative".to_string(),
            ));
        }
        if self.max_horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_horizon_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

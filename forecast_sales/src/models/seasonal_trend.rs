//! Deterministic seasonal-plus-trend baseline strategy

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::statistics::Statistics;
use std::f64::consts::PI;

use crate::error::{ForecastError, Result};
use crate::features::FeatureFrame;
use crate::models::{horizon_confidence, ForecastModel, ForecastResult, TrainedForecastModel};

const ANNUAL_PERIOD: f64 = 365.25;
const WEEKLY_PERIOD: f64 = 7.0;

/// Baseline strategy: least-squares linear trend plus annual and weekly
/// sine-cosine seasonality plus bounded uniform noise from an explicit seed.
///
/// Given identical history and the same seed, two runs produce bit-identical
/// forecasts; randomness never comes from ambient entropy.
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    name: String,
    seed: u64,
    noise_amplitude: f64,
    base_confidence: f64,
    confidence_decay_per_day: f64,
    volatility_weight: f64,
}

/// Fitted seasonal-trend state
#[derive(Debug, Clone)]
pub struct TrainedSeasonalTrend {
    name: String,
    seed: u64,
    noise_amplitude: f64,
    base_confidence: f64,
    confidence_decay_per_day: f64,
    volatility_weight: f64,
    /// First date of the fitted history; day offsets count from here.
    origin: NaiveDate,
    intercept: f64,
    slope: f64,
    annual_sin: f64,
    annual_cos: f64,
    weekly_sin: f64,
    weekly_cos: f64,
    /// Residual coefficient of variation of the fitted history.
    volatility: f64,
}

impl SeasonalTrend {
    pub fn new(seed: u64) -> Self {
        Self {
            name: format!("Seasonal Trend (seed={seed})"),
            seed,
            noise_amplitude: 5.0,
            base_confidence: 0.95,
            confidence_decay_per_day: 0.01,
            volatility_weight: 0.1,
        }
    }

    /// Bound of the uniform noise added to each forecasted value.
    pub fn with_noise_amplitude(mut self, amplitude: f64) -> Result<Self> {
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Noise amplitude must be non-negative".to_string(),
            ));
        }
        self.noise_amplitude = amplitude;
        Ok(self)
    }

    /// Confidence shape: starting score, per-day decay and volatility weight.
    pub fn with_confidence(
        mut self,
        base: f64,
        decay_per_day: f64,
        volatility_weight: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&base) {
            return Err(ForecastError::InvalidParameter(format!(
                "Base confidence must be within [0, 1], got {base}"
            )));
        }
        if decay_per_day < 0.0 || !decay_per_day.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Confidence decay must be non-negative".to_string(),
            ));
        }
        if volatility_weight < 0.0 || !volatility_weight.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Volatility weight must be non-negative".to_string(),
            ));
        }
        self.base_confidence = base;
        self.confidence_decay_per_day = decay_per_day;
        self.volatility_weight = volatility_weight;
        Ok(self)
    }
}

impl ForecastModel for SeasonalTrend {
    type Trained = TrainedSeasonalTrend;

    fn fit(&self, frame: &FeatureFrame) -> Result<TrainedSeasonalTrend> {
        let dates = frame.dates()?;
        let targets = frame.targets()?;
        if targets.len() < 2 {
            return Err(ForecastError::InsufficientHistory(format!(
                "Seasonal trend fit needs at least 2 rows, found {}",
                targets.len()
            )));
        }

        let origin = dates[0];
        let t: Vec<f64> = dates
            .iter()
            .map(|d| (*d - origin).num_days() as f64)
            .collect();

        // Least squares linear trend
        let n = t.len() as f64;
        let sum_t: f64 = t.iter().sum();
        let sum_y: f64 = targets.iter().sum();
        let sum_ty: f64 = t.iter().zip(targets.iter()).map(|(x, y)| x * y).sum();
        let sum_tt: f64 = t.iter().map(|x| x * x).sum();
        let denominator = n * sum_tt - sum_t * sum_t;
        let slope = if denominator.abs() < f64::EPSILON {
            0.0
        } else {
            (n * sum_ty - sum_t * sum_y) / denominator
        };
        let intercept = (sum_y - slope * sum_t) / n;

        // Project the detrended series on the annual and weekly harmonics
        let detrended: Vec<f64> = t
            .iter()
            .zip(targets.iter())
            .map(|(x, y)| y - (intercept + slope * x))
            .collect();
        let (annual_sin, annual_cos) = harmonic_fit(&t, &detrended, ANNUAL_PERIOD);
        let (weekly_sin, weekly_cos) = harmonic_fit(&t, &detrended, WEEKLY_PERIOD);

        let residuals: Vec<f64> = t
            .iter()
            .zip(detrended.iter())
            .map(|(x, d)| {
                d - seasonal_term(annual_sin, annual_cos, weekly_sin, weekly_cos, *x)
            })
            .collect();
        let residual_std = if residuals.len() < 2 {
            0.0
        } else {
            residuals.iter().std_dev()
        };
        let mean_level = targets.iter().mean();
        let volatility = if mean_level.abs() < f64::EPSILON {
            0.0
        } else {
            (residual_std / mean_level).abs()
        };

        Ok(TrainedSeasonalTrend {
            name: self.name.clone(),
            seed: self.seed,
            noise_amplitude: self.noise_amplitude,
            base_confidence: self.base_confidence,
            confidence_decay_per_day: self.confidence_decay_per_day,
            volatility_weight: self.volatility_weight,
            origin,
            intercept,
            slope,
            annual_sin,
            annual_cos,
            weekly_sin,
            weekly_cos,
            volatility,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSeasonalTrend {
    fn predict(&self, target_dates: &[NaiveDate]) -> Result<ForecastResult> {
        if target_dates.is_empty() {
            return Err(ForecastError::ValidationError(
                "No target dates requested".to_string(),
            ));
        }

        // A fresh generator per call keeps a fixed seed bit-reproducible.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut values = Vec::with_capacity(target_dates.len());
        let mut confidences = Vec::with_capacity(target_dates.len());

        for (step, date) in target_dates.iter().enumerate() {
            let t = (*date - self.origin).num_days() as f64;
            let seasonal = seasonal_term(
                self.annual_sin,
                self.annual_cos,
                self.weekly_sin,
                self.weekly_cos,
                t,
            );
            let noise = if self.noise_amplitude > 0.0 {
                rng.gen_range(-self.noise_amplitude..=self.noise_amplitude)
            } else {
                0.0
            };
            // Sales never go negative
            let value = (self.intercept + self.slope * t + seasonal + noise).max(0.0);
            values.push(value);
            confidences.push(horizon_confidence(
                self.base_confidence,
                self.confidence_decay_per_day,
                self.volatility_weight,
                self.volatility,
                step,
            ));
        }

        ForecastResult::new(target_dates.to_vec(), values, confidences)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Least-squares amplitude of one sin/cos harmonic over day offsets.
fn harmonic_fit(t: &[f64], values: &[f64], period: f64) -> (f64, f64) {
    let n = values.len() as f64;
    let omega = 2.0 * PI / period;
    let sin_coef = 2.0 / n
        * t.iter()
            .zip(values.iter())
            .map(|(x, y)| y * (omega * x).sin())
            .sum::<f64>();
    let cos_coef = 2.0 / n
        * t.iter()
            .zip(values.iter())
            .map(|(x, y)| y * (omega * x).cos())
            .sum::<f64>();
    (sin_coef, cos_coef)
}

fn seasonal_term(
    annual_sin: f64,
    annual_cos: f64,
    weekly_sin: f64,
    weekly_cos: f64,
    t: f64,
) -> f64 {
    let annual = 2.0 * PI * t / ANNUAL_PERIOD;
    let weekly = 2.0 * PI * t / WEEKLY_PERIOD;
    annual_sin * annual.sin()
        + annual_cos * annual.cos()
        + weekly_sin * weekly.sin()
        + weekly_cos * weekly.cos()
}

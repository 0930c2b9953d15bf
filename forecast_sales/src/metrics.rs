//! Business metric aggregation with idempotent upserts

use chrono::{Duration, NaiveDate};

use sales_store::{BusinessMetric, MetricCategory, NewMetric, SalesStore};

use crate::config::EngineConfig;
use crate::error::{ForecastError, Result};

pub const DAILY_SALES_TOTAL: &str = "daily_sales_total";
pub const DAILY_SALES_GROWTH: &str = "daily_sales_growth";
pub const WEEKLY_SALES_GROWTH: &str = "weekly_sales_growth";
pub const MODEL_ACCURACY_AVG: &str = "model_accuracy_avg";
pub const AVG_PREDICTION_ERROR: &str = "avg_prediction_error";
pub const DAILY_MARKETING_SPEND: &str = "daily_marketing_spend";

/// Trailing window for the prediction-error rollup, in days.
const PREDICTION_ERROR_WINDOW_DAYS: i64 = 30;

/// Recomputes point-in-time business metrics from observations, predictions
/// and model records.
pub struct MetricsAggregator<'a> {
    store: &'a SalesStore,
    config: &'a EngineConfig,
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(store: &'a SalesStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Recompute every metric for one date.
    ///
    /// Each metric upserts its (metric_name, metric_date) row, so any number
    /// of reruns over unchanged data converge to the same single row per
    /// metric. A metric whose inputs are undefined (a zero growth
    /// denominator, no active models, no resolved predictions) is omitted
    /// with a log line, never an error; a date with no sales rows yields a
    /// literal zero total.
    pub fn recompute(&self, metric_date: NaiveDate) -> Result<Vec<BusinessMetric>> {
        let mut metrics = Vec::new();

        let daily_total = self.store.daily_total(metric_date)?.unwrap_or(0.0);
        metrics.push(self.store.upsert_metric(&NewMetric {
            metric_name: DAILY_SALES_TOTAL.to_string(),
            metric_value: daily_total,
            metric_date,
            category: MetricCategory::Sales,
            target_value: self.config.daily_sales_target,
        })?);

        match self.daily_growth(metric_date, daily_total) {
            Ok(value) => metrics.push(self.store.upsert_metric(&NewMetric {
                metric_name: DAILY_SALES_GROWTH.to_string(),
                metric_value: value,
                metric_date,
                category: MetricCategory::Sales,
                target_value: None,
            })?),
            Err(ForecastError::DivisionUndefined(reason)) => {
                log::warn!("{DAILY_SALES_GROWTH} omitted for {metric_date}: {reason}");
            }
            Err(other) => return Err(other),
        }

        match self.weekly_growth(metric_date) {
            Ok(value) => metrics.push(self.store.upsert_metric(&NewMetric {
                metric_name: WEEKLY_SALES_GROWTH.to_string(),
                metric_value: value,
                metric_date,
                category: MetricCategory::Sales,
                target_value: None,
            })?),
            Err(ForecastError::DivisionUndefined(reason)) => {
                log::warn!("{WEEKLY_SALES_GROWTH} omitted for {metric_date}: {reason}");
            }
            Err(other) => return Err(other),
        }

        if let Some(value) = self.model_accuracy()? {
            metrics.push(self.store.upsert_metric(&NewMetric {
                metric_name: MODEL_ACCURACY_AVG.to_string(),
                metric_value: value,
                metric_date,
                category: MetricCategory::Ml,
                target_value: None,
            })?);
        } else {
            log::debug!("{MODEL_ACCURACY_AVG} omitted for {metric_date}: no active models");
        }

        let error_window_start = metric_date - Duration::days(PREDICTION_ERROR_WINDOW_DAYS);
        if let Some(accuracy) = self.store.prediction_accuracy(error_window_start)? {
            metrics.push(self.store.upsert_metric(&NewMetric {
                metric_name: AVG_PREDICTION_ERROR.to_string(),
                metric_value: accuracy.avg_abs_error,
                metric_date,
                category: MetricCategory::Ml,
                target_value: None,
            })?);
        } else {
            log::debug!("{AVG_PREDICTION_ERROR} omitted for {metric_date}: nothing resolved");
        }

        let marketing_total = self.store.daily_marketing_total(metric_date)?;
        metrics.push(self.store.upsert_metric(&NewMetric {
            metric_name: DAILY_MARKETING_SPEND.to_string(),
            metric_value: marketing_total,
            metric_date,
            category: MetricCategory::Marketing,
            target_value: None,
        })?);

        log::info!("recomputed {} metrics for {metric_date}", metrics.len());
        Ok(metrics)
    }

    /// Growth versus the previous day, in percent.
    fn daily_growth(&self, date: NaiveDate, today_total: f64) -> Result<f64> {
        let previous_day = date - Duration::days(1);
        let yesterday = self.store.window_total(previous_day, previous_day)?;
        if yesterday == 0.0 {
            return Err(ForecastError::DivisionUndefined(format!(
                "sales on {previous_day} sum to zero"
            )));
        }
        Ok((today_total - yesterday) / yesterday * 100.0)
    }

    /// Trailing week versus the week before it, in percent.
    fn weekly_growth(&self, date: NaiveDate) -> Result<f64> {
        let current = self
            .store
            .window_total(date - Duration::days(6), date)?;
        let prior = self
            .store
            .window_total(date - Duration::days(13), date - Duration::days(7))?;
        if prior == 0.0 {
            return Err(ForecastError::DivisionUndefined(format!(
                "week ending {} sums to zero",
                date - Duration::days(7)
            )));
        }
        Ok((current - prior) / prior * 100.0)
    }

    /// Average performance score across active models, scaled to percent.
    fn model_accuracy(&self) -> Result<Option<f64>> {
        let active = self.store.models(true)?;
        if active.is_empty() {
            return Ok(None);
        }
        let avg =
            active.iter().map(|m| m.performance_score).sum::<f64>() / active.len() as f64;
        Ok(Some(avg * 100.0))
    }
}

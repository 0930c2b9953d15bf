//! Feature building over raw sales observations

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use sales_store::Observation;

use crate::config::EngineConfig;
use crate::error::{ForecastError, Result};

/// Name of the date column in a feature frame.
pub const DATE_COLUMN: &str = "date";
/// Name of the target column a strategy forecasts.
pub const TARGET_COLUMN: &str = "sales_total";
/// Model-facing feature columns, in their canonical order.
pub const FEATURE_COLUMNS: [&str; 5] = [
    "day_of_week",
    "month",
    "is_weekend",
    "temperature",
    "marketing_spend",
];

/// Row granularity of a built feature frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGranularity {
    /// One row per distinct observed date; amounts summed, temperature
    /// averaged.
    #[default]
    Daily,
    /// One row per raw observation.
    PerRecord,
}

/// Model-ready feature rows backed by a polars DataFrame.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    df: DataFrame,
}

/// Builds feature frames from observation history. Side-effect free; the
/// output is a pure function of the observations and the as-of date.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    min_history_days: usize,
    granularity: FeatureGranularity,
}

impl FeatureBuilder {
    pub fn new(min_history_days: usize, granularity: FeatureGranularity) -> Self {
        Self {
            min_history_days,
            granularity,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.min_history_days, config.granularity)
    }

    /// Build one feature row per date bucket (or per raw observation) from
    /// every observation dated on or before `as_of`.
    ///
    /// Calendar features are derived from the date here rather than read
    /// from the stored columns, so stale denormalized values cannot drift
    /// into a model.
    pub fn build(&self, observations: &[Observation], as_of: NaiveDate) -> Result<FeatureFrame> {
        let mut in_window: Vec<&Observation> =
            observations.iter().filter(|o| o.date <= as_of).collect();
        in_window.sort_by_key(|o| (o.date, o.id));

        let distinct_days = in_window
            .iter()
            .map(|o| o.date)
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        if distinct_days < self.min_history_days {
            return Err(ForecastError::InsufficientHistory(format!(
                "feature building needs at least {} distinct days through {}, found {}",
                self.min_history_days, as_of, distinct_days
            )));
        }

        match self.granularity {
            FeatureGranularity::Daily => Self::build_daily(&in_window),
            FeatureGranularity::PerRecord => Self::build_per_record(&in_window),
        }
    }

    fn build_daily(observations: &[&Observation]) -> Result<FeatureFrame> {
        #[derive(Default)]
        struct Bucket {
            sales: f64,
            quantity: i64,
            marketing: f64,
            temperature_sum: f64,
            temperature_count: usize,
        }

        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        for obs in observations {
            let bucket = buckets.entry(obs.date).or_default();
            bucket.sales += obs.sales_amount;
            bucket.quantity += obs.quantity;
            bucket.marketing += obs.marketing_spend;
            if let Some(t) = obs.temperature {
                bucket.temperature_sum += t;
                bucket.temperature_count += 1;
            }
        }

        let mut rows = RowColumns::with_capacity(buckets.len());
        for (date, bucket) in &buckets {
            let temperature = if bucket.temperature_count > 0 {
                Some(bucket.temperature_sum / bucket.temperature_count as f64)
            } else {
                None
            };
            rows.push(*date, temperature, bucket.marketing, bucket.quantity, bucket.sales);
        }
        rows.into_frame()
    }

    fn build_per_record(observations: &[&Observation]) -> Result<FeatureFrame> {
        let mut rows = RowColumns::with_capacity(observations.len());
        for obs in observations {
            rows.push(
                obs.date,
                obs.temperature,
                obs.marketing_spend,
                obs.quantity,
                obs.sales_amount,
            );
        }
        rows.into_frame()
    }
}

/// Column accumulator shared by both granularities.
struct RowColumns {
    dates: Vec<i64>,
    day_of_week: Vec<i64>,
    month: Vec<i64>,
    is_weekend: Vec<bool>,
    temperature: Vec<Option<f64>>,
    marketing_spend: Vec<f64>,
    quantity: Vec<i64>,
    sales_total: Vec<f64>,
}

impl RowColumns {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            dates: Vec::with_capacity(capacity),
            day_of_week: Vec::with_capacity(capacity),
            month: Vec::with_capacity(capacity),
            is_weekend: Vec::with_capacity(capacity),
            temperature: Vec::with_capacity(capacity),
            marketing_spend: Vec::with_capacity(capacity),
            quantity: Vec::with_capacity(capacity),
            sales_total: Vec::with_capacity(capacity),
        }
    }

    fn push(
        &mut self,
        date: NaiveDate,
        temperature: Option<f64>,
        marketing_spend: f64,
        quantity: i64,
        sales_total: f64,
    ) {
        self.dates.push(i64::from(date.num_days_from_ce()));
        self.day_of_week
            .push(i64::from(sales_store::day_of_week(date)));
        self.month.push(i64::from(date.month()));
        self.is_weekend.push(sales_store::is_weekend(date));
        self.temperature.push(temperature);
        self.marketing_spend.push(marketing_spend);
        self.quantity.push(quantity);
        self.sales_total.push(sales_total);
    }

    fn into_frame(self) -> Result<FeatureFrame> {
        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, self.dates),
            Series::new("day_of_week", self.day_of_week),
            Series::new("month", self.month),
            Series::new("is_weekend", self.is_weekend),
            Series::new("temperature", self.temperature),
            Series::new("marketing_spend", self.marketing_spend),
            Series::new("quantity", self.quantity),
            Series::new(TARGET_COLUMN, self.sales_total),
        ])?;
        Ok(FeatureFrame { df })
    }
}

impl FeatureFrame {
    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the length of the feature frame
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the feature frame is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Model-facing feature column names, in canonical order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    /// Row dates, oldest first.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let col = self.df.column(DATE_COLUMN)?;
        col.i64()?
            .into_iter()
            .map(|value| {
                let days = value.ok_or_else(|| {
                    ForecastError::ValidationError("null date in feature frame".to_string())
                })?;
                NaiveDate::from_num_days_from_ce_opt(days as i32).ok_or_else(|| {
                    ForecastError::ValidationError(format!("day number {days} out of range"))
                })
            })
            .collect()
    }

    /// The forecast target series.
    pub fn targets(&self) -> Result<Vec<f64>> {
        self.column_as_f64(TARGET_COLUMN)
    }

    /// Day offsets of each row relative to the first row.
    pub fn day_indices(&self) -> Result<Vec<f64>> {
        let dates = self.dates()?;
        match dates.first() {
            None => Ok(Vec::new()),
            Some(&origin) => Ok(dates
                .iter()
                .map(|d| (*d - origin).num_days() as f64)
                .collect()),
        }
    }

    /// Read a column as dense f64 values.
    pub fn column_as_f64(&self, column_name: &str) -> Result<Vec<f64>> {
        let col = self.df.column(column_name)?;
        match col.dtype() {
            DataType::Float64 => Ok(col.f64()?.into_iter().flatten().collect()),
            DataType::Int64 => Ok(col
                .i64()?
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Boolean => Ok(col
                .bool()?
                .into_iter()
                .flatten()
                .map(|v| if v { 1.0 } else { 0.0 })
                .collect()),
            _ => Err(ForecastError::ValidationError(format!(
                "Column '{column_name}' cannot be converted to f64"
            ))),
        }
    }

    /// Read a nullable column, keeping row alignment.
    pub fn column_as_opt_f64(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.df.column(column_name)?;
        match col.dtype() {
            DataType::Float64 => Ok(col.f64()?.into_iter().collect()),
            DataType::Int64 => Ok(col
                .i64()?
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect()),
            _ => Err(ForecastError::ValidationError(format!(
                "Column '{column_name}' cannot be converted to f64"
            ))),
        }
    }

    /// Get a slice of the frame from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.df.height());
        let sliced_df = self.df.slice(start as i64, end.saturating_sub(start));
        Ok(FeatureFrame { df: sliced_df })
    }

    /// Mean of the target series.
    pub fn target_mean(&self) -> Result<f64> {
        let targets = self.targets()?;
        if targets.is_empty() {
            return Err(ForecastError::ValidationError(
                "empty feature frame".to_string(),
            ));
        }
        Ok(targets.iter().mean())
    }

    /// Sample standard deviation of the target series.
    pub fn target_std_dev(&self) -> Result<f64> {
        let targets = self.targets()?;
        if targets.len() < 2 {
            return Ok(0.0);
        }
        Ok(targets.iter().std_dev())
    }

    /// Coefficient of variation of the target series; zero for a flat or
    /// zero-mean series.
    pub fn target_volatility(&self) -> Result<f64> {
        let mean = self.target_mean()?;
        if mean.abs() < f64::EPSILON {
            return Ok(0.0);
        }
        Ok((self.target_std_dev()? / mean).abs())
    }
}

//! The engine boundary consumed by the external request layer

use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

use sales_store::{
    BusinessMetric, NewObservation, NewPrediction, Observation, Prediction, QualityCheck,
    SalesStore,
};

use crate::config::EngineConfig;
use crate::error::{ForecastError, Result};
use crate::features::FeatureBuilder;
use crate::metrics::MetricsAggregator;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::reconcile::ReconciliationEngine;
use crate::registry::ModelRegistry;

/// Row shape for CSV observation imports.
#[derive(Debug, Deserialize)]
struct CsvObservation {
    date: NaiveDate,
    sales_amount: f64,
    quantity: i64,
    #[serde(default)]
    product_category: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    marketing_spend: f64,
}

/// Orchestrates the store, feature builder, strategies, reconciliation and
/// metric aggregation behind four boundary operations: ingest, forecast,
/// reconcile and metrics.
pub struct SalesForecastEngine {
    store: SalesStore,
    config: EngineConfig,
}

impl SalesForecastEngine {
    pub fn new(store: SalesStore, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Open (or create) a file-backed engine.
    pub fn open<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self> {
        Self::new(SalesStore::open(path)?, config)
    }

    /// In-memory engine for tests and examples.
    pub fn open_in_memory(config: EngineConfig) -> Result<Self> {
        Self::new(SalesStore::open_in_memory()?, config)
    }

    pub fn store(&self) -> &SalesStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> ModelRegistry<'_> {
        ModelRegistry::new(&self.store)
    }

    /// Validate and persist one observation.
    pub fn ingest_observation(&self, obs: &NewObservation) -> Result<Observation> {
        Ok(self.store.insert_observation(obs)?)
    }

    /// Bulk import observations from a CSV file with a header row. The
    /// whole file is validated before anything is written.
    pub fn ingest_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut batch = Vec::new();
        for row in reader.deserialize() {
            let row: CsvObservation = row?;
            batch.push(NewObservation {
                date: row.date,
                sales_amount: row.sales_amount,
                quantity: row.quantity,
                product_category: row.product_category,
                region: row.region,
                temperature: row.temperature,
                marketing_spend: row.marketing_spend,
            });
        }
        let count = self.store.insert_observations(&batch)?;
        log::info!("imported {count} observations from CSV");
        Ok(count)
    }

    /// Generate and persist a forecast using the strategy, attributed to the
    /// active registry record for `model_name`.
    ///
    /// History through `as_of` feeds the feature builder; the forecast
    /// covers the `horizon_days` dates after `as_of`, one persisted
    /// `Prediction` per date with the calendar snapshot of its target date.
    pub fn request_forecast<M: ForecastModel>(
        &self,
        model_name: &str,
        strategy: &M,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<Prediction>> {
        if horizon_days == 0 || horizon_days > self.config.max_horizon_days {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be within 1..={} days, got {horizon_days}",
                self.config.max_horizon_days
            )));
        }
        let record = self.store.active_model(model_name)?.ok_or_else(|| {
            ForecastError::ModelNotTrained(format!(
                "no active model registered under '{model_name}'"
            ))
        })?;

        let observations = self.store.observations_through(as_of)?;
        let frame = FeatureBuilder::from_config(&self.config).build(&observations, as_of)?;
        let trained = strategy.fit(&frame)?;

        let target_dates: Vec<NaiveDate> = (1..=i64::from(horizon_days))
            .map(|offset| as_of + Duration::days(offset))
            .collect();
        let forecast = trained.predict(&target_dates)?;

        let mut stored = Vec::with_capacity(forecast.len());
        for (target_date, value, confidence) in forecast.iter() {
            stored.push(self.store.insert_prediction(&NewPrediction {
                model_id: record.id,
                prediction_date: as_of,
                target_date,
                predicted_value: value,
                confidence_score: confidence,
                feature_values: calendar_snapshot(target_date),
            })?);
        }
        log::info!(
            "forecast for '{model_name}' over {horizon_days} days from {as_of}: stored {} predictions",
            stored.len()
        );
        Ok(stored)
    }

    /// Resolve matured predictions against realized observations.
    pub fn reconcile(&self, as_of: NaiveDate) -> Result<usize> {
        ReconciliationEngine::new(&self.store).reconcile(as_of)
    }

    /// Recompute and upsert the business metrics for one date.
    pub fn recompute_metrics(&self, metric_date: NaiveDate) -> Result<Vec<BusinessMetric>> {
        MetricsAggregator::new(&self.store, &self.config).recompute(metric_date)
    }

    /// Metrics over an inclusive date range.
    pub fn get_metrics(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<BusinessMetric>> {
        Ok(self.store.metrics_between(start, end)?)
    }

    /// Run the standing data quality rules.
    pub fn data_quality_report(&self, as_of: NaiveDate) -> Result<Vec<QualityCheck>> {
        Ok(self.store.data_quality_checks(as_of)?)
    }
}

/// Calendar features of the target date, stored with each prediction.
fn calendar_snapshot(date: NaiveDate) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "day_of_week".to_string(),
        json!(sales_store::day_of_week(date)),
    );
    map.insert("month".to_string(), json!(date.month()));
    map.insert(
        "is_weekend".to_string(),
        json!(sales_store::is_weekend(date)),
    );
    map
}

//! SQLite-backed store for sales observations, model records, predictions,
//! business metrics and conversation logs.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::records::{
    self, BusinessMetric, CheckStatus, ConversationMessage, DailySummary, MetricCategory,
    ModelPerformance, ModelRecord, NewMessage, NewMetric, NewModelRecord, NewObservation,
    NewPrediction, Observation, Prediction, PredictionAccuracy, QualityCheck, SalesStats,
};
use crate::schema;

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage handle wrapping a single SQLite connection.
pub struct SalesStore {
    conn: Connection,
}

impl SalesStore {
    /// Open or create a database at the given path and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database, mostly for tests and examples.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Apply the schema. Safe to call on an already-initialized database.
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        log::debug!("sales store schema initialized");
        Ok(())
    }

    // ---------------------------------------------------------------
    // sales_data
    // ---------------------------------------------------------------

    /// Insert one validated observation, filling the calendar cache from the
    /// date. Returns the stored row.
    pub fn insert_observation(&self, obs: &NewObservation) -> Result<Observation> {
        obs.validate()?;
        self.conn.execute(
            "INSERT INTO sales_data (date, sales_amount, quantity, product_category, region, \
             day_of_week, month, is_weekend, temperature, marketing_spend) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                obs.date.format(DATE_FMT).to_string(),
                obs.sales_amount,
                obs.quantity,
                obs.product_category,
                obs.region,
                records::day_of_week(obs.date),
                obs.date.month(),
                records::is_weekend(obs.date),
                obs.temperature,
                obs.marketing_spend,
            ],
        )?;
        self.observation(self.conn.last_insert_rowid())
    }

    /// Insert a batch of observations in a single transaction. The whole
    /// batch is validated up front; one bad row rejects the lot.
    pub fn insert_observations(&self, batch: &[NewObservation]) -> Result<usize> {
        for obs in batch {
            obs.validate()?;
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sales_data (date, sales_amount, quantity, product_category, region, \
                 day_of_week, month, is_weekend, temperature, marketing_spend) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for obs in batch {
                stmt.execute(params![
                    obs.date.format(DATE_FMT).to_string(),
                    obs.sales_amount,
                    obs.quantity,
                    obs.product_category,
                    obs.region,
                    records::day_of_week(obs.date),
                    obs.date.month(),
                    records::is_weekend(obs.date),
                    obs.temperature,
                    obs.marketing_spend,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("inserted {} observations", batch.len());
        Ok(batch.len())
    }

    pub fn observation(&self, id: i64) -> Result<Observation> {
        self.conn
            .query_row(
                &format!("{OBSERVATION_SELECT} WHERE id = ?1"),
                params![id],
                map_observation,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("observation {id}")))
    }

    pub fn observations_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBSERVATION_SELECT} WHERE date >= ?1 AND date <= ?2 ORDER BY date, id"
        ))?;
        let rows = stmt.query_map(
            params![
                start.format(DATE_FMT).to_string(),
                end.format(DATE_FMT).to_string()
            ],
            map_observation,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All observations dated on or before `as_of`, oldest first.
    pub fn observations_through(&self, as_of: NaiveDate) -> Result<Vec<Observation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBSERVATION_SELECT} WHERE date <= ?1 ORDER BY date, id"
        ))?;
        let rows = stmt.query_map(params![as_of.format(DATE_FMT).to_string()], map_observation)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Summed sales_amount for one date. `None` when no observation rows
    /// exist for that date at all, which is not the same as a zero total.
    pub fn daily_total(&self, date: NaiveDate) -> Result<Option<f64>> {
        let (count, total): (i64, Option<f64>) = self.conn.query_row(
            "SELECT COUNT(*), SUM(sales_amount) FROM sales_data WHERE date = ?1",
            params![date.format(DATE_FMT).to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if count == 0 {
            Ok(None)
        } else {
            Ok(Some(total.unwrap_or(0.0)))
        }
    }

    /// Summed sales_amount over an inclusive date window; empty windows sum
    /// to zero.
    pub fn window_total(&self, start: NaiveDate, end: NaiveDate) -> Result<f64> {
        let total: Option<f64> = self.conn.query_row(
            "SELECT SUM(sales_amount) FROM sales_data WHERE date >= ?1 AND date <= ?2",
            params![
                start.format(DATE_FMT).to_string(),
                end.format(DATE_FMT).to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(total.unwrap_or(0.0))
    }

    /// Summed marketing_spend for one date; zero when no rows.
    pub fn daily_marketing_total(&self, date: NaiveDate) -> Result<f64> {
        let total: Option<f64> = self.conn.query_row(
            "SELECT SUM(marketing_spend) FROM sales_data WHERE date = ?1",
            params![date.format(DATE_FMT).to_string()],
            |row| row.get(0),
        )?;
        Ok(total.unwrap_or(0.0))
    }

    /// Per-date rollups from the `daily_sales_summary` view.
    pub fn daily_summaries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, total_sales, total_quantity, avg_sale, transaction_count, \
             avg_temperature, total_marketing_spend \
             FROM daily_sales_summary WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let rows = stmt.query_map(
            params![
                start.format(DATE_FMT).to_string(),
                end.format(DATE_FMT).to_string()
            ],
            |row| {
                Ok(DailySummary {
                    date: parse_date_col(row, 0)?,
                    total_sales: row.get(1)?,
                    total_quantity: row.get(2)?,
                    avg_sale: row.get(3)?,
                    transaction_count: row.get(4)?,
                    avg_temperature: row.get(5)?,
                    total_marketing_spend: row.get(6)?,
                })
            },
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overall sales statistics for the dashboard collaborator.
    pub fn sales_stats(&self) -> Result<SalesStats> {
        self.conn
            .query_row(
                "SELECT COUNT(*), SUM(sales_amount), AVG(sales_amount), MIN(date), MAX(date) \
                 FROM sales_data",
                [],
                |row| {
                    Ok(SalesStats {
                        total_records: row.get(0)?,
                        total_sales: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                        avg_sale_amount: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                        earliest_date: parse_opt_date_col(row, 3)?,
                        latest_date: parse_opt_date_col(row, 4)?,
                    })
                },
            )
            .map_err(StoreError::from)
    }

    // ---------------------------------------------------------------
    // ml_models
    // ---------------------------------------------------------------

    /// Register a model. Fails with `DuplicateVersion` when (name, version)
    /// already exists; the check runs before the write.
    pub fn insert_model(&self, rec: &NewModelRecord) -> Result<i64> {
        rec.validate()?;
        if self.model_by_name_version(&rec.name, &rec.version)?.is_some() {
            return Err(StoreError::DuplicateVersion {
                name: rec.name.clone(),
                version: rec.version.clone(),
            });
        }
        let hyperparameters = serde_json::to_string(&rec.hyperparameters)?;
        let feature_columns = serde_json::to_string(&rec.feature_columns)?;
        self.conn.execute(
            "INSERT INTO ml_models (name, version, algorithm, performance_score, training_date, \
             is_active, hyperparameters, feature_columns) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                rec.name,
                rec.version,
                rec.algorithm,
                rec.performance_score,
                rec.training_date.map(|dt| dt.format(DATETIME_FMT).to_string()),
                rec.is_active,
                hyperparameters,
                feature_columns,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn model(&self, id: i64) -> Result<ModelRecord> {
        self.conn
            .query_row(
                &format!("{MODEL_SELECT} WHERE id = ?1"),
                params![id],
                map_model,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("model {id}")))
    }

    pub fn model_by_name_version(&self, name: &str, version: &str) -> Result<Option<ModelRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("{MODEL_SELECT} WHERE name = ?1 AND version = ?2"),
                params![name, version],
                map_model,
            )
            .optional()?)
    }

    /// Resolve the active model for a name: most recent training_date among
    /// active rows, ties broken by highest id. Activation of one version
    /// deliberately leaves sibling versions untouched, so several rows may
    /// be active at once.
    pub fn active_model(&self, name: &str) -> Result<Option<ModelRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "{MODEL_SELECT} WHERE name = ?1 AND is_active = 1 \
                     ORDER BY training_date DESC, id DESC LIMIT 1"
                ),
                params![name],
                map_model,
            )
            .optional()?)
    }

    pub fn models(&self, active_only: bool) -> Result<Vec<ModelRecord>> {
        let sql = if active_only {
            format!("{MODEL_SELECT} WHERE is_active = 1 ORDER BY created_at DESC, id DESC")
        } else {
            format!("{MODEL_SELECT} ORDER BY created_at DESC, id DESC")
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_model)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn set_model_active(&self, id: i64, active: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE ml_models SET is_active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("model {id}")));
        }
        Ok(())
    }

    /// Record a new performance score and training time for a model.
    pub fn update_model_performance(
        &self,
        id: i64,
        score: f64,
        trained_at: NaiveDateTime,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&score) {
            return Err(StoreError::DataQualityViolation(format!(
                "performance_score must be within [0, 1], got {score}"
            )));
        }
        let changed = self.conn.execute(
            "UPDATE ml_models SET performance_score = ?2, training_date = ?3 WHERE id = ?1",
            params![id, score, trained_at.format(DATETIME_FMT).to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("model {id}")));
        }
        Ok(())
    }

    /// Delete a model record. Rejected while predictions still reference it;
    /// predictions are never silently orphaned.
    pub fn delete_model(&self, id: i64) -> Result<()> {
        let predictions: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM predictions WHERE model_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if predictions > 0 {
            return Err(StoreError::ModelInUse { id, predictions });
        }
        let changed = self
            .conn
            .execute("DELETE FROM ml_models WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("model {id}")));
        }
        Ok(())
    }

    /// Per-model rollups from the `model_performance` view.
    pub fn model_performance_summary(&self) -> Result<Vec<ModelPerformance>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, version, algorithm, performance_score, is_active, \
             prediction_count, avg_confidence FROM model_performance ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ModelPerformance {
                id: row.get(0)?,
                name: row.get(1)?,
                version: row.get(2)?,
                algorithm: row.get(3)?,
                performance_score: row.get(4)?,
                is_active: row.get(5)?,
                prediction_count: row.get(6)?,
                avg_confidence: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ---------------------------------------------------------------
    // predictions
    // ---------------------------------------------------------------

    /// Persist a fresh, unresolved prediction.
    pub fn insert_prediction(&self, pred: &NewPrediction) -> Result<Prediction> {
        pred.validate()?;
        // Resolve the model first for a NotFound instead of a raw FK error.
        self.model(pred.model_id)?;
        let feature_values = serde_json::to_string(&pred.feature_values)?;
        self.conn.execute(
            "INSERT INTO predictions (model_id, prediction_date, target_date, predicted_value, \
             confidence_score, feature_values) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                pred.model_id,
                pred.prediction_date.format(DATE_FMT).to_string(),
                pred.target_date.format(DATE_FMT).to_string(),
                pred.predicted_value,
                pred.confidence_score,
                feature_values,
            ],
        )?;
        self.prediction(self.conn.last_insert_rowid())
    }

    pub fn prediction(&self, id: i64) -> Result<Prediction> {
        self.conn
            .query_row(
                &format!("{PREDICTION_SELECT} WHERE id = ?1"),
                params![id],
                map_prediction,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("prediction {id}")))
    }

    /// Unresolved predictions whose target date is on or before `through`,
    /// the reconciliation candidates.
    pub fn unresolved_predictions(&self, through: NaiveDate) -> Result<Vec<Prediction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PREDICTION_SELECT} WHERE actual_value IS NULL AND target_date <= ?1 \
             ORDER BY target_date, id"
        ))?;
        let rows = stmt.query_map(
            params![through.format(DATE_FMT).to_string()],
            map_prediction,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Fill in the realized value and signed error for one prediction.
    /// Guarded so an already-resolved row is never rewritten; returns whether
    /// this call did the resolution.
    pub fn resolve_prediction(
        &self,
        id: i64,
        actual_value: f64,
        accuracy_error: f64,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE predictions SET actual_value = ?2, accuracy_error = ?3 \
             WHERE id = ?1 AND actual_value IS NULL",
            params![id, actual_value, accuracy_error],
        )?;
        Ok(changed > 0)
    }

    pub fn predictions_for_model(&self, model_id: i64, limit: usize) -> Result<Vec<Prediction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PREDICTION_SELECT} WHERE model_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![model_id, limit as i64], map_prediction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn recent_predictions(&self, limit: usize) -> Result<Vec<Prediction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PREDICTION_SELECT} ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], map_prediction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Accuracy over predictions resolved with a target date on or after
    /// `since`. `None` when nothing has been resolved in the window.
    pub fn prediction_accuracy(&self, since: NaiveDate) -> Result<Option<PredictionAccuracy>> {
        let (count, avg_err, avg_conf): (i64, Option<f64>, Option<f64>) = self.conn.query_row(
            "SELECT COUNT(*), AVG(ABS(accuracy_error)), AVG(confidence_score) FROM predictions \
             WHERE target_date >= ?1 AND actual_value IS NOT NULL",
            params![since.format(DATE_FMT).to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        if count == 0 {
            return Ok(None);
        }
        Ok(Some(PredictionAccuracy {
            total_resolved: count,
            avg_abs_error: avg_err.unwrap_or(0.0),
            avg_confidence: avg_conf.unwrap_or(0.0),
        }))
    }

    // ---------------------------------------------------------------
    // business_metrics
    // ---------------------------------------------------------------

    /// Upsert one metric keyed by (metric_name, metric_date). Recomputation
    /// replaces the existing value, it never duplicates the row.
    pub fn upsert_metric(&self, metric: &NewMetric) -> Result<BusinessMetric> {
        if !metric.metric_value.is_finite() {
            return Err(StoreError::DataQualityViolation(format!(
                "metric_value for {} must be finite",
                metric.metric_name
            )));
        }
        self.conn.execute(
            "INSERT INTO business_metrics (metric_name, metric_value, metric_date, category, \
             target_value, variance_percentage) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT (metric_name, metric_date) DO UPDATE SET \
             metric_value = excluded.metric_value, \
             category = excluded.category, \
             target_value = excluded.target_value, \
             variance_percentage = excluded.variance_percentage",
            params![
                metric.metric_name,
                metric.metric_value,
                metric.metric_date.format(DATE_FMT).to_string(),
                metric.category.as_str(),
                metric.target_value,
                metric.variance_percentage(),
            ],
        )?;
        self.metric(&metric.metric_name, metric.metric_date)?
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "metric {} on {}",
                    metric.metric_name, metric.metric_date
                ))
            })
    }

    pub fn metric(&self, name: &str, date: NaiveDate) -> Result<Option<BusinessMetric>> {
        Ok(self
            .conn
            .query_row(
                &format!("{METRIC_SELECT} WHERE metric_name = ?1 AND metric_date = ?2"),
                params![name, date.format(DATE_FMT).to_string()],
                map_metric,
            )
            .optional()?)
    }

    pub fn metrics_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<BusinessMetric>> {
        let mut stmt = self.conn.prepare(&format!(
            "{METRIC_SELECT} WHERE metric_date >= ?1 AND metric_date <= ?2 \
             ORDER BY metric_date, metric_name"
        ))?;
        let rows = stmt.query_map(
            params![
                start.format(DATE_FMT).to_string(),
                end.format(DATE_FMT).to_string()
            ],
            map_metric,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn metrics_by_category(
        &self,
        category: MetricCategory,
        since: NaiveDate,
    ) -> Result<Vec<BusinessMetric>> {
        let mut stmt = self.conn.prepare(&format!(
            "{METRIC_SELECT} WHERE category = ?1 AND metric_date >= ?2 \
             ORDER BY metric_date DESC, metric_name"
        ))?;
        let rows = stmt.query_map(
            params![category.as_str(), since.format(DATE_FMT).to_string()],
            map_metric,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Most recent row of each metric name, for the dashboard front page.
    pub fn latest_metrics(&self) -> Result<Vec<BusinessMetric>> {
        let mut stmt = self.conn.prepare(&format!(
            "{METRIC_SELECT} WHERE (metric_name, metric_date) IN \
             (SELECT metric_name, MAX(metric_date) FROM business_metrics GROUP BY metric_name) \
             ORDER BY metric_name"
        ))?;
        let rows = stmt.query_map([], map_metric)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ---------------------------------------------------------------
    // conversations
    // ---------------------------------------------------------------

    /// Log one chat message for the conversational collaborator.
    pub fn save_message(&self, msg: &NewMessage) -> Result<ConversationMessage> {
        self.conn.execute(
            "INSERT INTO conversations (session_id, message_type, message_content, \
             intent_detected, confidence_score, processing_time_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                msg.session_id,
                msg.message_type.as_str(),
                msg.message_content,
                msg.intent_detected,
                msg.confidence_score,
                msg.processing_time_ms,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                &format!("{CONVERSATION_SELECT} FROM conversations WHERE id = ?1"),
                params![id],
                map_message,
            )
            .map_err(StoreError::from)
    }

    pub fn conversation_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONVERSATION_SELECT} FROM conversations WHERE session_id = ?1 \
             ORDER BY created_at, id LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![session_id, limit as i64], map_message)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Latest messages from the `recent_conversations` view, newest first.
    pub fn recent_conversations(&self) -> Result<Vec<ConversationMessage>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONVERSATION_SELECT} FROM recent_conversations"))?;
        let rows = stmt.query_map([], map_message)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ---------------------------------------------------------------
    // data quality
    // ---------------------------------------------------------------

    /// Run the standing data quality rules as of a reference date.
    pub fn data_quality_checks(&self, as_of: NaiveDate) -> Result<Vec<QualityCheck>> {
        let mut checks = Vec::new();

        let week_ago = as_of - Duration::days(7);
        let recent_sales = self.scalar_count(
            "SELECT COUNT(*) FROM sales_data WHERE date >= ?1 AND date <= ?2",
            params![
                week_ago.format(DATE_FMT).to_string(),
                as_of.format(DATE_FMT).to_string()
            ],
        )?;
        checks.push(QualityCheck {
            check_name: "Recent Sales Data".to_string(),
            table_name: "sales_data".to_string(),
            expected: "> 0".to_string(),
            actual: recent_sales,
            status: if recent_sales > 0 {
                CheckStatus::Passed
            } else {
                CheckStatus::Failed
            },
            message: format!("Found {recent_sales} sales records in last 7 days"),
        });

        let negative_sales = self.scalar_count(
            "SELECT COUNT(*) FROM sales_data WHERE sales_amount < 0",
            [],
        )?;
        checks.push(QualityCheck {
            check_name: "Negative Sales Values".to_string(),
            table_name: "sales_data".to_string(),
            expected: "0".to_string(),
            actual: negative_sales,
            status: if negative_sales == 0 {
                CheckStatus::Passed
            } else {
                CheckStatus::Failed
            },
            message: format!("Found {negative_sales} negative sales values"),
        });

        // Stored calendar fields are a cache of the date; drift means some
        // writer bypassed ingestion. strftime('%w') counts Sunday as 0, the
        // stored convention counts Monday as 0.
        let calendar_drift = self.scalar_count(
            "SELECT COUNT(*) FROM sales_data WHERE day_of_week IS NOT NULL \
             AND CAST(strftime('%w', date) AS INTEGER) != (day_of_week + 1) % 7",
            [],
        )?;
        checks.push(QualityCheck {
            check_name: "Calendar Cache Drift".to_string(),
            table_name: "sales_data".to_string(),
            expected: "0".to_string(),
            actual: calendar_drift,
            status: if calendar_drift == 0 {
                CheckStatus::Passed
            } else {
                CheckStatus::Warning
            },
            message: format!("Found {calendar_drift} rows with stale derived calendar fields"),
        });

        let active_models =
            self.scalar_count("SELECT COUNT(*) FROM ml_models WHERE is_active = 1", [])?;
        checks.push(QualityCheck {
            check_name: "Active ML Models".to_string(),
            table_name: "ml_models".to_string(),
            expected: "> 0".to_string(),
            actual: active_models,
            status: if active_models > 0 {
                CheckStatus::Passed
            } else {
                CheckStatus::Warning
            },
            message: format!("Found {active_models} active models"),
        });

        let yesterday = as_of - Duration::days(1);
        let recent_predictions = self.scalar_count(
            "SELECT COUNT(*) FROM predictions WHERE prediction_date >= ?1",
            params![yesterday.format(DATE_FMT).to_string()],
        )?;
        checks.push(QualityCheck {
            check_name: "Recent Predictions".to_string(),
            table_name: "predictions".to_string(),
            expected: ">= 0".to_string(),
            actual: recent_predictions,
            status: CheckStatus::Passed,
            message: format!("Generated {recent_predictions} predictions in last 24 hours"),
        });

        for check in checks.iter().filter(|c| c.status != CheckStatus::Passed) {
            log::warn!("data quality: {} - {}", check.check_name, check.message);
        }
        Ok(checks)
    }

    fn scalar_count<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<i64> {
        Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
    }
}

const OBSERVATION_SELECT: &str = "SELECT id, date, sales_amount, quantity, product_category, \
     region, day_of_week, month, is_weekend, temperature, marketing_spend, created_at \
     FROM sales_data";

const MODEL_SELECT: &str = "SELECT id, name, version, algorithm, performance_score, \
     training_date, is_active, hyperparameters, feature_columns, created_at FROM ml_models";

const PREDICTION_SELECT: &str = "SELECT id, model_id, prediction_date, target_date, \
     predicted_value, confidence_score, actual_value, accuracy_error, feature_values, created_at \
     FROM predictions";

const METRIC_SELECT: &str = "SELECT id, metric_name, metric_value, metric_date, category, \
     target_value, variance_percentage, created_at FROM business_metrics";

const CONVERSATION_SELECT: &str = "SELECT id, session_id, message_type, message_content, \
     intent_detected, confidence_score, processing_time_ms, created_at";

fn map_observation(row: &Row<'_>) -> rusqlite::Result<Observation> {
    Ok(Observation {
        id: row.get(0)?,
        date: parse_date_col(row, 1)?,
        sales_amount: row.get(2)?,
        quantity: row.get(3)?,
        product_category: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        region: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        day_of_week: row.get(6)?,
        month: row.get(7)?,
        is_weekend: row.get(8)?,
        temperature: row.get(9)?,
        marketing_spend: row.get(10)?,
        created_at: parse_datetime_col(row, 11)?,
    })
}

fn map_model(row: &Row<'_>) -> rusqlite::Result<ModelRecord> {
    Ok(ModelRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        algorithm: row.get(3)?,
        performance_score: row.get(4)?,
        training_date: parse_opt_datetime_col(row, 5)?,
        is_active: row.get(6)?,
        hyperparameters: parse_json_map_col(row, 7)?,
        feature_columns: parse_string_list_col(row, 8)?,
        created_at: parse_datetime_col(row, 9)?,
    })
}

fn map_prediction(row: &Row<'_>) -> rusqlite::Result<Prediction> {
    Ok(Prediction {
        id: row.get(0)?,
        model_id: row.get(1)?,
        prediction_date: parse_date_col(row, 2)?,
        target_date: parse_date_col(row, 3)?,
        predicted_value: row.get(4)?,
        confidence_score: row.get(5)?,
        actual_value: row.get(6)?,
        accuracy_error: row.get(7)?,
        feature_values: parse_json_map_col(row, 8)?,
        created_at: parse_datetime_col(row, 9)?,
    })
}

fn map_metric(row: &Row<'_>) -> rusqlite::Result<BusinessMetric> {
    let raw_category: String = row.get(4)?;
    let category = raw_category.parse::<MetricCategory>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
    })?;
    Ok(BusinessMetric {
        id: row.get(0)?,
        metric_name: row.get(1)?,
        metric_value: row.get(2)?,
        metric_date: parse_date_col(row, 3)?,
        category,
        target_value: row.get(5)?,
        variance_percentage: row.get(6)?,
        created_at: parse_datetime_col(row, 7)?,
    })
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<ConversationMessage> {
    let raw_type: String = row.get(2)?;
    let message_type = raw_type.parse().map_err(|e: StoreError| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
    })?;
    Ok(ConversationMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        message_type,
        message_content: row.get(3)?,
        intent_detected: row.get(4)?,
        confidence_score: row.get(5)?,
        processing_time_ms: row.get(6)?,
        created_at: parse_datetime_col(row, 7)?,
    })
}

fn parse_date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FMT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FMT)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

fn parse_datetime_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_datetime_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

fn parse_datetime(raw: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FMT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
}

fn parse_json_map_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Map<String, Value>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(Map::new()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

fn parse_string_list_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

//! Domain records persisted by the sales store

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// Day of week with Monday = 0, the stored convention.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Saturday and Sunday count as the weekend.
pub fn is_weekend(date: NaiveDate) -> bool {
    day_of_week(date) >= 5
}

/// One historical sales record with calendar, weather and marketing features.
///
/// The calendar columns (`day_of_week`, `month`, `is_weekend`) are a cache
/// filled at ingest time; consumers that need trustworthy values recompute
/// them from `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub date: NaiveDate,
    pub sales_amount: f64,
    pub quantity: i64,
    pub product_category: String,
    pub region: String,
    pub day_of_week: u8,
    pub month: u8,
    pub is_weekend: bool,
    pub temperature: Option<f64>,
    pub marketing_spend: f64,
    pub created_at: NaiveDateTime,
}

/// An observation as submitted for ingestion, before the store assigns an id
/// and fills the calendar cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObservation {
    pub date: NaiveDate,
    pub sales_amount: f64,
    pub quantity: i64,
    pub product_category: String,
    pub region: String,
    pub temperature: Option<f64>,
    pub marketing_spend: f64,
}

impl NewObservation {
    /// Reject rows that would violate data quality rules instead of coercing
    /// them.
    pub fn validate(&self) -> Result<()> {
        if !self.sales_amount.is_finite() || self.sales_amount < 0.0 {
            return Err(StoreError::DataQualityViolation(format!(
                "sales_amount must be a non-negative number, got {} for {}",
                self.sales_amount, self.date
            )));
        }
        if self.quantity < 0 {
            return Err(StoreError::DataQualityViolation(format!(
                "quantity must be non-negative, got {} for {}",
                self.quantity, self.date
            )));
        }
        if !self.marketing_spend.is_finite() || self.marketing_spend < 0.0 {
            return Err(StoreError::DataQualityViolation(format!(
                "marketing_spend must be a non-negative number, got {} for {}",
                self.marketing_spend, self.date
            )));
        }
        if let Some(t) = self.temperature {
            if !t.is_finite() {
                return Err(StoreError::DataQualityViolation(format!(
                    "temperature must be finite for {}",
                    self.date
                )));
            }
        }
        Ok(())
    }
}

/// A named, versioned model registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub algorithm: String,
    pub performance_score: f64,
    pub training_date: Option<NaiveDateTime>,
    pub is_active: bool,
    /// Opaque hyperparameter mapping; the store only round-trips it.
    pub hyperparameters: Map<String, Value>,
    /// Ordered list of feature column names the model was trained with.
    pub feature_columns: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// A model registration before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModelRecord {
    pub name: String,
    pub version: String,
    pub algorithm: String,
    pub performance_score: f64,
    pub training_date: Option<NaiveDateTime>,
    pub is_active: bool,
    pub hyperparameters: Map<String, Value>,
    pub feature_columns: Vec<String>,
}

impl NewModelRecord {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.version.trim().is_empty() {
            return Err(StoreError::DataQualityViolation(
                "model name and version must be non-empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.performance_score) {
            return Err(StoreError::DataQualityViolation(format!(
                "performance_score must be within [0, 1], got {}",
                self.performance_score
            )));
        }
        Ok(())
    }
}

/// A stored forecast for a single target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    pub model_id: i64,
    /// The day the forecast was computed.
    pub prediction_date: NaiveDate,
    /// The day the forecast is about. Always on or after `prediction_date`.
    pub target_date: NaiveDate,
    pub predicted_value: f64,
    pub confidence_score: f64,
    /// Filled exactly once by reconciliation, never rewritten afterwards.
    pub actual_value: Option<f64>,
    /// Signed error `predicted_value - actual_value`; present iff
    /// `actual_value` is.
    pub accuracy_error: Option<f64>,
    /// Opaque snapshot of the feature values the forecast was made from.
    pub feature_values: Map<String, Value>,
    pub created_at: NaiveDateTime,
}

impl Prediction {
    pub fn is_resolved(&self) -> bool {
        self.actual_value.is_some()
    }
}

/// A forecast before the store assigns an id. Always unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub model_id: i64,
    pub prediction_date: NaiveDate,
    pub target_date: NaiveDate,
    pub predicted_value: f64,
    pub confidence_score: f64,
    pub feature_values: Map<String, Value>,
}

impl NewPrediction {
    pub fn validate(&self) -> Result<()> {
        if self.target_date < self.prediction_date {
            return Err(StoreError::DataQualityViolation(format!(
                "target_date {} precedes prediction_date {}",
                self.target_date, self.prediction_date
            )));
        }
        if !self.predicted_value.is_finite() {
            return Err(StoreError::DataQualityViolation(
                "predicted_value must be finite".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(StoreError::DataQualityViolation(format!(
                "confidence_score must be within [0, 1], got {}",
                self.confidence_score
            )));
        }
        Ok(())
    }
}

/// Business metric category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    Sales,
    Marketing,
    Ml,
    System,
}

impl MetricCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Sales => "sales",
            MetricCategory::Marketing => "marketing",
            MetricCategory::Ml => "ml",
            MetricCategory::System => "system",
        }
    }
}

impl FromStr for MetricCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sales" => Ok(MetricCategory::Sales),
            "marketing" => Ok(MetricCategory::Marketing),
            "ml" => Ok(MetricCategory::Ml),
            "system" => Ok(MetricCategory::System),
            other => Err(StoreError::DataQualityViolation(format!(
                "unknown metric category: {other}"
            ))),
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time business metric, unique per (metric_name, metric_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetric {
    pub id: i64,
    pub metric_name: String,
    pub metric_value: f64,
    pub metric_date: NaiveDate,
    pub category: MetricCategory,
    pub target_value: Option<f64>,
    pub variance_percentage: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// A metric value to be upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMetric {
    pub metric_name: String,
    pub metric_value: f64,
    pub metric_date: NaiveDate,
    pub category: MetricCategory,
    pub target_value: Option<f64>,
}

impl NewMetric {
    /// Variance against the target in percent, when a non-zero target exists.
    pub fn variance_percentage(&self) -> Option<f64> {
        match self.target_value {
            Some(target) if target != 0.0 => {
                Some((self.metric_value - target) / target * 100.0)
            }
            _ => None,
        }
    }
}

/// Side of a conversation exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(MessageType::User),
            "assistant" => Ok(MessageType::Assistant),
            other => Err(StoreError::DataQualityViolation(format!(
                "unknown message type: {other}"
            ))),
        }
    }
}

/// One logged chat message. The engine never interprets these; the table is
/// part of the storage contract consumed by the conversational collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: i64,
    pub session_id: String,
    pub message_type: MessageType,
    pub message_content: String,
    pub intent_detected: Option<String>,
    pub confidence_score: Option<f64>,
    pub processing_time_ms: Option<i64>,
    pub created_at: NaiveDateTime,
}

/// A chat message to be logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub session_id: String,
    pub message_type: MessageType,
    pub message_content: String,
    pub intent_detected: Option<String>,
    pub confidence_score: Option<f64>,
    pub processing_time_ms: Option<i64>,
}

/// One row of the `daily_sales_summary` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub avg_sale: f64,
    pub transaction_count: i64,
    pub avg_temperature: Option<f64>,
    pub total_marketing_spend: f64,
}

/// One row of the `model_performance` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub algorithm: String,
    pub performance_score: f64,
    pub is_active: bool,
    pub prediction_count: i64,
    pub avg_confidence: Option<f64>,
}

/// Overall sales statistics for the dashboard collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesStats {
    pub total_sales: f64,
    pub total_records: i64,
    pub avg_sale_amount: f64,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
}

/// Accuracy of resolved predictions over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionAccuracy {
    pub total_resolved: i64,
    pub avg_abs_error: f64,
    pub avg_confidence: f64,
}

/// Outcome of a single data quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Warning,
    Failed,
}

/// Result of one data quality rule, fed to the quality-check collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub check_name: String,
    pub table_name: String,
    pub expected: String,
    pub actual: i64,
    pub status: CheckStatus,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_helpers_follow_monday_zero_convention() {
        // 2024-01-01 was a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(day_of_week(monday), 0);
        assert!(!is_weekend(monday));

        let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(day_of_week(saturday), 5);
        assert!(is_weekend(saturday));

        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(day_of_week(sunday), 6);
        assert!(is_weekend(sunday));
    }

    #[test]
    fn negative_sales_amount_is_a_quality_violation() {
        let obs = NewObservation {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            sales_amount: -10.0,
            quantity: 1,
            product_category: "Electronics".to_string(),
            region: "North".to_string(),
            temperature: None,
            marketing_spend: 0.0,
        };
        assert!(matches!(
            obs.validate(),
            Err(StoreError::DataQualityViolation(_))
        ));
    }

    #[test]
    fn prediction_target_must_not_precede_prediction_date() {
        let pred = NewPrediction {
            model_id: 1,
            prediction_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            target_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            predicted_value: 100.0,
            confidence_score: 0.95,
            feature_values: Map::new(),
        };
        assert!(matches!(
            pred.validate(),
            Err(StoreError::DataQualityViolation(_))
        ));
    }

    #[test]
    fn metric_variance_needs_a_nonzero_target() {
        let mut metric = NewMetric {
            metric_name: "daily_sales_total".to_string(),
            metric_value: 120.0,
            metric_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            category: MetricCategory::Sales,
            target_value: Some(100.0),
        };
        assert_eq!(metric.variance_percentage(), Some(20.0));

        metric.target_value = Some(0.0);
        assert_eq!(metric.variance_percentage(), None);

        metric.target_value = None;
        assert_eq!(metric.variance_percentage(), None);
    }
}

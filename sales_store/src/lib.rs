//! # Sales Store
//!
//! Relational storage layer for the sales forecasting system: historical
//! sales observations, versioned model records, forecasts awaiting
//! reconciliation, upserted business metrics and the conversation log.
//!
//! The persisted layout (`sales_data`, `ml_models`, `predictions`,
//! `business_metrics`, `conversations` plus the `daily_sales_summary`,
//! `model_performance` and `recent_conversations` views) is the external
//! contract consumed by the dashboard and conversational collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sales_store::{NewObservation, SalesStore};
//!
//! let store = SalesStore::open_in_memory().unwrap();
//! let obs = store
//!     .insert_observation(&NewObservation {
//!         date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!         sales_amount: 125.50,
//!         quantity: 3,
//!         product_category: "Electronics".to_string(),
//!         region: "North".to_string(),
//!         temperature: Some(12.5),
//!         marketing_spend: 200.0,
//!     })
//!     .unwrap();
//! assert_eq!(obs.month, 3);
//! ```

pub mod error;
pub mod records;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use crate::error::{Result, StoreError};
pub use crate::records::{
    day_of_week, is_weekend, BusinessMetric, CheckStatus, ConversationMessage, DailySummary,
    MessageType, MetricCategory, ModelPerformance, ModelRecord, NewMessage, NewMetric,
    NewModelRecord, NewObservation, NewPrediction, Observation, Prediction, PredictionAccuracy,
    QualityCheck, SalesStats,
};
pub use crate::store::SalesStore;

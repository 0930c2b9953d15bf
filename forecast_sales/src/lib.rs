//! # Forecast Sales
//!
//! A Rust library for short-horizon sales forecasting with confidence
//! scores, reconciliation of forecasts against realized outcomes and
//! rolled-up business metrics.
//!
//! ## Features
//!
//! - Feature building over raw sales observations (calendar features always
//!   derived from the date, never trusted from storage)
//! - Pluggable forecasting strategies behind a fit/predict trait pair, with
//!   a deterministic seasonal-plus-trend baseline and a delegate slot for
//!   external models
//! - A named, versioned model registry with an explicit
//!   most-recent-active-wins resolution policy
//! - Idempotent reconciliation of predictions against arrived actuals
//! - Business metric aggregation with upsert-by-(name, date) semantics
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use forecast_sales::config::EngineConfig;
//! use forecast_sales::engine::SalesForecastEngine;
//! use forecast_sales::models::seasonal_trend::SeasonalTrend;
//! use forecast_sales::synthetic;
//!
//! let engine = SalesForecastEngine::open_in_memory(EngineConfig::default()).unwrap();
//!
//! // Bootstrap two months of history and an active "SalesPredictor" model.
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! synthetic::seed_store(engine.store(), start, 60, 42).unwrap();
//!
//! // Forecast the week after the last observed day.
//! let as_of = start + Duration::days(59);
//! let predictions = engine
//!     .request_forecast("SalesPredictor", &SeasonalTrend::new(42), 7, as_of)
//!     .unwrap();
//! assert_eq!(predictions.len(), 7);
//!
//! // Once actuals arrive, reconciliation fills in the signed errors and
//! // the aggregator rolls up the day's metrics.
//! let resolved = engine.reconcile(as_of).unwrap();
//! assert_eq!(resolved, 0); // nothing matured yet
//! let metrics = engine.recompute_metrics(as_of).unwrap();
//! assert!(!metrics.is_empty());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod reconcile;
pub mod registry;
pub mod synthetic;

// Re-export commonly used types
pub use crate::config::EngineConfig;
pub use crate::engine::SalesForecastEngine;
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureBuilder, FeatureFrame, FeatureGranularity};
pub use crate::metrics::MetricsAggregator;
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::reconcile::ReconciliationEngine;
pub use crate::registry::ModelRegistry;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

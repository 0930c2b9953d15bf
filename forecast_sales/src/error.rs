//! Error types for the forecast_sales crate

use polars::prelude::PolarsError;
use sales_store::StoreError;
use thiserror::Error;

/// Custom error types for the forecast_sales crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too little observed history to build features or fit a model.
    /// Recoverable; the caller may lower requirements or wait for data.
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    /// A forecast was requested without a trained, active model
    #[error("Model not trained: {0}")]
    ModelNotTrained(String),

    /// A metric denominator was zero; the aggregator omits the metric
    #[error("Division undefined: {0}")]
    DivisionUndefined(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from the storage layer
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error reading CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error serializing or deserializing JSON
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

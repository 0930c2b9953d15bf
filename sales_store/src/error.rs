//! Error types for the sales_store crate

use thiserror::Error;

/// Custom error types for storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A model with the same (name, version) pair already exists
    #[error("Duplicate model version: {name} {version}")]
    DuplicateVersion { name: String, version: String },

    /// A requested row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Incoming data failed a quality rule
    #[error("Data quality violation: {0}")]
    DataQualityViolation(String),

    /// A model row cannot be deleted while predictions reference it
    #[error("Model {id} is referenced by {predictions} prediction(s)")]
    ModelInUse { id: i64, predictions: i64 },

    /// Error from the underlying SQLite database
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error serializing or deserializing JSON columns
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, StoreError>;

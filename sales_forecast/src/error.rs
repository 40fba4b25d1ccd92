//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use sales_math::MathError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed input: missing required columns, unparsable dates or amounts
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Not enough distinct observations to fit a model
    #[error("Insufficient data: need at least {needed} distinct dates, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Forecast horizon must be a positive number of days
    #[error("Invalid horizon: {0} (must be at least 1 day)")]
    InvalidHorizon(i64),

    /// Persisted model is absent or cannot be read
    #[error("Pre-trained model not found at {path} ({reason}). Please run `sales_forecast train` first.")]
    ModelArtifactMissing { path: String, reason: String },

    /// Summary or insight requested over an empty sequence
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error from reading or writing CSV exports
    #[error("CSV error: {0}")]
    Csv(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error in a configuration file
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

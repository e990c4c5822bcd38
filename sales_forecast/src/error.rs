//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Input or output path could not be read or written
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Required columns are missing from the input
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// No usable rows remain
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Model fitting did not converge
    #[error("Convergence error: {0}")]
    ConvergenceError(String),

    /// Paired sequences differ in length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Not enough observations for the requested operation
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from the numeric building blocks
    #[error("Math error: {0}")]
    MathError(#[from] sales_math::MathError),

    /// Error while writing CSV tables
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error while serializing reports
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

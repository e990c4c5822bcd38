//! # Sales Math
//!
//! Numeric building blocks for monthly sales forecasting.
//! This crate provides rolling window statistics, a classical additive
//! seasonal decomposition, differencing helpers for integrated models and a
//! bounded Nelder-Mead optimizer used to fit model parameters.

use thiserror::Error;

pub mod decomposition;
pub mod differencing;
pub mod optimization;
pub mod rolling;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

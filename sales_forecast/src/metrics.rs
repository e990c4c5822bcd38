//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Point forecast accuracy on the held-out months
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    /// Mean Absolute Error
    pub mean_absolute_error: f64,
    /// Root Mean Squared Error
    pub root_mean_squared_error: f64,
}

/// Evaluate predictions against actual values
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<EvaluationMetrics> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::LengthMismatch {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(ForecastError::EmptyDataset(
            "cannot evaluate an empty forecast".to_string(),
        ));
    }

    Ok(EvaluationMetrics {
        mean_absolute_error: mean_absolute_error(actual, predicted),
        root_mean_squared_error: root_mean_squared_error(actual, predicted),
    })
}

/// Mean of absolute differences; NaN when inputs are empty or differ in length
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Mean of squared differences; NaN when inputs are empty or differ in length
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Square root of [`mean_squared_error`]
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_squared_error(actual, predicted).sqrt()
}

impl std::fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MAE: {:.2}", self.mean_absolute_error)?;
        write!(f, "RMSE: {:.2}", self.root_mean_squared_error)
    }
}

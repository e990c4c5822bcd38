//! Forecasting models for monthly sales series

use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate, EvaluationMetrics};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;

/// One forecast value with its month label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub value: f64,
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
    /// Month labels (optional)
    months: Option<Vec<NaiveDate>>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::LengthMismatch {
                expected: horizons,
                actual: values.len(),
            });
        }

        Ok(Self {
            values,
            horizons,
            months: None,
        })
    }

    /// Attach month labels, one per value
    pub fn with_months(mut self, months: Vec<NaiveDate>) -> Result<Self> {
        if months.len() != self.values.len() {
            return Err(ForecastError::LengthMismatch {
                expected: self.values.len(),
                actual: months.len(),
            });
        }
        self.months = Some(months);
        Ok(self)
    }

    /// Keep only the last `count` values.
    ///
    /// Month labels are dropped since they described the full horizon.
    pub fn tail(&self, count: usize) -> Result<Self> {
        if count > self.values.len() {
            return Err(ForecastError::InsufficientData {
                needed: count,
                got: self.values.len(),
            });
        }

        Self::new(self.values[self.values.len() - count..].to_vec(), count)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Get the month labels, if attached
    pub fn months(&self) -> Option<&[NaiveDate]> {
        self.months.as_deref()
    }

    /// Labelled values; empty when no months are attached
    pub fn points(&self) -> Vec<ForecastPoint> {
        self.months
            .iter()
            .flatten()
            .zip(&self.values)
            .map(|(&month, &value)| ForecastPoint { month, value })
            .collect()
    }

    /// Compare the forecast against observed values
    pub fn evaluate(&self, actual: &[f64]) -> Result<EvaluationMetrics> {
        evaluate(actual, &self.values)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for the `horizons` periods after the training data
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// In-sample one-step-ahead fitted values on the original scale
    fn fitted_values(&self) -> Vec<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series of values
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on observed values
    fn train(&self, values: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_horizon() {
        assert!(ForecastResult::new(vec![1.0, 2.0], 3).is_err());
    }

    #[test]
    fn tail_keeps_last_values() {
        let result = ForecastResult::new(vec![1.0, 2.0, 3.0, 4.0], 4).unwrap();
        let tail = result.tail(2).unwrap();
        assert_eq!(tail.values(), &[3.0, 4.0]);
        assert_eq!(tail.horizons(), 2);
        assert!(result.tail(5).is_err());
    }

    #[test]
    fn points_pair_months_and_values() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let result = ForecastResult::new(vec![10.0, 20.0], 2)
            .unwrap()
            .with_months(vec![jan, feb])
            .unwrap();

        assert_eq!(
            result.points(),
            vec![
                ForecastPoint { month: jan, value: 10.0 },
                ForecastPoint { month: feb, value: 20.0 },
            ]
        );
        assert!(ForecastResult::new(vec![1.0], 1)
            .unwrap()
            .with_months(vec![jan, feb])
            .is_err());
    }

    #[test]
    fn evaluate_compares_against_actuals() {
        let result = ForecastResult::new(vec![105.0, 106.0, 107.0], 3).unwrap();
        let metrics = result.evaluate(&[106.0, 107.0, 108.0]).unwrap();
        assert!((metrics.mean_absolute_error - 1.0).abs() < 1e-12);
    }
}

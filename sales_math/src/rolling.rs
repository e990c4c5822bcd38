//! Rolling window statistics
//!
//! Trailing windows: the value at index `i` summarises `values[i + 1 - window..=i]`.
//! Positions without a full window yield `None`.

use crate::{MathError, Result};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Simple Moving Average (SMA) over a trailing window
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value into the window
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Current average, or `None` until the window is full
    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period {
            return None;
        }

        Some(self.sum / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Trailing rolling mean
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(window)?;

    Ok(values
        .iter()
        .map(|&value| {
            sma.update(value);
            sma.value()
        })
        .collect())
}

/// Trailing rolling sample standard deviation (n - 1 denominator)
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window < 2 {
        return Err(MathError::InvalidInput(
            "Window must be at least 2 for a sample standard deviation".to_string(),
        ));
    }

    Ok((0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(values[i + 1 - window..=i].iter().std_dev())
            }
        })
        .collect())
}

//! Classical additive seasonal decomposition
//!
//! `observed = trend + seasonal + residual`. The trend is a centered moving
//! average (a 2 x period average for even periods), the seasonal component is
//! the per-position mean of the detrended series normalised to sum to zero
//! over one period, and the residual is whatever is left.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Output of an additive decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Seasonal period used
    pub period: usize,
    /// Input values
    pub observed: Vec<f64>,
    /// Centered moving average; `None` at the edges
    pub trend: Vec<Option<f64>>,
    /// Repeating seasonal effect
    pub seasonal: Vec<f64>,
    /// Remainder; `None` where the trend is undefined
    pub residual: Vec<Option<f64>>,
}

/// Centered moving average filter weights for the given period
fn trend_filter(period: usize) -> Vec<f64> {
    if period % 2 == 0 {
        let mut weights = vec![1.0 / period as f64; period + 1];
        weights[0] = 0.5 / period as f64;
        weights[period] = 0.5 / period as f64;
        weights
    } else {
        vec![1.0 / period as f64; period]
    }
}

/// Centered moving average used as the trend estimate
pub fn centered_moving_average(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period < 2 {
        return Err(MathError::InvalidInput(
            "Period must be at least 2".to_string(),
        ));
    }

    let weights = trend_filter(period);
    let half = weights.len() / 2;
    let n = values.len();

    Ok((0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let window = &values[i - half..=i + half];
            Some(window.iter().zip(&weights).map(|(v, w)| v * w).sum())
        })
        .collect())
}

/// Decompose a series into trend, seasonal and residual components
pub fn seasonal_decompose(values: &[f64], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(MathError::InvalidInput(
            "Period must be at least 2".to_string(),
        ));
    }
    if values.len() < 2 * period {
        return Err(MathError::InsufficientData(format!(
            "Need at least two full periods ({} values), have {}",
            2 * period,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Series contains non-finite values".to_string(),
        ));
    }

    let trend = centered_moving_average(values, period)?;

    // Mean detrended value per seasonal position
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (value, t)) in values.iter().zip(&trend).enumerate() {
        if let Some(t) = t {
            sums[i % period] += value - t;
            counts[i % period] += 1;
        }
    }

    let mut pattern: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let pattern_mean = pattern.iter().sum::<f64>() / period as f64;
    for p in &mut pattern {
        *p -= pattern_mean;
    }

    let seasonal: Vec<f64> = (0..values.len()).map(|i| pattern[i % period]).collect();
    let residual = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((v, t), s)| t.map(|t| v - t - s))
        .collect();

    Ok(Decomposition {
        period,
        observed: values.to_vec(),
        trend,
        seasonal,
        residual,
    })
}

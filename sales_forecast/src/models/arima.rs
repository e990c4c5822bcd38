//! ARIMA models for time series forecasting
//!
//! Parameters are estimated by minimising the conditional sum of squares (CSS)
//! of one-step-ahead errors on the differenced series. The differenced series
//! is scaled to unit standard deviation during the search so that the
//! optimizer tolerances do not depend on the magnitude of sales figures.

use crate::config::ArimaOrder;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use sales_math::differencing::{difference, integrate};
use sales_math::optimization::{nelder_mead, NelderMeadConfig};
use serde::Serialize;
use tracing::{debug, info};

/// Stationarity / invertibility box for AR and MA coefficients
const COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Estimate a constant on the differenced scale
    include_constant: bool,
    /// Optimizer settings for the CSS search
    optimizer: NelderMeadConfig,
}

/// Fitted coefficients and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaFit {
    /// Model order
    pub order: ArimaOrder,
    /// Constant on the differenced scale (zero when not estimated)
    pub intercept: f64,
    /// AR coefficients
    pub ar_coefficients: Vec<f64>,
    /// MA coefficients
    pub ma_coefficients: Vec<f64>,
    /// Mean squared one-step error on the differenced scale
    pub residual_variance: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Optimizer iterations
    pub iterations: usize,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Coefficients and diagnostics
    fit: ArimaFit,
    /// Historical data
    historical_data: Vec<f64>,
    /// Differenced historical data
    differenced: Vec<f64>,
    /// One-step residuals on the differenced scale
    residuals: Vec<f64>,
}

impl ArimaModel {
    /// Create a new ARIMA model without a constant term
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::with_order(ArimaOrder::new(p, d, q))
    }

    /// Create a model from an order
    pub fn with_order(order: ArimaOrder) -> Self {
        Self {
            name: format!("ARIMA{}", order),
            order,
            include_constant: false,
            optimizer: NelderMeadConfig {
                max_iter: 5000,
                tolerance: 1e-10,
                ..NelderMeadConfig::default()
            },
        }
    }

    /// Enable or disable the constant term
    pub fn with_constant(mut self, include_constant: bool) -> Self {
        self.include_constant = include_constant;
        self
    }

    /// Override optimizer settings
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Parameter vector layout: `[intercept?, ar..., ma...]`
    fn unpack<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64]) {
        let offset = usize::from(self.include_constant);
        let intercept = if self.include_constant { params[0] } else { 0.0 };
        let ar = &params[offset..offset + self.order.p];
        let ma = &params[offset + self.order.p..];
        (intercept, ar, ma)
    }

    fn estimate(&self, scaled: &[f64]) -> Result<(Vec<f64>, usize)> {
        let p = self.order.p;
        let q = self.order.q;
        let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;

        let mut initial = Vec::with_capacity(p + q + 1);
        let mut bounds = Vec::with_capacity(p + q + 1);
        if self.include_constant {
            initial.push(mean);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for i in 0..p + q {
            let lag = if i < p { i } else { i - p };
            initial.push(0.1 / (lag + 1) as f64);
            bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
        }

        if initial.is_empty() {
            // ARIMA(0,d,0) without constant has nothing to estimate
            return Ok((initial, 0));
        }

        let result = nelder_mead(
            |params| {
                let (intercept, ar, ma) = self.unpack(params);
                conditional_sum_of_squares(scaled, intercept, ar, ma).0
            },
            &initial,
            Some(&bounds),
            &self.optimizer,
        )?;

        if !result.converged {
            return Err(ForecastError::ConvergenceError(format!(
                "{} CSS search did not converge after {} iterations (objective {:.6})",
                self.name, result.iterations, result.optimal_value
            )));
        }
        if !result.optimal_value.is_finite() || result.optimal_point.iter().any(|v| !v.is_finite())
        {
            return Err(ForecastError::ConvergenceError(format!(
                "{} CSS search ended on a non-finite solution",
                self.name
            )));
        }

        debug!(
            iterations = result.iterations,
            objective = result.optimal_value,
            "CSS search converged"
        );
        Ok((result.optimal_point, result.iterations))
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::with_order(ArimaOrder::default())
    }
}

/// Run the ARMA recursion over `series`, returning the CSS and residuals.
///
/// Residuals before the first full lag window are zero and excluded from the sum.
fn conditional_sum_of_squares(
    series: &[f64],
    intercept: f64,
    ar: &[f64],
    ma: &[f64],
) -> (f64, Vec<f64>) {
    let n = series.len();
    let start = ar.len().max(ma.len());
    let mut residuals = vec![0.0; n];
    if n <= start {
        return (f64::MAX, residuals);
    }

    let mut css = 0.0;
    for t in start..n {
        let mut prediction = intercept;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * (series[t - 1 - i] - intercept);
        }
        for (i, theta) in ma.iter().enumerate() {
            prediction += theta * residuals[t - 1 - i];
        }
        let error = series[t] - prediction;
        residuals[t] = error;
        css += error * error;
    }

    if css.is_finite() {
        (css, residuals)
    } else {
        (f64::MAX, residuals)
    }
}

/// Scale used to normalise the differenced series during estimation
fn search_scale(series: &[f64]) -> f64 {
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let std = (series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std > 1e-12 {
        std
    } else if mean.abs() > 1e-12 {
        mean.abs()
    } else {
        1.0
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, values: &[f64]) -> Result<TrainedArimaModel> {
        let needed = self.order.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "training values must be finite".to_string(),
            ));
        }

        let differenced = difference(values, self.order.d);
        let scale = search_scale(&differenced);
        let scaled: Vec<f64> = differenced.iter().map(|v| v / scale).collect();

        let (params, iterations) = self.estimate(&scaled)?;
        let (scaled_intercept, ar, ma) = if params.is_empty() {
            (0.0, &[][..], &[][..])
        } else {
            self.unpack(&params)
        };
        let intercept = scaled_intercept * scale;

        let (css, residuals) = conditional_sum_of_squares(&differenced, intercept, ar, ma);
        let effective = (differenced.len() - ar.len().max(ma.len())) as f64;
        let residual_variance = css / effective;
        let k = (self.order.p + self.order.q + usize::from(self.include_constant)) as f64;
        let log_likelihood = -0.5
            * effective
            * (1.0 + residual_variance.max(f64::MIN_POSITIVE).ln() + (2.0 * std::f64::consts::PI).ln());

        let fit = ArimaFit {
            order: self.order,
            intercept,
            ar_coefficients: ar.to_vec(),
            ma_coefficients: ma.to_vec(),
            residual_variance,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * effective.ln(),
            iterations,
        };

        info!(
            model = %self.name,
            observations = values.len(),
            intercept = fit.intercept,
            ar = ?fit.ar_coefficients,
            ma = ?fit.ma_coefficients,
            aic = fit.aic,
            "fitted ARIMA model"
        );

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            fit,
            historical_data: values.to_vec(),
            differenced,
            residuals,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    /// Coefficients and diagnostics
    pub fn fit(&self) -> &ArimaFit {
        &self.fit
    }

    /// Data the model was trained on
    pub fn historical_data(&self) -> &[f64] {
        &self.historical_data
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        if self.historical_data.is_empty() {
            return Err(ForecastError::EmptyDataset(
                "model has not been fitted to data".to_string(),
            ));
        }

        let fit = &self.fit;
        let mut extended = self.differenced.clone();
        let mut residuals = self.residuals.clone();

        for _ in 0..horizons {
            let t = extended.len();
            let mut prediction = fit.intercept;
            for (i, phi) in fit.ar_coefficients.iter().enumerate() {
                if t > i {
                    prediction += phi * (extended[t - 1 - i] - fit.intercept);
                }
            }
            for (i, theta) in fit.ma_coefficients.iter().enumerate() {
                if t > i {
                    prediction += theta * residuals[t - 1 - i];
                }
            }
            extended.push(prediction);
            // Future shocks have zero expectation
            residuals.push(0.0);
        }

        let on_differenced_scale = &extended[self.differenced.len()..];
        let values = integrate(on_differenced_scale, &self.historical_data, fit.order.d);

        ForecastResult::new(values, horizons)
    }

    fn fitted_values(&self) -> Vec<f64> {
        // Differencing is linear in the current observation, so the one-step
        // error on the differenced scale is also the error on the level scale.
        let d = self.fit.order.d;
        let start = self.fit.ar_coefficients.len().max(self.fit.ma_coefficients.len());
        let mut fitted = vec![f64::NAN; self.historical_data.len()];

        for t in start..self.differenced.len() {
            fitted[t + d] = self.historical_data[t + d] - self.residuals[t];
        }
        fitted
    }

    fn name(&self) -> &str {
        &self.name
    }
}

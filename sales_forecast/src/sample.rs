//! Synthetic order data for demos and tests

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use crate::utils::{add_month_ends, month_end};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use std::f64::consts::PI;
use std::path::Path;
use tracing::info;

/// Shape of the generated order history
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// First month of the history; any day inside it works
    pub start: NaiveDate,
    pub months: usize,
    pub orders_per_month: (usize, usize),
    /// Average monthly revenue in the first month
    pub base_monthly_sales: f64,
    /// Relative growth per month
    pub monthly_growth: f64,
    /// Amplitude of the yearly cycle relative to the level
    pub seasonal_amplitude: f64,
    /// Standard deviation of order-level noise relative to the mean order
    pub noise: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN),
            months: 36,
            orders_per_month: (30, 60),
            base_monthly_sales: 40_000.0,
            monthly_growth: 0.01,
            seasonal_amplitude: 0.25,
            noise: 0.3,
            seed: 42,
        }
    }
}

impl SampleConfig {
    pub fn with_months(mut self, months: usize) -> Self {
        self.months = months;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Serialize)]
struct SampleRow {
    order_date: NaiveDate,
    sales_amount: String,
}

/// Generate a reproducible order history with trend and yearly seasonality
pub fn generate_transactions(config: &SampleConfig) -> Result<Vec<Transaction>> {
    let (min_orders, max_orders) = config.orders_per_month;
    if config.months == 0 || min_orders == 0 || min_orders > max_orders {
        return Err(ForecastError::InvalidParameter(format!(
            "sample needs at least one month and a valid order range, got {} months and {:?}",
            config.months, config.orders_per_month
        )));
    }
    let noise = Normal::new(1.0, config.noise)
        .map_err(|e| ForecastError::InvalidParameter(format!("sample noise: {}", e)))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let first_month = month_end(config.start);
    let mut transactions = Vec::new();

    for offset in 0..config.months {
        let month = add_month_ends(first_month, offset as u32)?;
        let phase = 2.0 * PI * (month.month0() as f64) / 12.0;
        let level = config.base_monthly_sales
            * (1.0 + config.monthly_growth).powi(offset as i32)
            * (1.0 + config.seasonal_amplitude * phase.sin());

        let orders = rng.gen_range(min_orders..=max_orders);
        let mean_order = level / orders as f64;
        for _ in 0..orders {
            let day = rng.gen_range(1..=month.day());
            let date = month.with_day(day).unwrap_or(month);
            let amount = (mean_order * noise.sample(&mut rng)).max(0.01);
            transactions.push(Transaction::new(date, (amount * 100.0).round() / 100.0));
        }
    }

    transactions.sort_by_key(|t| t.order_date);
    Ok(transactions)
}

/// Write a generated history as `order_date,sales_amount` CSV
pub fn write_sample_csv<P: AsRef<Path>>(path: P, config: &SampleConfig) -> Result<usize> {
    let transactions = generate_transactions(config)?;
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for t in &transactions {
        writer.serialize(SampleRow {
            order_date: t.order_date,
            sales_amount: t
                .sales_amount
                .map(|amount| format!("{:.2}", amount))
                .unwrap_or_default(),
        })?;
    }
    writer.flush()?;

    info!(
        path = %path.as_ref().display(),
        rows = transactions.len(),
        months = config.months,
        "wrote sample data"
    );
    Ok(transactions.len())
}

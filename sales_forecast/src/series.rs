//! Monthly sales series and aggregation from transactions

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use crate::utils::{add_month_ends, month_end, train_test_split};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Total sales for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// Last day of the month
    pub month: NaiveDate,
    /// Summed sales
    pub total_sales: f64,
}

/// Months in strictly increasing order without gaps or duplicates
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MonthlySeries {
    points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    /// Build a series from points, checking ordering and month-end keys
    pub fn new(points: Vec<MonthlyPoint>) -> Result<Self> {
        for point in &points {
            if month_end(point.month) != point.month {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} is not a month end",
                    point.month
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].month <= pair[0].month {
                return Err(ForecastError::InvalidParameter(format!(
                    "months must be strictly increasing ({} follows {})",
                    pair[1].month, pair[0].month
                )));
            }
        }

        Ok(Self { points })
    }

    /// Build a consecutive series starting at the month containing `start`
    pub fn from_values(start: NaiveDate, values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &total_sales)| {
                Ok(MonthlyPoint {
                    month: add_month_ends(start, i as u32)?,
                    total_sales,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }

    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn months(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.month).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_sales).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_month(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.month)
    }

    pub fn last_month(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.month)
    }

    /// Hold out the last `test_months` months
    pub fn split(&self, test_months: usize) -> Result<TrainTestSplit<'_>> {
        let (train, test) = train_test_split(&self.points, test_months)?;
        Ok(TrainTestSplit { train, test })
    }
}

/// Borrowed partition of a [`MonthlySeries`]
#[derive(Debug, Clone, Copy)]
pub struct TrainTestSplit<'a> {
    /// All months except the held-out suffix
    pub train: &'a [MonthlyPoint],
    /// The held-out suffix
    pub test: &'a [MonthlyPoint],
}

impl TrainTestSplit<'_> {
    pub fn train_values(&self) -> Vec<f64> {
        self.train.iter().map(|p| p.total_sales).collect()
    }

    pub fn test_values(&self) -> Vec<f64> {
        self.test.iter().map(|p| p.total_sales).collect()
    }

    pub fn test_months(&self) -> Vec<NaiveDate> {
        self.test.iter().map(|p| p.month).collect()
    }
}

/// Sum sales by calendar month.
///
/// Months without transactions between the first and last observed month are
/// emitted with zero sales. Transactions without a parsed amount contribute
/// zero.
pub fn aggregate_monthly(transactions: &[Transaction]) -> Result<MonthlySeries> {
    if transactions.is_empty() {
        return Err(ForecastError::EmptyDataset(
            "no transactions to aggregate".to_string(),
        ));
    }

    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for transaction in transactions {
        *totals.entry(month_end(transaction.order_date)).or_insert(0.0) +=
            transaction.sales_amount.unwrap_or(0.0);
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ForecastError::EmptyDataset(
                "no months to aggregate".to_string(),
            ))
        }
    };

    let mut points = Vec::with_capacity(totals.len());
    let mut month = first;
    let mut filled = 0usize;
    while month <= last {
        let total_sales = totals.get(&month).copied().unwrap_or_else(|| {
            filled += 1;
            0.0
        });
        points.push(MonthlyPoint { month, total_sales });
        month = add_month_ends(month, 1)?;
    }

    if filled > 0 {
        debug!(months = filled, "zero-filled months without transactions");
    }
    info!(
        months = points.len(),
        first = %first,
        last = %last,
        "aggregated monthly sales"
    );

    MonthlySeries::new(points)
}

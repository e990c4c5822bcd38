//! Chart datasets derived from the monthly series and the forecast
//!
//! Each chart of the dashboard is backed by one flat table. Drawing the
//! tables is left to the front end.

use crate::error::Result;
use crate::models::ForecastPoint;
use crate::pipeline::ForecastOutcome;
use crate::series::MonthlySeries;
use chrono::NaiveDate;
use sales_math::decomposition::seasonal_decompose;
use sales_math::rolling::{rolling_mean, rolling_std};
use sales_math::MathError;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub month: NaiveDate,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingRow {
    pub month: NaiveDate,
    pub total_sales: f64,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionRow {
    pub month: NaiveDate,
    pub observed: f64,
    pub trend: Option<f64>,
    pub seasonal: f64,
    pub residual: Option<f64>,
}

/// Which part of the split a month belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Train,
    Test,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualVsPredictedRow {
    pub month: NaiveDate,
    pub segment: Segment,
    pub actual: f64,
    /// Only set for held-out months
    pub predicted: Option<f64>,
}

/// Line a forecast chart value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Historical,
    Fitted,
    Predicted,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastChartRow {
    pub month: NaiveDate,
    pub series: SeriesKind,
    pub value: f64,
}

/// Datasets for all dashboard charts
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub trend: Vec<TrendRow>,
    pub rolling: Vec<RollingRow>,
    /// `None` when the series is shorter than two seasonal periods
    pub decomposition: Option<Vec<DecompositionRow>>,
    pub actual_vs_predicted: Vec<ActualVsPredictedRow>,
    pub future_forecast: Vec<ForecastChartRow>,
    pub final_forecast: Vec<ForecastChartRow>,
}

/// Build every chart dataset for a finished forecast
pub fn build_charts(
    series: &MonthlySeries,
    outcome: &ForecastOutcome,
    rolling_window: usize,
    seasonal_period: usize,
) -> Result<ChartSet> {
    let months = series.months();
    let values = series.values();

    let trend = series
        .points()
        .iter()
        .map(|p| TrendRow {
            month: p.month,
            total_sales: p.total_sales,
        })
        .collect();

    let means = rolling_mean(&values, rolling_window)?;
    let stds = rolling_std(&values, rolling_window)?;
    let rolling = months
        .iter()
        .zip(&values)
        .zip(means.into_iter().zip(stds))
        .map(|((&month, &total_sales), (rolling_mean, rolling_std))| RollingRow {
            month,
            total_sales,
            rolling_mean,
            rolling_std,
        })
        .collect();

    let decomposition = match seasonal_decompose(&values, seasonal_period) {
        Ok(result) => Some(
            months
                .iter()
                .enumerate()
                .map(|(i, &month)| DecompositionRow {
                    month,
                    observed: result.observed[i],
                    trend: result.trend[i],
                    seasonal: result.seasonal[i],
                    residual: result.residual[i],
                })
                .collect(),
        ),
        Err(MathError::InsufficientData(reason)) => {
            warn!(%reason, "skipping decomposition chart");
            None
        }
        Err(other) => return Err(other.into()),
    };

    let predictions = outcome.test_predictions.values();
    let actual_vs_predicted = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let test_index = i.checked_sub(outcome.train_months);
            ActualVsPredictedRow {
                month: p.month,
                segment: if test_index.is_some() {
                    Segment::Test
                } else {
                    Segment::Train
                },
                actual: p.total_sales,
                predicted: test_index.and_then(|idx| predictions.get(idx).copied()),
            }
        })
        .collect();

    let historical: Vec<ForecastChartRow> = series
        .points()
        .iter()
        .map(|p| ForecastChartRow {
            month: p.month,
            series: SeriesKind::Historical,
            value: p.total_sales,
        })
        .collect();
    let predicted = labelled_rows(&outcome.test_predictions.points(), SeriesKind::Predicted);
    let forecast = labelled_rows(&outcome.future_forecast.points(), SeriesKind::Forecast);
    let fitted: Vec<ForecastChartRow> = months
        .iter()
        .zip(&outcome.fitted_train)
        .filter(|(_, value)| value.is_finite())
        .map(|(&month, &value)| ForecastChartRow {
            month,
            series: SeriesKind::Fitted,
            value,
        })
        .collect();

    let future_forecast = [&historical[..], &predicted[..], &forecast[..]].concat();
    let final_forecast = [&historical[..], &fitted[..], &predicted[..], &forecast[..]].concat();

    Ok(ChartSet {
        trend,
        rolling,
        decomposition,
        actual_vs_predicted,
        future_forecast,
        final_forecast,
    })
}

fn labelled_rows(points: &[ForecastPoint], series: SeriesKind) -> Vec<ForecastChartRow> {
    points
        .iter()
        .map(|p| ForecastChartRow {
            month: p.month,
            series,
            value: p.value,
        })
        .collect()
}

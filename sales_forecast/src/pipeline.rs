//! End-to-end forecasting run
//!
//! A run moves through `Init -> TrainFit -> TestForecast -> FutureForecast ->
//! Done`. Every stage error ends the run; nothing is written to the output
//! directory until all computation has succeeded.

use crate::alignment::{align_to_date, AlignmentReport};
use crate::charts::{build_charts, ChartSet};
use crate::config::PipelineConfig;
use crate::data::{ColumnSpec, DataLoader, LoadReport};
use crate::error::{ForecastError, Result};
use crate::metrics::EvaluationMetrics;
use crate::models::arima::{ArimaFit, ArimaModel};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::report::{ArtifactWriter, RunReport};
use crate::series::{aggregate_monthly, MonthlySeries};
use crate::utils::future_month_ends;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Forecaster progress within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    TrainFit,
    TestForecast,
    FutureForecast,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::TrainFit => "train-fit",
            Stage::TestForecast => "test-forecast",
            Stage::FutureForecast => "future-forecast",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything the forecaster produces for one series
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    /// Months used for fitting
    pub train_months: usize,
    /// Predictions for the held-out months, labelled
    pub test_predictions: ForecastResult,
    /// Forecasts beyond the end of the series, labelled
    pub future_forecast: ForecastResult,
    /// Held-out accuracy
    pub metrics: EvaluationMetrics,
    /// Fitted coefficients and diagnostics
    pub fit: ArimaFit,
    /// In-sample one-step fitted values for the training months
    pub fitted_train: Vec<f64>,
}

/// Fits a model on a training prefix and forecasts test and future horizons
#[derive(Debug, Clone)]
pub struct Forecaster {
    model: ArimaModel,
    test_months: usize,
    future_months: usize,
}

impl Forecaster {
    pub fn new(model: ArimaModel, test_months: usize, future_months: usize) -> Self {
        Self {
            model,
            test_months,
            future_months,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            ArimaModel::with_order(config.order).with_constant(config.include_constant),
            config.test_months,
            config.future_months,
        )
    }

    /// Run the forecaster state machine over `series`
    pub fn run(&self, series: &MonthlySeries) -> Result<ForecastOutcome> {
        let mut stage = Stage::Init;
        debug!(%stage, months = series.len(), "starting forecaster");

        let min_train = self.model.order().min_observations();
        if series.len() < self.test_months + min_train {
            return Err(ForecastError::InsufficientData {
                needed: self.test_months + min_train,
                got: series.len(),
            });
        }
        let split = series.split(self.test_months)?;
        let last_month = series.last_month().ok_or_else(|| {
            ForecastError::EmptyDataset("monthly series is empty".to_string())
        })?;

        stage = Stage::TrainFit;
        debug!(%stage, train_months = split.train.len());
        let trained = self.model.train(&split.train_values())?;

        stage = Stage::TestForecast;
        debug!(%stage, horizon = split.test.len());
        let test_predictions = trained
            .forecast(split.test.len())?
            .with_months(split.test_months())?;
        let metrics = test_predictions.evaluate(&split.test_values())?;

        // The future horizon is the tail of one combined test + future forecast
        // from the training-window model.
        stage = Stage::FutureForecast;
        let combined = split.test.len() + self.future_months;
        debug!(%stage, combined_horizon = combined);
        let future_forecast = trained
            .forecast(combined)?
            .tail(self.future_months)?
            .with_months(future_month_ends(last_month, self.future_months)?)?;

        stage = Stage::Done;
        info!(
            %stage,
            mae = metrics.mean_absolute_error,
            rmse = metrics.root_mean_squared_error,
            "forecast complete"
        );

        Ok(ForecastOutcome {
            train_months: split.train.len(),
            test_predictions,
            future_forecast,
            metrics,
            fit: trained.fit().clone(),
            fitted_train: trained.fitted_values(),
        })
    }
}

/// Result of a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub load: LoadReport,
    pub alignment: AlignmentReport,
    pub series: MonthlySeries,
    pub outcome: ForecastOutcome,
    pub charts: ChartSet,
    /// Paths of the artifacts written
    pub artifacts: Vec<PathBuf>,
}

/// Run load, align, aggregate, forecast and write for `config`
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineRun> {
    config.validate()?;
    let as_of = config.as_of_or_today();
    info!(input = %config.input.display(), %as_of, "starting pipeline run");

    let mut loaded = DataLoader::from_csv(&config.input, &ColumnSpec::from(config))?;
    let alignment = align_to_date(&mut loaded.transactions, as_of)?;
    let series = aggregate_monthly(&loaded.transactions)?;

    let outcome = Forecaster::from_config(config).run(&series)?;
    let charts = build_charts(
        &series,
        &outcome,
        config.rolling_window,
        config.seasonal_period,
    )?;

    let report = RunReport::new(config, as_of, &loaded.report, &alignment, &outcome);
    let artifacts = ArtifactWriter::new(&config.output_dir).write_all(&charts, &outcome, &report)?;
    info!(
        output = %config.output_dir.display(),
        artifacts = artifacts.len(),
        "pipeline run finished"
    );

    Ok(PipelineRun {
        load: loaded.report,
        alignment,
        series,
        outcome,
        charts,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArimaOrder;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn series(values: &[f64]) -> MonthlySeries {
        MonthlySeries::from_values(NaiveDate::from_ymd_opt(2022, 1, 31).unwrap(), values).unwrap()
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::FutureForecast.to_string(), "future-forecast");
    }

    #[test]
    fn refuses_series_shorter_than_split_plus_window() {
        let forecaster = Forecaster::new(ArimaModel::default(), 6, 6);
        let err = forecaster.run(&series(&[1.0; 9])).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { needed: 10, got: 9 }
        ));
    }

    #[test]
    fn from_config_uses_order_and_horizons() {
        let config = PipelineConfig {
            order: ArimaOrder::new(2, 1, 0),
            test_months: 3,
            future_months: 4,
            ..PipelineConfig::default()
        };
        let forecaster = Forecaster::from_config(&config);
        let values: Vec<f64> = (0..20).map(|i| 100.0 + 5.0 * i as f64).collect();

        let outcome = forecaster.run(&series(&values)).unwrap();

        assert_eq!(outcome.fit.order, ArimaOrder::new(2, 1, 0));
        assert_eq!(outcome.train_months, 17);
        assert_eq!(outcome.test_predictions.horizons(), 3);
        assert_eq!(outcome.future_forecast.horizons(), 4);
    }
}

//! # Sales Forecast
//!
//! Monthly sales forecasting from raw order records.
//!
//! ## Pipeline
//!
//! - Load order records from a Latin-1 CSV (order date and sales amount)
//! - Shift every date so the latest order falls on the as-of date
//! - Aggregate to month-end totals, zero-filling empty months
//! - Fit ARIMA(1,1,1) on all but the last K months and forecast them
//! - Score the held-out months with MAE and RMSE
//! - Forecast the K months after the series end
//! - Write chart tables, a forecast table, a summary and a JSON run report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::config::PipelineConfig;
//! use sales_forecast::pipeline::run_pipeline;
//!
//! let config = PipelineConfig::new("data/superstore.csv", "output");
//! let run = run_pipeline(&config)?;
//!
//! println!("{}", run.outcome.metrics);
//! for point in run.outcome.future_forecast.points() {
//!     println!("{} {:.2}", point.month, point.value);
//! }
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod alignment;
pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sample;
pub mod series;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{AmountPolicy, ArimaOrder, PipelineConfig};
pub use crate::data::{DataLoader, Transaction};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::EvaluationMetrics;
pub use crate::models::arima::ArimaModel;
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::pipeline::{run_pipeline, Forecaster, PipelineRun};
pub use crate::report::ArtifactManifest;
pub use crate::series::{aggregate_monthly, MonthlySeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

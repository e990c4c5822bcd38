//! # Sales Forecast Workspace
//!
//! Umbrella crate for the workspace members:
//!
//! - [`sales_math`]: differencing, rolling statistics, seasonal decomposition
//!   and the Nelder-Mead optimizer
//! - [`sales_forecast`]: loading, alignment, monthly aggregation, ARIMA
//!   forecasting, evaluation and artifact writing
//!
//! ```
//! use sales_forecast_workspace::sales_forecast::{ArimaOrder, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! assert_eq!(config.order, ArimaOrder::new(1, 1, 1));
//! assert_eq!(config.test_months, 6);
//! ```

pub use sales_forecast;
pub use sales_math;

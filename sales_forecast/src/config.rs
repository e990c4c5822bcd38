//! Run configuration for the forecasting pipeline
//!
//! Everything a run depends on (paths, the as-of date, split length, model
//! order) lives here and is passed into each stage explicitly.

use crate::error::{ForecastError, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How to treat a row whose sales amount cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountPolicy {
    /// Keep the row; it contributes zero to its month
    #[default]
    Zero,
    /// Drop the row entirely
    DropRow,
}

impl FromStr for AmountPolicy {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(AmountPolicy::Zero),
            "drop-row" | "drop_row" | "drop" => Ok(AmountPolicy::DropRow),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown amount policy '{}' (expected zero or drop-row)",
                other
            ))),
        }
    }
}

/// ARIMA (p, d, q) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Shortest series the model can be fitted on
    pub fn min_observations(&self) -> usize {
        self.d + self.p.max(self.q) + 2
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = ForecastError;

    /// Parse `"p,d,q"`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .map(str::trim)
            .collect();
        if parts.len() != 3 {
            return Err(ForecastError::InvalidParameter(format!(
                "ARIMA order must look like p,d,q, got '{}'",
                s
            )));
        }

        let parse = |part: &str| {
            part.parse::<usize>().map_err(|_| {
                ForecastError::InvalidParameter(format!("Invalid ARIMA order component '{}'", part))
            })
        };

        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Transaction file to read
    pub input: PathBuf,
    /// Directory receiving the output artifacts
    pub output_dir: PathBuf,
    /// Date the latest transaction is aligned to; today when unset
    pub as_of: Option<NaiveDate>,
    /// Name of the order date column
    pub date_column: String,
    /// Name of the sales amount column
    pub amount_column: String,
    /// Treatment of unparseable amounts
    pub amount_policy: AmountPolicy,
    /// Months held out for evaluation
    pub test_months: usize,
    /// Months forecast beyond the end of the series
    pub future_months: usize,
    /// Model order
    pub order: ArimaOrder,
    /// Fit a drift term on the differenced scale
    pub include_constant: bool,
    /// Window of the rolling average chart
    pub rolling_window: usize,
    /// Period of the seasonal decomposition chart
    pub seasonal_period: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/sales.csv"),
            output_dir: PathBuf::from("output"),
            as_of: None,
            date_column: "order_date".to_string(),
            amount_column: "sales_amount".to_string(),
            amount_policy: AmountPolicy::default(),
            test_months: 6,
            future_months: 6,
            order: ArimaOrder::default(),
            include_constant: false,
            rolling_window: 3,
            seasonal_period: 12,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings for the given paths
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output_dir: Q) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a TOML file; missing keys take defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// Fix the as-of date
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// The configured as-of date, falling back to the local calendar date
    pub fn as_of_or_today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Check parameters before a run starts
    pub fn validate(&self) -> Result<()> {
        if self.date_column.trim().is_empty() || self.amount_column.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Column names must not be empty".to_string(),
            ));
        }
        if self.test_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "test_months must be greater than zero".to_string(),
            ));
        }
        if self.future_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "future_months must be greater than zero".to_string(),
            ));
        }
        if self.rolling_window < 2 {
            return Err(ForecastError::InvalidParameter(
                "rolling_window must be at least 2".to_string(),
            ));
        }
        if self.seasonal_period < 2 {
            return Err(ForecastError::InvalidParameter(
                "seasonal_period must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_reference_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.order, ArimaOrder::new(1, 1, 1));
        assert_eq!(config.test_months, 6);
        assert_eq!(config.future_months, 6);
        assert_eq!(config.amount_policy, AmountPolicy::Zero);
        assert!(!config.include_constant);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_order() {
        assert_eq!("2,1,0".parse::<ArimaOrder>().unwrap(), ArimaOrder::new(2, 1, 0));
        assert_eq!("(1, 1, 1)".parse::<ArimaOrder>().unwrap(), ArimaOrder::default());
        assert!("1,1".parse::<ArimaOrder>().is_err());
        assert!("a,1,1".parse::<ArimaOrder>().is_err());
    }

    #[test]
    fn parses_amount_policy() {
        assert_eq!("drop-row".parse::<AmountPolicy>().unwrap(), AmountPolicy::DropRow);
        assert_eq!("Zero".parse::<AmountPolicy>().unwrap(), AmountPolicy::Zero);
        assert!("skip".parse::<AmountPolicy>().is_err());
    }

    #[test]
    fn partial_toml_takes_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            input = "data/Sample - Superstore.csv"
            date_column = "Order Date"
            amount_column = "Sales"
            amount_policy = "drop-row"
            as_of = "2025-10-18"

            [order]
            p = 2
            d = 1
            q = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.date_column, "Order Date");
        assert_eq!(config.amount_policy, AmountPolicy::DropRow);
        assert_eq!(config.order, ArimaOrder::new(2, 1, 0));
        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2025, 10, 18));
        assert_eq!(config.test_months, 6);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn rejects_zero_horizon() {
        let config = PipelineConfig {
            test_months: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}

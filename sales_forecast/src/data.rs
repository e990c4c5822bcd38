//! Transaction loading from delimited files

use crate::config::{AmountPolicy, PipelineConfig};
use crate::error::{ForecastError, Result};
use crate::utils::{date_parser, decode_latin1};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// One raw sales record
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Order date
    pub order_date: NaiveDate,
    /// Sales amount; `None` when the source value did not parse
    pub sales_amount: Option<f64>,
}

impl Transaction {
    pub fn new(order_date: NaiveDate, sales_amount: f64) -> Self {
        Self {
            order_date,
            sales_amount: Some(sales_amount),
        }
    }
}

/// Row accounting for a load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows read from the file
    pub rows_read: usize,
    /// Rows dropped because the order date did not parse
    pub invalid_dates: usize,
    /// Rows whose amount did not parse
    pub invalid_amounts: usize,
    /// Rows dropped because of `AmountPolicy::DropRow`
    pub dropped_for_amount: usize,
}

impl LoadReport {
    /// Rows that survived loading
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.invalid_dates - self.dropped_for_amount
    }
}

/// Transactions plus the row accounting that produced them
#[derive(Debug, Clone)]
pub struct LoadedTransactions {
    pub transactions: Vec<Transaction>,
    pub report: LoadReport,
}

/// Column selection for the loader
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Order date column name
    pub date_column: String,
    /// Sales amount column name
    pub amount_column: String,
    /// Treatment of unparseable amounts
    pub amount_policy: AmountPolicy,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for ColumnSpec {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            date_column: config.date_column.clone(),
            amount_column: config.amount_column.clone(),
            amount_policy: config.amount_policy,
        }
    }
}

/// Data loader for transaction files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load transactions from a Latin-1 encoded CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, columns: &ColumnSpec) -> Result<LoadedTransactions> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read input file");

        let text = decode_latin1(&bytes);
        if text.trim().is_empty() {
            return Err(ForecastError::SchemaError(format!(
                "{} has no header row; missing required column(s) {:?}",
                path.display(),
                [&columns.date_column, &columns.amount_column]
            )));
        }
        // A zero-row inference window keeps every column as text
        let df = CsvReader::new(Cursor::new(text.into_bytes()))
            .has_header(true)
            .infer_schema(Some(0))
            .finish()?;

        let loaded = Self::from_dataframe(&df, columns)?;
        info!(
            path = %path.display(),
            rows_read = loaded.report.rows_read,
            rows_kept = loaded.report.rows_kept(),
            "loaded transactions"
        );
        Ok(loaded)
    }

    /// Extract transactions from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame, columns: &ColumnSpec) -> Result<LoadedTransactions> {
        Self::check_schema(df, columns)?;

        let dates = Self::column_as_text(df, &columns.date_column)?;
        let amounts = Self::column_as_text(df, &columns.amount_column)?;

        let mut report = LoadReport {
            rows_read: df.height(),
            ..LoadReport::default()
        };
        let mut transactions = Vec::with_capacity(df.height());

        for (raw_date, raw_amount) in dates.into_iter().zip(amounts) {
            let Some(order_date) = raw_date.as_deref().and_then(date_parser::parse_date) else {
                report.invalid_dates += 1;
                continue;
            };

            let sales_amount = raw_amount.as_deref().and_then(parse_amount);
            if sales_amount.is_none() {
                report.invalid_amounts += 1;
                if columns.amount_policy == AmountPolicy::DropRow {
                    report.dropped_for_amount += 1;
                    continue;
                }
            }

            transactions.push(Transaction {
                order_date,
                sales_amount,
            });
        }

        if report.invalid_dates > 0 {
            warn!(
                count = report.invalid_dates,
                column = %columns.date_column,
                "dropped rows with unparseable dates"
            );
        }
        if report.invalid_amounts > 0 {
            warn!(
                count = report.invalid_amounts,
                column = %columns.amount_column,
                policy = ?columns.amount_policy,
                "found unparseable amounts"
            );
        }

        if transactions.is_empty() {
            let reason = if report.dropped_for_amount > 0 {
                format!(
                    "{} rows had an unparseable '{}' date and {} were dropped for an unparseable '{}' amount",
                    report.invalid_dates,
                    columns.date_column,
                    report.dropped_for_amount,
                    columns.amount_column
                )
            } else {
                format!("no rows with a parseable '{}' value", columns.date_column)
            };
            return Err(ForecastError::EmptyDataset(format!(
                "{} ({} rows read)",
                reason, report.rows_read
            )));
        }

        Ok(LoadedTransactions {
            transactions,
            report,
        })
    }

    fn check_schema(df: &DataFrame, columns: &ColumnSpec) -> Result<()> {
        let names = df.get_column_names();
        let missing: Vec<&str> = [columns.date_column.as_str(), columns.amount_column.as_str()]
            .into_iter()
            .filter(|required| !names.iter().any(|name| name == required))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::SchemaError(format!(
                "missing required column(s) {:?}; found {:?}",
                missing, names
            )))
        }
    }

    /// Helper method to get a column as optional strings
    fn column_as_text(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::SchemaError(format!("Column '{}' not found: {}", column_name, e))
        })?;
        let text = col.cast(&DataType::Utf8)?;

        Ok(text
            .utf8()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }
}

/// Parse a sales amount, tolerating surrounding whitespace
fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_rejects_garbage_and_non_finite() {
        assert_eq!(parse_amount(" 261.96 "), Some(261.96));
        assert_eq!(parse_amount("-3"), Some(-3.0));
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn from_dataframe_applies_drop_row_policy() {
        let df = df! {
            "order_date" => &["2023-01-05", "bad", "2023-01-20"],
            "sales_amount" => &["10.5", "3", "oops"],
        }
        .unwrap();
        let columns = ColumnSpec {
            amount_policy: AmountPolicy::DropRow,
            ..ColumnSpec::default()
        };

        let loaded = DataLoader::from_dataframe(&df, &columns).unwrap();

        assert_eq!(loaded.transactions.len(), 1);
        assert_eq!(loaded.report.invalid_dates, 1);
        assert_eq!(loaded.report.invalid_amounts, 1);
        assert_eq!(loaded.report.rows_kept(), 1);
    }

    #[test]
    fn empty_result_after_amount_drops_names_amount_column() {
        let df = df! {
            "order_date" => &["2023-01-05", "2023-01-20"],
            "sales_amount" => &["oops", "n/a"],
        }
        .unwrap();
        let columns = ColumnSpec {
            amount_policy: AmountPolicy::DropRow,
            ..ColumnSpec::default()
        };

        let err = DataLoader::from_dataframe(&df, &columns).unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, ForecastError::EmptyDataset(_)));
        assert!(message.contains("2 were dropped for an unparseable 'sales_amount' amount"));
        assert!(!message.contains("no rows with a parseable"));
    }

    #[test]
    fn from_dataframe_keeps_unparsed_amount_under_zero_policy() {
        let df = df! {
            "order_date" => &["2023-01-05", "2023-01-20"],
            "sales_amount" => &["10.5", "oops"],
        }
        .unwrap();

        let loaded = DataLoader::from_dataframe(&df, &ColumnSpec::default()).unwrap();

        assert_eq!(loaded.transactions.len(), 2);
        assert_eq!(loaded.transactions[1].sales_amount, None);
    }
}

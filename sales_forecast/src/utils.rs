//! Utility functions for the sales_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Date parsing for the order date column
pub mod date_parser {
    use chrono::{NaiveDate, NaiveDateTime};

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d.%m.%Y"];

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    /// Parse a calendar date, returning `None` when no accepted format matches.
    ///
    /// Date-time values are truncated to their date.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .map(|dt| dt.date())
            })
    }
}

/// Decode Latin-1 bytes; every byte maps to the code point of the same value
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Last calendar day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Month end `months` months after the month containing `date`
pub fn add_month_ends(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months)))
        .map(month_end)
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Cannot advance {} by {} months",
                date, months
            ))
        })
}

/// The `horizon` month ends that follow `last`
pub fn future_month_ends(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon)
        .map(|step| add_month_ends(last, step as u32))
        .collect()
}

/// Split a series into a training prefix and a test suffix of `test_len` values
pub fn train_test_split<T>(data: &[T], test_len: usize) -> Result<(&[T], &[T])> {
    if test_len >= data.len() {
        return Err(ForecastError::InsufficientData {
            needed: test_len + 1,
            got: data.len(),
        });
    }

    Ok(data.split_at(data.len() - test_len))
}

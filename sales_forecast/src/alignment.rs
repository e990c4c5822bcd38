//! Shifting historical transactions so the newest one lands on an as-of date

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::info;

/// Outcome of an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignmentReport {
    /// Days added to every order date
    pub shift_days: i64,
    /// Latest order date before shifting
    pub original_max_date: NaiveDate,
    /// Latest order date after shifting; equals the as-of date
    pub aligned_max_date: NaiveDate,
}

/// Days between the latest order date and `as_of`
pub fn shift_days(transactions: &[Transaction], as_of: NaiveDate) -> Result<i64> {
    let max_date = latest_order_date(transactions)?;
    Ok((as_of - max_date).num_days())
}

fn latest_order_date(transactions: &[Transaction]) -> Result<NaiveDate> {
    transactions
        .iter()
        .map(|t| t.order_date)
        .max()
        .ok_or_else(|| ForecastError::EmptyDataset("cannot align an empty dataset".to_string()))
}

/// Shift every order date by the same number of days so that the latest one
/// equals `as_of`. Relative spacing between records is preserved.
pub fn align_to_date(transactions: &mut [Transaction], as_of: NaiveDate) -> Result<AlignmentReport> {
    let original_max_date = latest_order_date(transactions)?;
    let shift = (as_of - original_max_date).num_days();
    let offset = Duration::days(shift);

    for transaction in transactions.iter_mut() {
        transaction.order_date = transaction
            .order_date
            .checked_add_signed(offset)
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "shifting {} by {} days leaves the supported date range",
                    transaction.order_date, shift
                ))
            })?;
    }

    info!(
        shift_days = shift,
        original_max = %original_max_date,
        aligned_max = %as_of,
        "aligned order dates"
    );

    Ok(AlignmentReport {
        shift_days: shift,
        original_max_date,
        aligned_max_date: as_of,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new(ymd(2017, 6, 25), 10.0),
            Transaction::new(ymd(2016, 11, 8), 20.0),
            Transaction::new(ymd(2017, 1, 1), 30.0),
        ]
    }

    #[test]
    fn latest_date_becomes_as_of() {
        let mut txs = sample();
        let as_of = ymd(2025, 10, 18);

        let report = align_to_date(&mut txs, as_of).unwrap();

        assert_eq!(txs.iter().map(|t| t.order_date).max(), Some(as_of));
        assert_eq!(report.original_max_date, ymd(2017, 6, 25));
        assert_eq!(report.shift_days, (as_of - ymd(2017, 6, 25)).num_days());
    }

    #[test]
    fn shift_is_uniform() {
        let original = sample();
        let mut txs = original.clone();

        let report = align_to_date(&mut txs, ymd(2025, 10, 18)).unwrap();

        for (before, after) in original.iter().zip(&txs) {
            assert_eq!((after.order_date - before.order_date).num_days(), report.shift_days);
        }
    }

    #[test]
    fn realigning_to_same_date_is_a_no_op() {
        let mut txs = sample();
        let as_of = ymd(2025, 10, 18);
        align_to_date(&mut txs, as_of).unwrap();
        let once = txs.clone();

        let report = align_to_date(&mut txs, as_of).unwrap();

        assert_eq!(report.shift_days, 0);
        assert_eq!(txs, once);
    }

    #[test]
    fn shift_can_move_backwards() {
        let txs = sample();
        assert_eq!(shift_days(&txs, ymd(2017, 6, 20)).unwrap(), -5);
    }

    #[test]
    fn empty_input_is_an_error() {
        let mut txs: Vec<Transaction> = Vec::new();
        let err = align_to_date(&mut txs, ymd(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyDataset(_)));
    }
}

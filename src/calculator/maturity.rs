use chrono::{Datelike, NaiveDate};

use crate::errors::{LoanError, Result};

/// Add `months` calendar months to `start`.
///
/// The year carries when the month passes December. When the start day does
/// not exist in the target month (31st into a 30-day month, 29 February in a
/// common year) the day is walked back until the date is valid, so the result
/// lands on the last day of the target month.
pub fn compute_maturity_date(start: NaiveDate, months: u32) -> Result<NaiveDate> {
    let months_from_epoch = i64::from(start.month0()) + i64::from(months);
    let year = i64::from(start.year()) + months_from_epoch / 12;
    let month = (months_from_epoch % 12) as u32 + 1;

    let year = i32::try_from(year).map_err(|_| out_of_range(start, months))?;

    let mut day = start.day();
    loop {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
        // every month has a 28th, so a miss there means the year is out of range
        if day <= 28 {
            return Err(out_of_range(start, months));
        }
        day -= 1;
    }
}

fn out_of_range(start: NaiveDate, months: u32) -> LoanError {
    LoanError::InvalidDate {
        message: format!("{} plus {} months is outside the supported calendar", start, months),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_month_addition() {
        assert_eq!(compute_maturity_date(date(2025, 1, 15), 3).unwrap(), date(2025, 4, 15));
        assert_eq!(compute_maturity_date(date(2025, 1, 15), 0).unwrap(), date(2025, 1, 15));
    }

    #[test]
    fn test_clamps_to_end_of_february() {
        assert_eq!(compute_maturity_date(date(2025, 1, 31), 1).unwrap(), date(2025, 2, 28));
        assert_eq!(compute_maturity_date(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(compute_maturity_date(date(2024, 2, 29), 12).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_clamps_to_thirty_day_month() {
        assert_eq!(compute_maturity_date(date(2025, 3, 31), 1).unwrap(), date(2025, 4, 30));
        assert_eq!(compute_maturity_date(date(2025, 8, 31), 1).unwrap(), date(2025, 9, 30));
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(compute_maturity_date(date(2025, 11, 30), 3).unwrap(), date(2026, 2, 28));
        assert_eq!(compute_maturity_date(date(2025, 12, 1), 1).unwrap(), date(2026, 1, 1));
        assert_eq!(compute_maturity_date(date(2025, 12, 31), 25).unwrap(), date(2028, 1, 31));
        assert_eq!(compute_maturity_date(date(2023, 5, 31), 9).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_deterministic() {
        let start = date(2025, 5, 31);
        let first = compute_maturity_date(start, 4).unwrap();
        let second = compute_maturity_date(start, 4).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, date(2025, 9, 30));
    }

    #[test]
    fn test_out_of_calendar_range() {
        let err = compute_maturity_date(NaiveDate::MAX, 12).unwrap_err();
        assert!(err.is_invalid_input());
    }
}

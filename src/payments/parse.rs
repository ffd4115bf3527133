use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

/// Parse a payment date typed by an operator.
///
/// Accepts ISO `2025-12-29` and day-first `29/12/2025`.
pub fn parse_payment_date(input: &str) -> Result<NaiveDate> {
    let value = input.trim();

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| LoanError::InvalidDate {
            message: format!("{:?} is not YYYY-MM-DD or DD/MM/YYYY", value),
        })
}

/// Parse an amount that may use a comma as decimal separator.
pub fn parse_amount(input: &str) -> Result<Money> {
    let normalized = input.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map(Money::from_decimal)
        .map_err(|_| LoanError::InvalidAmount {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_iso_and_day_first_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        assert_eq!(parse_payment_date("2025-12-29").unwrap(), expected);
        assert_eq!(parse_payment_date(" 29/12/2025 ").unwrap(), expected);
    }

    #[test]
    fn test_bad_dates_rejected() {
        for input in ["", "12/29/2025", "2025-02-30", "yesterday"] {
            let err = parse_payment_date(input).unwrap_err();
            assert!(matches!(err, LoanError::InvalidDate { .. }), "{} accepted", input);
        }
    }

    #[test]
    fn test_amount_separators() {
        assert_eq!(parse_amount("1500,50").unwrap().as_decimal(), dec!(1500.50));
        assert_eq!(parse_amount(" 1500.5 ").unwrap().as_decimal(), dec!(1500.5));
        assert_eq!(parse_amount("43333").unwrap(), Money::from_major(43_333));
    }

    #[test]
    fn test_bad_amounts_rejected() {
        assert!(matches!(parse_amount("abc"), Err(LoanError::InvalidAmount { .. })));
        assert!(matches!(parse_amount("1.000,50"), Err(LoanError::InvalidAmount { .. })));
    }
}

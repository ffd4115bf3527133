use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::types::CreditState;

/// Derive the lifecycle state of a loan.
///
/// A non-positive balance wins over any date, then the maturity day itself
/// still counts as within term.
pub fn derive_state(maturity_date: NaiveDate, outstanding: Money, as_of: NaiveDate) -> CreditState {
    if !outstanding.is_positive() {
        CreditState::Completed
    } else if as_of <= maturity_date {
        CreditState::Active
    } else {
        CreditState::Overdue
    }
}

/// [`derive_state`] as of the provider's current date
pub fn derive_state_now(
    maturity_date: NaiveDate,
    outstanding: Money,
    time_provider: &SafeTimeProvider,
) -> CreditState {
    derive_state(maturity_date, outstanding, time_provider.now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_maturity_day_is_inclusive() {
        let maturity = date(2025, 4, 15);
        let balance = Money::from_major(1_000);

        assert_eq!(derive_state(maturity, balance, maturity), CreditState::Active);
        assert_eq!(
            derive_state(maturity, balance, maturity + Duration::days(1)),
            CreditState::Overdue
        );
        assert_eq!(derive_state(maturity, balance, date(2025, 1, 1)), CreditState::Active);
    }

    #[test]
    fn test_zero_balance_completes_regardless_of_date() {
        let maturity = date(2020, 1, 31);
        assert_eq!(derive_state(maturity, Money::ZERO, date(2030, 12, 31)), CreditState::Completed);
        assert_eq!(derive_state(maturity, Money::ZERO, date(2019, 12, 1)), CreditState::Completed);
        assert_eq!(
            derive_state(maturity, Money::from_major(-5), date(2030, 12, 31)),
            CreditState::Completed
        );
    }

    #[test]
    fn test_idempotent() {
        let maturity = date(2025, 4, 15);
        let as_of = date(2025, 6, 1);
        let balance = Money::from_minor(1, 2).unwrap();
        assert_eq!(derive_state(maturity, balance, as_of), derive_state(maturity, balance, as_of));
    }

    #[test]
    fn test_state_follows_provider_clock() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 4, 15, 23, 0, 0).unwrap()
        ));
        let control = time.test_control().unwrap();
        let maturity = date(2025, 4, 15);
        let balance = Money::from_major(500);

        assert_eq!(derive_state_now(maturity, balance, &time), CreditState::Active);

        control.advance(Duration::hours(2));
        assert_eq!(derive_state_now(maturity, balance, &time), CreditState::Overdue);
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculator::derive_state;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::CreditState;

/// running balances of one loan
///
/// Every field is derived: `recalculate` rebuilds the snapshot from the
/// total repayable and the full list of payment amounts, so calling it
/// repeatedly with the same inputs leaves the ledger unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanLedger {
    pub total_repayable: Money,
    pub amount_paid: Money,
    pub outstanding: Money,
    pub state: CreditState,
    pub payment_count: usize,
    /// date the state was last derived for
    pub as_of: NaiveDate,
}

impl LoanLedger {
    /// fresh ledger: nothing paid, full balance outstanding
    pub fn open(total_repayable: Money, maturity_date: NaiveDate, as_of: NaiveDate) -> Self {
        let outstanding = total_repayable.non_negative();
        Self {
            total_repayable,
            amount_paid: Money::ZERO,
            outstanding,
            state: derive_state(maturity_date, outstanding, as_of),
            payment_count: 0,
            as_of,
        }
    }

    /// Rebuild paid, outstanding and state from every payment amount.
    ///
    /// Returns the previous state when the derived state changed. On
    /// overflow the ledger is left as it was.
    pub fn recalculate<I>(
        &mut self,
        total_repayable: Money,
        payments: I,
        maturity_date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Option<CreditState>>
    where
        I: IntoIterator<Item = Money>,
    {
        let (amount_paid, payment_count) = payments
            .into_iter()
            .try_fold((Money::ZERO, 0usize), |(sum, n), amount| {
                sum.checked_add(amount).map(|sum| (sum, n + 1))
            })
            .ok_or(LoanError::AmountOverflow { operation: "amount paid" })?;
        let outstanding = total_repayable
            .checked_sub(amount_paid)
            .ok_or(LoanError::AmountOverflow { operation: "outstanding balance" })?
            .non_negative();

        let previous = self.state;

        self.total_repayable = total_repayable;
        self.amount_paid = amount_paid;
        self.payment_count = payment_count;
        self.outstanding = outstanding;
        self.state = derive_state(maturity_date, outstanding, as_of);
        self.as_of = as_of;

        debug!(
            paid = %self.amount_paid,
            outstanding = %self.outstanding,
            state = %self.state,
            %as_of,
            "ledger recalculated"
        );

        Ok((previous != self.state).then_some(previous))
    }

    pub fn is_settled(&self) -> bool {
        self.state == CreditState::Completed
    }

    /// paid share of the total repayable, in percent
    pub fn repayment_percentage(&self) -> Decimal {
        self.amount_paid.percentage_of(self.total_repayable)
    }

    /// whole days past maturity while a balance remains, zero otherwise
    pub fn days_past_maturity(&self, maturity_date: NaiveDate, as_of: NaiveDate) -> i64 {
        if self.outstanding.is_positive() && as_of > maturity_date {
            (as_of - maturity_date).num_days()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_ledger() {
        let ledger = LoanLedger::open(Money::from_major(130_000), date(2025, 4, 15), date(2025, 1, 15));
        assert_eq!(ledger.amount_paid, Money::ZERO);
        assert_eq!(ledger.outstanding, Money::from_major(130_000));
        assert_eq!(ledger.state, CreditState::Active);
        assert_eq!(ledger.payment_count, 0);
    }

    #[test]
    fn test_recalculate_from_payments() {
        let maturity = date(2025, 4, 15);
        let total = Money::from_major(130_000);
        let mut ledger = LoanLedger::open(total, maturity, date(2025, 1, 15));

        let payments = vec![Money::from_major(43_000), Money::from_major(43_000)];
        let changed = ledger.recalculate(total, payments.clone(), maturity, date(2025, 3, 1)).unwrap();

        assert_eq!(changed, None);
        assert_eq!(ledger.amount_paid, Money::from_major(86_000));
        assert_eq!(ledger.outstanding, Money::from_major(44_000));
        assert_eq!(ledger.payment_count, 2);
        assert_eq!(ledger.repayment_percentage().round_dp(2), dec!(66.15));

        // same inputs, same snapshot
        let snapshot = ledger.clone();
        assert_eq!(ledger.recalculate(total, payments, maturity, date(2025, 3, 1)).unwrap(), None);
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn test_overpayment_floors_outstanding() {
        let maturity = date(2025, 4, 15);
        let total = Money::from_major(1_000);
        let mut ledger = LoanLedger::open(total, maturity, date(2025, 1, 15));

        let changed = ledger.recalculate(total, [Money::from_major(1_200)], maturity, date(2025, 2, 1)).unwrap();

        assert_eq!(changed, Some(CreditState::Active));
        assert_eq!(ledger.outstanding, Money::ZERO);
        assert_eq!(ledger.amount_paid, Money::from_major(1_200));
        assert!(ledger.is_settled());
    }

    #[test]
    fn test_overdue_and_reversal() {
        let maturity = date(2025, 4, 15);
        let total = Money::from_major(1_000);
        let mut ledger = LoanLedger::open(total, maturity, date(2025, 1, 15));

        let changed = ledger.recalculate(total, [Money::from_major(400)], maturity, date(2025, 4, 20)).unwrap();
        assert_eq!(changed, Some(CreditState::Active));
        assert_eq!(ledger.state, CreditState::Overdue);
        assert_eq!(ledger.days_past_maturity(maturity, date(2025, 4, 20)), 5);

        ledger.recalculate(total, [Money::from_major(400), Money::from_major(600)], maturity, date(2025, 4, 20)).unwrap();
        assert_eq!(ledger.state, CreditState::Completed);
        assert_eq!(ledger.days_past_maturity(maturity, date(2025, 4, 20)), 0);

        // deleting the last payment reopens the loan
        let changed = ledger.recalculate(total, [Money::from_major(400)], maturity, date(2025, 4, 20)).unwrap();
        assert_eq!(changed, Some(CreditState::Completed));
        assert_eq!(ledger.state, CreditState::Overdue);
        assert_eq!(ledger.outstanding, Money::from_major(600));
    }

    #[test]
    fn test_overflowing_payments_leave_ledger_untouched() {
        let maturity = date(2025, 4, 15);
        let total = Money::from_major(1_000);
        let mut ledger = LoanLedger::open(total, maturity, date(2025, 1, 15));
        let snapshot = ledger.clone();

        let huge = Money::from_decimal(Decimal::MAX);
        let err = ledger
            .recalculate(total, [huge, huge], maturity, date(2025, 2, 1))
            .unwrap_err();

        assert_eq!(err, LoanError::AmountOverflow { operation: "amount paid" });
        assert_eq!(ledger, snapshot);
    }
}

//! Portfolio aggregates for the dashboard and the monthly summary.
//!
//! The free functions work on any slice of loans; [`LoanBook::dashboard`]
//! refreshes every loan first and applies the configured limits. Sums are
//! checked, so an out-of-range total is an error rather than a panic.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LoanBook;
use crate::access::{Action, Operator};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::payments::Payment;
use crate::types::{AttendantId, CreditState, LoanId, PaymentId};

/// years accepted by [`monthly_summary`]
pub const SUMMARY_YEARS: std::ops::RangeInclusive<i32> = 2000..=2100;

/// headline figures across the whole book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub loan_count: usize,
    /// sum of principals
    pub granted: Money,
    /// sum of totals repayable
    pub receivable: Money,
    pub paid: Money,
    pub outstanding: Money,
    /// paid over receivable, percent with two decimals
    pub repayment_rate: Decimal,
    pub active: usize,
    pub overdue: usize,
    pub completed: usize,
}

impl PortfolioTotals {
    pub fn count(&self, state: CreditState) -> usize {
        match state {
            CreditState::Active => self.active,
            CreditState::Overdue => self.overdue,
            CreditState::Completed => self.completed,
        }
    }
}

/// a payment as listed on the dashboard and in summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPayment {
    pub payment_id: PaymentId,
    pub loan_id: LoanId,
    pub borrower_name: String,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: String,
    pub attendant_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtorEntry {
    pub loan_id: LoanId,
    pub borrower_name: String,
    pub phone: String,
    pub outstanding: Money,
    pub maturity_date: NaiveDate,
    pub state: CreditState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodTotal {
    pub method: String,
    pub count: usize,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendantTotal {
    pub attendant_id: AttendantId,
    pub name: Option<String>,
    pub count: usize,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub count: usize,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMaturity {
    pub loan_id: LoanId,
    pub borrower_name: String,
    pub maturity_date: NaiveDate,
    pub days_remaining: i64,
    pub outstanding: Money,
}

/// a loan started in the summarized month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginatedLoan {
    pub loan_id: LoanId,
    pub borrower_name: String,
    pub start_date: NaiveDate,
    pub principal: Money,
    pub total_repayable: Money,
}

/// figures for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// loans whose start date falls in the month, in origination order
    pub originated: Vec<OriginatedLoan>,
    pub principal_granted: Money,
    /// total repayable of the loans started in the month
    pub total_repayable: Money,
    /// payments dated in the month, oldest first
    pub payments: Vec<RecentPayment>,
    pub payments_received: Money,
}

/// everything the dashboard shows, as of one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub totals: PortfolioTotals,
    pub recent_payments: Vec<RecentPayment>,
    pub top_debtors: Vec<DebtorEntry>,
    pub by_method: Vec<MethodTotal>,
    pub by_attendant: Vec<AttendantTotal>,
    pub by_month: Vec<MonthTotal>,
    pub upcoming_maturities: Vec<UpcomingMaturity>,
}

fn checked_total<I>(amounts: I, operation: &'static str) -> Result<Money>
where
    I: IntoIterator<Item = Money>,
{
    Money::checked_sum(amounts).ok_or(LoanError::AmountOverflow { operation })
}

/// add one payment to a `(count, total)` group
fn accumulate(group: &mut (usize, Money), amount: Money) -> Result<()> {
    group.1 = group
        .1
        .checked_add(amount)
        .ok_or(LoanError::AmountOverflow { operation: "payment totals" })?;
    group.0 += 1;
    Ok(())
}

fn payment_line<F>(loan: &Loan, payment: &Payment, attendant_name: &F) -> RecentPayment
where
    F: Fn(Option<AttendantId>) -> Option<String>,
{
    RecentPayment {
        payment_id: payment.id,
        loan_id: loan.id,
        borrower_name: loan.borrower.name.clone(),
        amount: payment.amount,
        paid_on: payment.paid_on,
        method: payment.method.clone(),
        attendant_name: attendant_name(payment.attendant_id),
    }
}

pub fn portfolio_totals(loans: &[Loan]) -> Result<PortfolioTotals> {
    let granted = checked_total(loans.iter().map(|l| l.terms.principal), "granted")?;
    let receivable = checked_total(loans.iter().map(|l| l.schedule.total_repayable), "receivable")?;
    let paid = checked_total(loans.iter().map(|l| l.ledger.amount_paid), "paid")?;
    let outstanding = checked_total(loans.iter().map(|l| l.outstanding()), "outstanding")?;
    let count = |state: CreditState| loans.iter().filter(|l| l.state() == state).count();

    Ok(PortfolioTotals {
        loan_count: loans.len(),
        granted,
        receivable,
        paid,
        outstanding,
        repayment_rate: paid.percentage_of(receivable).round_dp(2),
        active: count(CreditState::Active),
        overdue: count(CreditState::Overdue),
        completed: count(CreditState::Completed),
    })
}

/// latest payments across all loans
pub fn recent_payments<F>(loans: &[Loan], limit: usize, attendant_name: F) -> Vec<RecentPayment>
where
    F: Fn(Option<AttendantId>) -> Option<String>,
{
    let mut payments: Vec<(&Loan, &Payment)> = loans
        .iter()
        .flat_map(|loan| loan.payments().iter().map(move |p| (loan, p)))
        .collect();
    payments.sort_by(|(_, a), (_, b)| Payment::cmp_recent_first(a, b));

    payments
        .into_iter()
        .take(limit)
        .map(|(loan, payment)| payment_line(loan, payment, &attendant_name))
        .collect()
}

/// every loan with a balance left, largest balance first
pub fn debtors(loans: &[Loan]) -> Vec<DebtorEntry> {
    let mut owing: Vec<&Loan> = loans.iter().filter(|l| l.outstanding().is_positive()).collect();
    owing.sort_by(|a, b| {
        b.outstanding()
            .cmp(&a.outstanding())
            .then_with(|| a.maturity_date().cmp(&b.maturity_date()))
    });

    owing
        .into_iter()
        .map(|loan| DebtorEntry {
            loan_id: loan.id,
            borrower_name: loan.borrower.name.clone(),
            phone: loan.borrower.phone.clone(),
            outstanding: loan.outstanding(),
            maturity_date: loan.maturity_date(),
            state: loan.state(),
        })
        .collect()
}

/// the `limit` largest debtors
pub fn top_debtors(loans: &[Loan], limit: usize) -> Vec<DebtorEntry> {
    let mut entries = debtors(loans);
    entries.truncate(limit);
    entries
}

/// payment totals per method, largest first
pub fn totals_by_method(loans: &[Loan]) -> Result<Vec<MethodTotal>> {
    let mut groups: BTreeMap<&str, (usize, Money)> = BTreeMap::new();
    for payment in loans.iter().flat_map(|l| l.payments()) {
        accumulate(
            groups.entry(payment.method.as_str()).or_insert((0, Money::ZERO)),
            payment.amount,
        )?;
    }

    let mut totals: Vec<MethodTotal> = groups
        .into_iter()
        .map(|(method, (count, total))| MethodTotal {
            method: method.to_string(),
            count,
            total,
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(totals)
}

/// payment totals per attendant, unattributed payments excluded
pub fn totals_by_attendant<F>(loans: &[Loan], attendant_name: F) -> Result<Vec<AttendantTotal>>
where
    F: Fn(Option<AttendantId>) -> Option<String>,
{
    let mut groups: BTreeMap<AttendantId, (usize, Money)> = BTreeMap::new();
    for payment in loans.iter().flat_map(|l| l.payments()) {
        if let Some(id) = payment.attendant_id {
            accumulate(groups.entry(id).or_insert((0, Money::ZERO)), payment.amount)?;
        }
    }

    let mut totals: Vec<AttendantTotal> = groups
        .into_iter()
        .map(|(id, (count, total))| AttendantTotal {
            attendant_id: id,
            name: attendant_name(Some(id)),
            count,
            total,
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(totals)
}

/// payment totals per calendar month of the payment date, oldest first
pub fn payments_by_month(loans: &[Loan]) -> Result<Vec<MonthTotal>> {
    let mut groups: BTreeMap<(i32, u32), (usize, Money)> = BTreeMap::new();
    for payment in loans.iter().flat_map(|l| l.payments()) {
        let key = (payment.paid_on.year(), payment.paid_on.month());
        accumulate(groups.entry(key).or_insert((0, Money::ZERO)), payment.amount)?;
    }

    Ok(groups
        .into_iter()
        .map(|((year, month), (count, total))| MonthTotal {
            year,
            month,
            count,
            total,
        })
        .collect())
}

/// active loans maturing within `window_days` of `as_of`, soonest first
pub fn upcoming_maturities(loans: &[Loan], as_of: NaiveDate, window_days: i64) -> Vec<UpcomingMaturity> {
    let mut upcoming: Vec<UpcomingMaturity> = loans
        .iter()
        .filter(|l| l.state() == CreditState::Active)
        .filter_map(|loan| {
            let days_remaining = loan.days_until_maturity(as_of);
            (0..=window_days).contains(&days_remaining).then(|| UpcomingMaturity {
                loan_id: loan.id,
                borrower_name: loan.borrower.name.clone(),
                maturity_date: loan.maturity_date(),
                days_remaining,
                outstanding: loan.outstanding(),
            })
        })
        .collect();
    upcoming.sort_by_key(|u| u.maturity_date);
    upcoming
}

/// Loans started and payments received in one calendar month.
///
/// `month` must be 1 to 12 and `year` within [`SUMMARY_YEARS`].
pub fn monthly_summary<F>(loans: &[Loan], year: i32, month: u32, attendant_name: F) -> Result<MonthlySummary>
where
    F: Fn(Option<AttendantId>) -> Option<String>,
{
    if !(1..=12).contains(&month) {
        return Err(LoanError::InvalidPeriod {
            message: format!("month must be 1-12, got {}", month),
        });
    }
    if !SUMMARY_YEARS.contains(&year) {
        return Err(LoanError::InvalidPeriod {
            message: format!(
                "year must be {}-{}, got {}",
                SUMMARY_YEARS.start(),
                SUMMARY_YEARS.end(),
                year
            ),
        });
    }
    let in_month = |date: NaiveDate| date.year() == year && date.month() == month;

    let originated: Vec<OriginatedLoan> = loans
        .iter()
        .filter(|l| in_month(l.terms.start_date))
        .map(|loan| OriginatedLoan {
            loan_id: loan.id,
            borrower_name: loan.borrower.name.clone(),
            start_date: loan.terms.start_date,
            principal: loan.terms.principal,
            total_repayable: loan.schedule.total_repayable,
        })
        .collect();

    let mut paid: Vec<(&Loan, &Payment)> = loans
        .iter()
        .flat_map(|loan| loan.payments().iter().map(move |p| (loan, p)))
        .filter(|(_, p)| in_month(p.paid_on))
        .collect();
    paid.sort_by(|(_, a), (_, b)| Payment::cmp_recent_first(b, a));
    let payments: Vec<RecentPayment> = paid
        .into_iter()
        .map(|(loan, payment)| payment_line(loan, payment, &attendant_name))
        .collect();

    Ok(MonthlySummary {
        year,
        month,
        principal_granted: checked_total(originated.iter().map(|o| o.principal), "principal granted")?,
        total_repayable: checked_total(originated.iter().map(|o| o.total_repayable), "total repayable")?,
        payments_received: checked_total(payments.iter().map(|p| p.amount), "payments received")?,
        originated,
        payments,
    })
}

impl LoanBook {
    /// refresh every loan and aggregate the dashboard
    pub fn dashboard(&mut self, operator: &Operator, time_provider: &SafeTimeProvider) -> Result<Dashboard> {
        operator.authorize(Action::ViewDashboard)?;
        self.refresh_all(time_provider)?;

        let as_of = time_provider.now().date_naive();
        let limits = &self.config.dashboard;
        let name = |id: Option<AttendantId>| self.attendant_name(id);

        let dashboard = Dashboard {
            as_of,
            totals: portfolio_totals(&self.loans)?,
            recent_payments: recent_payments(&self.loans, limits.recent_payments_limit, name),
            top_debtors: top_debtors(&self.loans, limits.top_debtors_limit),
            by_method: totals_by_method(&self.loans)?,
            by_attendant: totals_by_attendant(&self.loans, name)?,
            by_month: payments_by_month(&self.loans)?,
            upcoming_maturities: upcoming_maturities(&self.loans, as_of, limits.maturity_alert_days),
        };

        debug!(
            %as_of,
            loans = dashboard.totals.loan_count,
            overdue = dashboard.totals.overdue,
            "dashboard aggregated"
        );

        Ok(dashboard)
    }

    /// every loan still owing, largest balance first, without the dashboard limit
    pub fn debtors(&mut self, operator: &Operator, time_provider: &SafeTimeProvider) -> Result<Vec<DebtorEntry>> {
        operator.authorize(Action::ViewDashboard)?;
        self.refresh_all(time_provider)?;
        Ok(debtors(&self.loans))
    }

    pub fn monthly_summary(&self, operator: &Operator, year: i32, month: u32) -> Result<MonthlySummary> {
        operator.authorize(Action::ViewDashboard)?;
        monthly_summary(&self.loans, year, month, |id| self.attendant_name(id))
    }

    /// loans currently in `state`, newest first
    pub fn loans_in_state(
        &mut self,
        operator: &Operator,
        state: CreditState,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<&Loan>> {
        operator.authorize(Action::ViewLoans)?;
        self.refresh_all(time_provider)?;
        Ok(self.loans.iter().rev().filter(|l| l.state() == state).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::LoanTerms;
    use crate::config::{DashboardConfig, LoanProductConfig};
    use crate::payments::PaymentRequest;
    use crate::types::Borrower;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        book: LoanBook,
        time: SafeTimeProvider,
        admin: Operator,
    }

    impl Fixture {
        fn new() -> Self {
            let time = SafeTimeProvider::new(TimeSource::Test(
                Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
            ));
            Self {
                book: LoanBook::new(LoanProductConfig::standard()).unwrap(),
                time,
                admin: Operator::admin("admin"),
            }
        }

        fn loan(&mut self, name: &str, principal: i64, months: u32, start: NaiveDate) -> LoanId {
            self.book
                .create_loan(
                    &self.admin,
                    Borrower::new(name, "923000000", "Trader", Money::from_major(100_000)),
                    LoanTerms::new(Money::from_major(principal), months, start),
                    None,
                    &self.time,
                )
                .unwrap()
                .id
        }

        fn pay(&mut self, loan_id: LoanId, amount: i64, paid_on: NaiveDate, method: &str) -> PaymentId {
            let request = PaymentRequest::new(loan_id, Money::from_major(amount), paid_on, method);
            self.book.record_payment(&self.admin, request, &self.time).unwrap().id
        }
    }

    #[test]
    fn test_totals_and_state_counts() {
        let mut f = Fixture::new();
        // 10000 -> 10900, matures 2025-02-01, overdue on 2025-03-01
        let overdue = f.loan("Ana", 10_000, 1, date(2025, 1, 1));
        // 100000 -> 130000, matures 2025-05-15
        let active = f.loan("Bruno", 100_000, 3, date(2025, 2, 15));
        // 20000 -> 21800, paid off
        let completed = f.loan("Carla", 20_000, 1, date(2025, 2, 20));

        f.pay(overdue, 900, date(2025, 1, 20), "Cash");
        f.pay(active, 30_000, date(2025, 2, 28), "Transfer");
        f.pay(completed, 21_800, date(2025, 3, 1), "Transfer");

        let dashboard = f.book.dashboard(&f.admin, &f.time).unwrap();
        let totals = &dashboard.totals;

        assert_eq!(totals.loan_count, 3);
        assert_eq!(totals.granted, Money::from_major(130_000));
        assert_eq!(totals.receivable, Money::from_major(162_700));
        assert_eq!(totals.paid, Money::from_major(52_700));
        assert_eq!(totals.outstanding, Money::from_major(110_000));
        assert_eq!(totals.repayment_rate, dec!(32.39));
        assert_eq!(totals.count(CreditState::Active), 1);
        assert_eq!(totals.count(CreditState::Overdue), 1);
        assert_eq!(totals.count(CreditState::Completed), 1);

        let overdue_loans = f.book.loans_in_state(&f.admin, CreditState::Overdue, &f.time).unwrap();
        assert_eq!(overdue_loans.len(), 1);
        assert_eq!(overdue_loans[0].id, overdue);
    }

    #[test]
    fn test_payment_breakdowns() {
        let mut f = Fixture::new();
        let loan = f.loan("Ana", 100_000, 6, date(2025, 1, 10));
        let attendant = f
            .book
            .create_attendant(&f.admin, "Rui", None, &f.time)
            .unwrap()
            .id;

        f.pay(loan, 1_000, date(2025, 1, 20), "Cash");
        f.pay(loan, 2_000, date(2025, 2, 5), "Transfer");
        f.pay(loan, 500, date(2025, 2, 25), "Cash");
        let request = PaymentRequest::new(loan, Money::from_major(4_000), date(2025, 2, 26), "Transfer")
            .attendant(attendant);
        f.book.record_payment(&f.admin, request, &f.time).unwrap();

        let dashboard = f.book.dashboard(&f.admin, &f.time).unwrap();

        assert_eq!(dashboard.by_method[0].method, "Transfer");
        assert_eq!(dashboard.by_method[0].total, Money::from_major(6_000));
        assert_eq!(dashboard.by_method[1].count, 2);

        assert_eq!(dashboard.by_attendant.len(), 1);
        assert_eq!(dashboard.by_attendant[0].name.as_deref(), Some("Rui"));
        assert_eq!(dashboard.by_attendant[0].total, Money::from_major(4_000));

        assert_eq!(dashboard.by_month.len(), 2);
        assert_eq!((dashboard.by_month[0].year, dashboard.by_month[0].month), (2025, 1));
        assert_eq!(dashboard.by_month[1].count, 3);
        assert_eq!(dashboard.by_month[1].total, Money::from_major(6_500));

        assert_eq!(dashboard.recent_payments[0].paid_on, date(2025, 2, 26));
        assert_eq!(dashboard.recent_payments[0].attendant_name.as_deref(), Some("Rui"));
        assert_eq!(dashboard.recent_payments.last().map(|p| p.paid_on), Some(date(2025, 1, 20)));
    }

    #[test]
    fn test_limits_apply() {
        let mut f = Fixture::new();
        f.book.config.dashboard = DashboardConfig {
            recent_payments_limit: 2,
            top_debtors_limit: 1,
            ..DashboardConfig::default()
        };
        let small = f.loan("Ana", 1_000, 2, date(2025, 2, 1));
        let large = f.loan("Bruno", 50_000, 2, date(2025, 2, 1));
        for day in 1..=3 {
            f.pay(small, 10, date(2025, 2, day), "Cash");
        }

        let dashboard = f.book.dashboard(&f.admin, &f.time).unwrap();
        assert_eq!(dashboard.recent_payments.len(), 2);
        assert_eq!(dashboard.top_debtors.len(), 1);
        assert_eq!(dashboard.top_debtors[0].loan_id, large);
    }

    #[test]
    fn test_upcoming_maturities_window() {
        let mut f = Fixture::new();
        // matures 2025-03-05, 4 days away
        let soon = f.loan("Ana", 1_000, 1, date(2025, 2, 5));
        // matures 2025-03-08, exactly 7 days away
        let edge = f.loan("Bruno", 1_000, 1, date(2025, 2, 8));
        // matures 2025-03-09, outside the window
        f.loan("Carla", 1_000, 1, date(2025, 2, 9));
        // matures 2025-03-03 but fully paid
        let paid = f.loan("Dina", 1_000, 1, date(2025, 2, 3));
        f.pay(paid, 1_090, date(2025, 2, 20), "Cash");

        let upcoming = upcoming_maturities(f.book.loans(), date(2025, 3, 1), 7);
        let ids: Vec<LoanId> = upcoming.iter().map(|u| u.loan_id).collect();
        assert_eq!(ids, vec![soon, edge]);
        assert_eq!(upcoming[0].days_remaining, 4);
        assert_eq!(upcoming[1].days_remaining, 7);

        // on its maturity date the loan is still listed, with zero days left
        f.time.test_control().unwrap().advance(Duration::days(4));
        let dashboard = f.book.dashboard(&f.admin, &f.time).unwrap();
        assert_eq!(dashboard.upcoming_maturities[0].days_remaining, 0);
    }

    #[test]
    fn test_debtors_are_not_capped() {
        let mut f = Fixture::new();
        f.book.config.dashboard = DashboardConfig {
            top_debtors_limit: 1,
            ..DashboardConfig::default()
        };
        let small = f.loan("Ana", 1_000, 2, date(2025, 2, 1));
        let large = f.loan("Bruno", 50_000, 2, date(2025, 2, 1));
        let settled = f.loan("Carla", 1_000, 1, date(2025, 2, 1));
        f.pay(settled, 1_090, date(2025, 2, 10), "Cash");

        let debtors = f.book.debtors(&f.admin, &f.time).unwrap();
        let ids: Vec<LoanId> = debtors.iter().map(|d| d.loan_id).collect();
        assert_eq!(ids, vec![large, small]);
        assert_eq!(debtors[1].outstanding, Money::from_major(1_190));

        let dashboard = f.book.dashboard(&f.admin, &f.time).unwrap();
        assert_eq!(dashboard.top_debtors.len(), 1);
    }

    #[test]
    fn test_monthly_summary() {
        let mut f = Fixture::new();
        let january = f.loan("Ana", 10_000, 1, date(2025, 1, 10));
        let first = f.loan("Bruno", 100_000, 3, date(2025, 2, 3));
        let second = f.loan("Carla", 20_000, 2, date(2025, 2, 27));

        f.pay(january, 5_000, date(2025, 2, 20), "Cash");
        f.pay(first, 1_000, date(2025, 2, 5), "Transfer");
        f.pay(second, 300, date(2025, 3, 1), "Cash");
        f.pay(january, 200, date(2025, 1, 31), "Cash");

        let summary = f.book.monthly_summary(&f.admin, 2025, 2).unwrap();
        let originated: Vec<LoanId> = summary.originated.iter().map(|o| o.loan_id).collect();
        assert_eq!(originated, vec![first, second]);
        assert_eq!(summary.principal_granted, Money::from_major(120_000));
        // 130000 + 20000 * 1.19
        assert_eq!(summary.total_repayable, Money::from_major(153_800));

        let dates: Vec<NaiveDate> = summary.payments.iter().map(|p| p.paid_on).collect();
        assert_eq!(dates, vec![date(2025, 2, 5), date(2025, 2, 20)]);
        assert_eq!(summary.payments_received, Money::from_major(6_000));
        assert_eq!(summary.payments[1].borrower_name, "Ana");

        let empty = f.book.monthly_summary(&Operator::read_only("viewer"), 2024, 12).unwrap();
        assert!(empty.originated.is_empty());
        assert_eq!(empty.payments_received, Money::ZERO);
    }

    #[test]
    fn test_monthly_summary_rejects_invalid_period() {
        let f = Fixture::new();
        for (year, month) in [(2025, 0), (2025, 13), (1999, 6), (2101, 1)] {
            let err = f.book.monthly_summary(&f.admin, year, month).unwrap_err();
            assert!(matches!(err, LoanError::InvalidPeriod { .. }));
            assert!(err.is_invalid_input());
        }
        assert!(f.book.monthly_summary(&f.admin, 2100, 12).is_ok());
        assert!(f.book.monthly_summary(&Operator::admin("old").deactivated(), 2025, 1).is_err());
    }

    #[test]
    fn test_out_of_range_totals_are_an_error() {
        let mut f = Fixture::new();
        let huge = crate::payments::parse_amount("50000000000000000000000000000").unwrap();
        for name in ["Ana", "Bruno"] {
            f.book
                .create_loan(
                    &f.admin,
                    Borrower::new(name, "923000000", "Trader", Money::from_major(100_000)),
                    LoanTerms::new(huge, 1, date(2025, 2, 1)),
                    None,
                    &f.time,
                )
                .unwrap();
        }

        let err = f.book.dashboard(&f.admin, &f.time).unwrap_err();
        assert!(matches!(err, LoanError::AmountOverflow { .. }));
        assert!(portfolio_totals(f.book.loans()).is_err());
        assert!(f.book.monthly_summary(&f.admin, 2025, 2).is_err());
        // listing debtors needs no sum
        assert_eq!(f.book.debtors(&f.admin, &f.time).unwrap().len(), 2);
    }

    #[test]
    fn test_loans_in_state_requires_active_operator() {
        let mut f = Fixture::new();
        f.loan("Ana", 1_000, 1, date(2025, 2, 1));
        let inactive = Operator::read_only("old").deactivated();
        assert!(f.book.loans_in_state(&inactive, CreditState::Active, &f.time).is_err());
        assert_eq!(
            f.book
                .loans_in_state(&Operator::read_only("viewer"), CreditState::Active, &f.time)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_empty_book() {
        let mut f = Fixture::new();
        let dashboard = f.book.dashboard(&Operator::read_only("viewer"), &f.time).unwrap();
        assert_eq!(dashboard.totals.repayment_rate, Decimal::ZERO);
        assert!(dashboard.recent_payments.is_empty());
        assert!(dashboard.upcoming_maturities.is_empty());
    }
}

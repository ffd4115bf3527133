use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculator::{LoanSchedule, LoanTerms};
use crate::config::LoanProductConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::LoanLedger;
use crate::payments::{Payment, PaymentRequest};
use crate::types::{Borrower, CreditState, LoanId, PaymentId};

/// a loan contract with its payments and derived balances
#[derive(Debug, Clone)]
pub struct Loan {
    pub id: LoanId,
    pub borrower: Borrower,
    pub terms: LoanTerms,
    /// schedule as persisted, money rounded to currency precision
    pub schedule: LoanSchedule,
    pub ledger: LoanLedger,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub events: EventStore,
    payments: Vec<Payment>,
}

impl Loan {
    /// builder for creating loans
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    /// originate a loan: validate, compute the schedule, open the ledger
    pub fn originate(
        borrower: Borrower,
        terms: LoanTerms,
        comment: Option<String>,
        config: &LoanProductConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        borrower.validate()?;

        let schedule = LoanSchedule::compute_with(&terms, &config.rate_table)?
            .rounded(config.currency_decimal_places);

        let now = time_provider.now();
        let as_of = now.date_naive();
        let ledger = LoanLedger::open(schedule.total_repayable, schedule.maturity_date, as_of);

        let mut loan = Self {
            id: Uuid::new_v4(),
            borrower,
            terms,
            schedule,
            ledger,
            comment,
            created_at: now,
            events: EventStore::new(),
            payments: Vec::new(),
        };

        loan.events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            principal: loan.terms.principal,
            duration_months: loan.terms.duration_months,
            rate: loan.schedule.rate,
            total_repayable: loan.schedule.total_repayable,
            maturity_date: loan.schedule.maturity_date,
            timestamp: now,
        });

        info!(
            loan_id = %loan.id,
            principal = %loan.terms.principal,
            months = loan.terms.duration_months,
            total = %loan.schedule.total_repayable,
            maturity = %loan.schedule.maturity_date,
            "loan originated"
        );

        Ok(loan)
    }

    /// post a payment event and recompute balances
    pub fn post_payment(
        &mut self,
        request: PaymentRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Payment> {
        if request.loan_id != self.id {
            return Err(LoanError::InvalidField {
                field: "loan_id",
                message: format!("payment for {} posted to loan {}", request.loan_id, self.id),
            });
        }

        let now = time_provider.now();
        let payment = Payment::from_request(request, now)?;
        let (payment_id, amount, paid_on) = (payment.id, payment.amount, payment.paid_on);

        let amounts = self.payments.iter().map(|p| p.amount).chain(Some(amount));
        let (ledger, changed) = self.project(&self.schedule, amounts, now.date_naive())?;
        self.payments.push(payment);
        self.commit(ledger, changed, now);

        self.events.emit(Event::PaymentPosted {
            loan_id: self.id,
            payment_id,
            amount,
            paid_on,
            outstanding_after: self.ledger.outstanding,
            timestamp: now,
        });

        info!(
            loan_id = %self.id,
            %payment_id,
            %amount,
            outstanding = %self.ledger.outstanding,
            state = %self.ledger.state,
            "payment posted"
        );

        let index = self.payments.len() - 1;
        Ok(&self.payments[index])
    }

    /// delete a payment event; the only way to reduce the amount paid
    pub fn reverse_payment(
        &mut self,
        payment_id: PaymentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        let index = self
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or(LoanError::PaymentNotFound { id: payment_id })?;

        let now = time_provider.now();
        let amounts = self
            .payments
            .iter()
            .filter(|p| p.id != payment_id)
            .map(|p| p.amount);
        let (ledger, changed) = self.project(&self.schedule, amounts, now.date_naive())?;
        let removed = self.payments.remove(index);
        self.commit(ledger, changed, now);

        self.events.emit(Event::PaymentReversed {
            loan_id: self.id,
            payment_id,
            amount: removed.amount,
            outstanding_after: self.ledger.outstanding,
            timestamp: now,
        });

        info!(
            loan_id = %self.id,
            %payment_id,
            amount = %removed.amount,
            outstanding = %self.ledger.outstanding,
            "payment reversed"
        );

        Ok(removed)
    }

    /// Apply a partial update.
    ///
    /// Changing principal, duration or start date recomputes the whole
    /// schedule; nothing is modified if the new terms are rejected.
    pub fn amend(
        &mut self,
        update: LoanUpdate,
        config: &LoanProductConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let fields = update.changed_fields();

        let borrower = update.apply_to_borrower(&self.borrower);
        borrower.validate()?;

        let terms = LoanTerms {
            principal: update.principal.unwrap_or(self.terms.principal),
            duration_months: update.duration_months.unwrap_or(self.terms.duration_months),
            start_date: update.start_date.unwrap_or(self.terms.start_date),
        };

        let schedule_recomputed = update.touches_terms();
        let schedule = if schedule_recomputed {
            LoanSchedule::compute_with(&terms, &config.rate_table)?
                .rounded(config.currency_decimal_places)
        } else {
            self.schedule.clone()
        };

        let now = time_provider.now();
        let amounts = self.payments.iter().map(|p| p.amount);
        let (ledger, changed) = self.project(&schedule, amounts, now.date_naive())?;

        self.borrower = borrower;
        self.terms = terms;
        self.schedule = schedule;
        if let Some(comment) = update.comment {
            self.comment = Some(comment);
        }
        self.commit(ledger, changed, now);

        self.events.emit(Event::LoanAmended {
            loan_id: self.id,
            fields: fields.clone(),
            schedule_recomputed,
            timestamp: now,
        });

        info!(loan_id = %self.id, ?fields, schedule_recomputed, "loan amended");

        Ok(())
    }

    /// recompute paid, outstanding and state as of the provider's date
    pub fn refresh(&mut self, time_provider: &SafeTimeProvider) -> Result<CreditState> {
        let now = time_provider.now();
        let amounts = self.payments.iter().map(|p| p.amount);
        let (ledger, changed) = self.project(&self.schedule, amounts, now.date_naive())?;
        self.commit(ledger, changed, now);
        Ok(self.ledger.state)
    }

    /// refresh with system time
    pub fn refresh_now(&mut self) -> Result<CreditState> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.refresh(&time)
    }

    /// ledger recalculated over `amounts`, leaving the loan untouched
    fn project<I>(
        &self,
        schedule: &LoanSchedule,
        amounts: I,
        as_of: NaiveDate,
    ) -> Result<(LoanLedger, Option<CreditState>)>
    where
        I: IntoIterator<Item = Money>,
    {
        let mut ledger = self.ledger.clone();
        let changed = ledger.recalculate(
            schedule.total_repayable,
            amounts,
            schedule.maturity_date,
            as_of,
        )?;
        Ok((ledger, changed))
    }

    fn commit(&mut self, ledger: LoanLedger, changed: Option<CreditState>, now: DateTime<Utc>) {
        self.ledger = ledger;

        if let Some(old_state) = changed {
            let new_state = self.ledger.state;
            if new_state == CreditState::Overdue {
                warn!(
                    loan_id = %self.id,
                    outstanding = %self.ledger.outstanding,
                    maturity = %self.schedule.maturity_date,
                    "loan overdue"
                );
            }
            self.events.emit(Event::StateChanged {
                loan_id: self.id,
                old_state,
                new_state,
                as_of: self.ledger.as_of,
                timestamp: now,
            });
        }
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// payments ordered most recent first
    pub fn payments_recent_first(&self) -> Vec<&Payment> {
        let mut payments: Vec<&Payment> = self.payments.iter().collect();
        payments.sort_by(|a, b| Payment::cmp_recent_first(a, b));
        payments
    }

    pub fn find_payment(&self, payment_id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == payment_id)
    }

    pub fn has_payments(&self) -> bool {
        !self.payments.is_empty()
    }

    pub fn state(&self) -> CreditState {
        self.ledger.state
    }

    pub fn outstanding(&self) -> Money {
        self.ledger.outstanding
    }

    pub fn maturity_date(&self) -> NaiveDate {
        self.schedule.maturity_date
    }

    /// signed days from `as_of` to maturity, negative once past it
    pub fn days_until_maturity(&self, as_of: NaiveDate) -> i64 {
        (self.schedule.maturity_date - as_of).num_days()
    }
}

/// partial update of a loan; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub profession: Option<String>,
    pub monthly_salary: Option<Money>,
    pub principal: Option<Money>,
    pub duration_months: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl LoanUpdate {
    /// whether the update changes an input of the schedule
    pub fn touches_terms(&self) -> bool {
        self.principal.is_some() || self.duration_months.is_some() || self.start_date.is_some()
    }

    pub fn changed_fields(&self) -> Vec<String> {
        [
            ("name", self.name.is_some()),
            ("phone", self.phone.is_some()),
            ("profession", self.profession.is_some()),
            ("monthly_salary", self.monthly_salary.is_some()),
            ("principal", self.principal.is_some()),
            ("duration_months", self.duration_months.is_some()),
            ("start_date", self.start_date.is_some()),
            ("comment", self.comment.is_some()),
        ]
        .into_iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| name.to_string())
        .collect()
    }

    fn apply_to_borrower(&self, current: &Borrower) -> Borrower {
        Borrower {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| current.phone.clone()),
            profession: self.profession.clone().unwrap_or_else(|| current.profession.clone()),
            monthly_salary: self.monthly_salary.unwrap_or(current.monthly_salary),
        }
    }
}

/// builder for loans
#[derive(Debug, Default)]
pub struct LoanBuilder {
    borrower: Option<Borrower>,
    principal: Option<Money>,
    duration_months: Option<u32>,
    start_date: Option<NaiveDate>,
    comment: Option<String>,
    config: Option<LoanProductConfig>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrower(mut self, borrower: Borrower) -> Self {
        self.borrower = Some(borrower);
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn duration_months(mut self, months: u32) -> Self {
        self.duration_months = Some(months);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn config(mut self, config: LoanProductConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// terms without building; start date defaults to the provider's date
    pub fn terms(&self, time_provider: &SafeTimeProvider) -> Result<LoanTerms> {
        let principal = self.principal.ok_or(LoanError::InvalidField {
            field: "principal",
            message: "required".to_string(),
        })?;
        let duration_months = self.duration_months.ok_or(LoanError::InvalidField {
            field: "duration_months",
            message: "required".to_string(),
        })?;
        let start_date = self
            .start_date
            .unwrap_or_else(|| time_provider.now().date_naive());

        Ok(LoanTerms::new(principal, duration_months, start_date))
    }

    /// build with system time
    pub fn build_now(self) -> Result<Loan> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build(&time)
    }

    /// build with explicit time provider
    pub fn build(self, time_provider: &SafeTimeProvider) -> Result<Loan> {
        let terms = self.terms(time_provider)?;
        let borrower = self.borrower.ok_or(LoanError::InvalidField {
            field: "borrower",
            message: "required".to_string(),
        })?;
        let config = self.config.unwrap_or_default();

        Loan::originate(borrower, terms, self.comment, &config, time_provider)
    }
}

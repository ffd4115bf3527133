//! In-memory loan book: the store the application reads and writes loans,
//! payments and attendants through. Every read of a loan recomputes its
//! ledger first, so stored state never drifts from the payment events.

pub mod attendants;
pub mod dashboard;
pub mod operators;

use hourglass_rs::SafeTimeProvider;
use tracing::info;

use crate::access::{Action, Operator};
use crate::calculator::{simulate, LoanQuote, LoanTerms};
use crate::config::LoanProductConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::{Loan, LoanUpdate};
use crate::payments::{Payment, PaymentRequest};
use crate::serialization::{LoanDetailView, ReceiptView};
use crate::types::{Borrower, LoanId, PaymentId};

pub use attendants::{Attendant, AttendantUpdate};
pub use dashboard::{
    AttendantTotal, Dashboard, DebtorEntry, MethodTotal, MonthTotal, MonthlySummary,
    PortfolioTotals, RecentPayment, UpcomingMaturity,
};

/// store of loans, attendants and operators
#[derive(Debug, Clone)]
pub struct LoanBook {
    config: LoanProductConfig,
    /// in origination order
    loans: Vec<Loan>,
    attendants: Vec<Attendant>,
    /// in creation order
    operators: Vec<Operator>,
}

impl LoanBook {
    pub fn new(config: LoanProductConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            loans: Vec::new(),
            attendants: Vec::new(),
            operators: Vec::new(),
        })
    }

    pub fn config(&self) -> &LoanProductConfig {
        &self.config
    }

    /// quote a loan without creating it
    pub fn simulate(&self, operator: &Operator, principal: Money, months: u32) -> Result<LoanQuote> {
        operator.authorize(Action::SimulateLoan)?;

        simulate(
            &self.config.rate_table,
            principal,
            months,
            self.config.currency_decimal_places,
        )
    }

    pub fn create_loan(
        &mut self,
        operator: &Operator,
        borrower: Borrower,
        terms: LoanTerms,
        comment: Option<String>,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Loan> {
        operator.authorize(Action::CreateLoan)?;

        let loan = Loan::originate(borrower, terms, comment, &self.config, time_provider)?;
        info!(loan_id = %loan.id, operator = %operator.username, "loan added to book");
        self.loans.push(loan);

        let index = self.loans.len() - 1;
        Ok(&self.loans[index])
    }

    /// fetch a loan, recomputing its ledger first
    pub fn get_loan(
        &mut self,
        operator: &Operator,
        id: LoanId,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Loan> {
        operator.authorize(Action::ViewLoans)?;

        let loan = self.loan_mut(id)?;
        loan.refresh(time_provider)?;
        Ok(loan)
    }

    /// fetch without recomputation
    pub(crate) fn peek_loan(&self, id: LoanId) -> Result<&Loan> {
        self.loans
            .iter()
            .find(|l| l.id == id)
            .ok_or(LoanError::LoanNotFound { id })
    }

    /// every loan, newest first, each recomputed
    pub fn list_loans(
        &mut self,
        operator: &Operator,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<&Loan>> {
        operator.authorize(Action::ViewLoans)?;

        self.refresh_all(time_provider)?;
        Ok(self.loans.iter().rev().collect())
    }

    pub fn refresh_all(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        for loan in &mut self.loans {
            loan.refresh(time_provider)?;
        }
        Ok(())
    }

    pub fn amend_loan(
        &mut self,
        operator: &Operator,
        id: LoanId,
        update: LoanUpdate,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Loan> {
        operator.authorize(Action::AmendLoan)?;

        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(LoanError::LoanNotFound { id })?;
        loan.amend(update, &self.config, time_provider)?;
        Ok(loan)
    }

    /// remove a loan that has no recorded payments
    pub fn delete_loan(&mut self, operator: &Operator, id: LoanId) -> Result<Loan> {
        operator.authorize(Action::DeleteLoan)?;

        let index = self.loan_index(id)?;
        let count = self.loans[index].payments().len();
        if count > 0 {
            return Err(LoanError::LoanHasPayments { id, count });
        }

        info!(loan_id = %id, operator = %operator.username, "loan deleted");
        Ok(self.loans.remove(index))
    }

    pub fn record_payment(
        &mut self,
        operator: &Operator,
        request: PaymentRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        operator.authorize(Action::RecordPayment)?;

        if let Some(attendant_id) = request.attendant_id {
            self.attendant(attendant_id)?;
        }

        let loan = self.loan_mut(request.loan_id)?;
        let payment = loan.post_payment(request, time_provider)?.clone();
        Ok(payment)
    }

    pub fn delete_payment(
        &mut self,
        operator: &Operator,
        payment_id: PaymentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        operator.authorize(Action::DeletePayment)?;

        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.find_payment(payment_id).is_some())
            .ok_or(LoanError::PaymentNotFound { id: payment_id })?;

        loan.reverse_payment(payment_id, time_provider)
    }

    pub fn find_payment(&self, operator: &Operator, payment_id: PaymentId) -> Result<(&Loan, &Payment)> {
        operator.authorize(Action::ViewLoans)?;
        self.locate_payment(payment_id)
    }

    fn locate_payment(&self, payment_id: PaymentId) -> Result<(&Loan, &Payment)> {
        self.loans
            .iter()
            .find_map(|loan| loan.find_payment(payment_id).map(|p| (loan, p)))
            .ok_or(LoanError::PaymentNotFound { id: payment_id })
    }

    /// data for a payment receipt
    pub fn payment_receipt(&self, operator: &Operator, payment_id: PaymentId) -> Result<ReceiptView> {
        operator.authorize(Action::DownloadReceipt)?;

        let (loan, payment) = self.locate_payment(payment_id)?;
        let attendant_name = self.attendant_name(payment.attendant_id);
        Ok(ReceiptView::new(loan, payment, attendant_name))
    }

    /// loan plus its payments, most recent first, recomputed
    pub fn loan_with_payments(
        &mut self,
        operator: &Operator,
        id: LoanId,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanDetailView> {
        operator.authorize(Action::ViewLoans)?;

        self.loan_mut(id)?.refresh(time_provider)?;

        let loan = self.peek_loan(id)?;
        Ok(LoanDetailView::new(loan, |attendant_id| self.attendant_name(attendant_id)))
    }

    pub(crate) fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub(crate) fn all_payments(&self) -> impl Iterator<Item = &Payment> {
        self.loans.iter().flat_map(|l| l.payments().iter())
    }

    fn loan_index(&self, id: LoanId) -> Result<usize> {
        self.loans
            .iter()
            .position(|l| l.id == id)
            .ok_or(LoanError::LoanNotFound { id })
    }

    fn loan_mut(&mut self, id: LoanId) -> Result<&mut Loan> {
        self.loans
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(LoanError::LoanNotFound { id })
    }
}

/// serialization support for loans and payments
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::payments::Payment;
use crate::portfolio::Dashboard;
use crate::types::{AttendantId, CreditState, LoanId, PaymentId};

/// serializable view of a loan's current figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub borrower: BorrowerView,
    pub principal: Money,
    pub duration_months: u32,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub interest_rate: Rate,
    pub total_repayable: Money,
    pub installment: Money,
    pub amount_paid: Money,
    pub outstanding: Money,
    pub repayment_percentage: Decimal,
    pub state: CreditState,
    pub payment_count: usize,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerView {
    pub name: String,
    pub phone: String,
    pub profession: String,
    pub monthly_salary: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: String,
    pub receipt_number: Option<String>,
    pub note: Option<String>,
    pub attendant_id: Option<AttendantId>,
    pub attendant_name: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// loan detail page: the loan and its payments, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetailView {
    pub loan: LoanView,
    pub payments: Vec<PaymentView>,
}

/// data printed on a payment receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptView {
    pub payment_id: PaymentId,
    pub receipt_number: Option<String>,
    pub loan_id: LoanId,
    pub borrower_name: String,
    pub borrower_phone: String,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: String,
    pub note: Option<String>,
    pub attendant_name: Option<String>,
    pub total_repayable: Money,
    pub amount_paid: Money,
    pub outstanding: Money,
    pub state: CreditState,
    pub issued_at: DateTime<Utc>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        LoanView {
            id: loan.id,
            borrower: BorrowerView {
                name: loan.borrower.name.clone(),
                phone: loan.borrower.phone.clone(),
                profession: loan.borrower.profession.clone(),
                monthly_salary: loan.borrower.monthly_salary,
            },
            principal: loan.terms.principal,
            duration_months: loan.terms.duration_months,
            start_date: loan.terms.start_date,
            maturity_date: loan.schedule.maturity_date,
            interest_rate: loan.schedule.rate,
            total_repayable: loan.schedule.total_repayable,
            installment: loan.schedule.installment,
            amount_paid: loan.ledger.amount_paid,
            outstanding: loan.ledger.outstanding,
            repayment_percentage: loan.ledger.repayment_percentage().round_dp(2),
            state: loan.ledger.state,
            payment_count: loan.ledger.payment_count,
            comment: loan.comment.clone(),
            created_at: loan.created_at,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl PaymentView {
    pub fn from_payment(payment: &Payment, attendant_name: Option<String>) -> Self {
        PaymentView {
            id: payment.id,
            amount: payment.amount,
            paid_on: payment.paid_on,
            method: payment.method.clone(),
            receipt_number: payment.receipt_number.clone(),
            note: payment.note.clone(),
            attendant_id: payment.attendant_id,
            attendant_name,
            issued_at: payment.issued_at,
        }
    }
}

impl LoanDetailView {
    /// `attendant_name` resolves the display name of a payment's attendant
    pub fn new<F>(loan: &Loan, attendant_name: F) -> Self
    where
        F: Fn(Option<AttendantId>) -> Option<String>,
    {
        LoanDetailView {
            loan: LoanView::from_loan(loan),
            payments: loan
                .payments_recent_first()
                .into_iter()
                .map(|p| PaymentView::from_payment(p, attendant_name(p.attendant_id)))
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl ReceiptView {
    pub fn new(loan: &Loan, payment: &Payment, attendant_name: Option<String>) -> Self {
        ReceiptView {
            payment_id: payment.id,
            receipt_number: payment.receipt_number.clone(),
            loan_id: loan.id,
            borrower_name: loan.borrower.name.clone(),
            borrower_phone: loan.borrower.phone.clone(),
            amount: payment.amount,
            paid_on: payment.paid_on,
            method: payment.method.clone(),
            note: payment.note.clone(),
            attendant_name,
            total_repayable: loan.schedule.total_repayable,
            amount_paid: loan.ledger.amount_paid,
            outstanding: loan.ledger.outstanding,
            state: loan.ledger.state,
            issued_at: payment.issued_at,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Dashboard {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub mod parse;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::{AttendantId, LoanId, PaymentId};

pub use parse::{parse_amount, parse_payment_date};

/// payment request as submitted by an operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub loan_id: LoanId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: String,
    /// receipt number; may repeat across payments
    pub receipt_number: Option<String>,
    pub note: Option<String>,
    pub attendant_id: Option<AttendantId>,
}

impl PaymentRequest {
    pub fn new(loan_id: LoanId, amount: Money, paid_on: NaiveDate, method: impl Into<String>) -> Self {
        Self {
            loan_id,
            amount,
            paid_on,
            method: method.into(),
            receipt_number: None,
            note: None,
            attendant_id: None,
        }
    }

    /// build from raw form input, accepting day-first dates and comma decimals
    pub fn from_input(
        loan_id: LoanId,
        amount: &str,
        paid_on: &str,
        method: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(
            loan_id,
            parse_amount(amount)?,
            parse_payment_date(paid_on)?,
            method,
        ))
    }

    pub fn receipt_number(mut self, receipt: impl Into<String>) -> Self {
        self.receipt_number = Some(receipt.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn attendant(mut self, attendant_id: AttendantId) -> Self {
        self.attendant_id = Some(attendant_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LoanError::InvalidPaymentAmount {
                amount: self.amount,
            });
        }
        LoanError::require_min_len("method", &self.method, 2)?;
        Ok(())
    }
}

/// a payment event posted against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: String,
    pub receipt_number: Option<String>,
    pub note: Option<String>,
    pub attendant_id: Option<AttendantId>,
    pub issued_at: DateTime<Utc>,
}

impl Payment {
    /// validate and stamp a request
    pub fn from_request(request: PaymentRequest, issued_at: DateTime<Utc>) -> Result<Self> {
        request.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            loan_id: request.loan_id,
            amount: request.amount,
            paid_on: request.paid_on,
            method: request.method.trim().to_string(),
            receipt_number: request.receipt_number.map(|r| r.trim().to_string()),
            note: request.note,
            attendant_id: request.attendant_id,
            issued_at,
        })
    }

    /// most recent first: payment date, then issue time
    pub fn cmp_recent_first(a: &Payment, b: &Payment) -> Ordering {
        b.paid_on
            .cmp(&a.paid_on)
            .then_with(|| b.issued_at.cmp(&a.issued_at))
    }
}

/// sort payments for display, most recent first
pub fn sort_recent_first(payments: &mut [Payment]) {
    payments.sort_by(Payment::cmp_recent_first);
}

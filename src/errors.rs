use thiserror::Error;

use crate::access::{Action, Role};
use crate::decimal::{Money, Rate};
use crate::types::{AttendantId, LoanId, PaymentId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("unsupported duration: {months} months (supported: {supported})")]
    UnsupportedDuration {
        months: u32,
        supported: String,
    },

    #[error("invalid duration: {months} months")]
    InvalidDuration {
        months: u32,
    },

    #[error("principal must be positive, got {amount}")]
    NonPositivePrincipal {
        amount: Money,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid amount: {input:?}")]
    InvalidAmount {
        input: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("amount out of range while computing {operation}")]
    AmountOverflow {
        operation: &'static str,
    },

    #[error("invalid report period: {message}")]
    InvalidPeriod {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: PaymentId,
    },

    #[error("attendant not found: {id}")]
    AttendantNotFound {
        id: AttendantId,
    },

    #[error("loan {id} already has {count} recorded payments")]
    LoanHasPayments {
        id: LoanId,
        count: usize,
    },

    #[error("attendant {id} is referenced by {count} payments")]
    AttendantHasPayments {
        id: AttendantId,
        count: usize,
    },

    #[error("operator not found: {username}")]
    OperatorNotFound {
        username: String,
    },

    #[error("username already registered: {username}")]
    DuplicateUsername {
        username: String,
    },

    #[error("attendant email already registered: {email}")]
    DuplicateEmail {
        email: String,
    },

    #[error("permission denied: {role:?} may not {action:?}")]
    PermissionDenied {
        role: Role,
        action: Action,
    },

    #[error("operator {username} is inactive")]
    InactiveOperator {
        username: String,
    },
}

/// coarse classification used at the application boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// caller supplied bad data, maps to a bad request
    InvalidInput,
    NotFound,
    /// operation blocked by existing records
    Conflict,
    Forbidden,
}

impl LoanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanError::UnsupportedDuration { .. }
            | LoanError::InvalidDuration { .. }
            | LoanError::NonPositivePrincipal { .. }
            | LoanError::InvalidPaymentAmount { .. }
            | LoanError::InvalidAmount { .. }
            | LoanError::InvalidDate { .. }
            | LoanError::InvalidField { .. }
            | LoanError::InvalidInterestRate { .. }
            | LoanError::AmountOverflow { .. }
            | LoanError::InvalidPeriod { .. }
            | LoanError::InvalidConfiguration { .. } => ErrorKind::InvalidInput,
            LoanError::LoanNotFound { .. }
            | LoanError::PaymentNotFound { .. }
            | LoanError::AttendantNotFound { .. }
            | LoanError::OperatorNotFound { .. } => ErrorKind::NotFound,
            LoanError::LoanHasPayments { .. }
            | LoanError::AttendantHasPayments { .. }
            | LoanError::DuplicateEmail { .. }
            | LoanError::DuplicateUsername { .. } => ErrorKind::Conflict,
            LoanError::PermissionDenied { .. } | LoanError::InactiveOperator { .. } => {
                ErrorKind::Forbidden
            }
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// check a text field against a minimum length
    pub(crate) fn require_min_len(field: &'static str, value: &str, min: usize) -> Result<()> {
        if value.trim().chars().count() < min {
            return Err(LoanError::InvalidField {
                field,
                message: format!("must have at least {} characters", min),
            });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

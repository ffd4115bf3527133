use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan contract
pub type LoanId = Uuid;

/// unique identifier for a payment event
pub type PaymentId = Uuid;

/// unique identifier for an attendant
pub type AttendantId = Uuid;

/// lifecycle state of a loan, always derived from balance and dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditState {
    /// within term and still owing
    Active,
    /// past maturity with a positive balance
    Overdue,
    /// nothing left to pay
    Completed,
}

impl CreditState {
    pub const ALL: [CreditState; 3] = [CreditState::Active, CreditState::Overdue, CreditState::Completed];

    pub fn is_open(&self) -> bool {
        !matches!(self, CreditState::Completed)
    }
}

impl fmt::Display for CreditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CreditState::Active => "Active",
            CreditState::Overdue => "Overdue",
            CreditState::Completed => "Completed",
        };
        f.write_str(label)
    }
}

/// borrower details captured at origination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub name: String,
    pub phone: String,
    pub profession: String,
    pub monthly_salary: crate::decimal::Money,
}

impl Borrower {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        profession: impl Into<String>,
        monthly_salary: crate::decimal::Money,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            profession: profession.into(),
            monthly_salary,
        }
    }

    pub fn validate(&self) -> crate::errors::Result<()> {
        use crate::errors::LoanError;

        LoanError::require_min_len("name", &self.name, 2)?;
        LoanError::require_min_len("phone", &self.phone, 6)?;
        LoanError::require_min_len("profession", &self.profession, 2)?;
        if !self.monthly_salary.is_positive() {
            return Err(LoanError::InvalidField {
                field: "monthly_salary",
                message: format!("must be positive, got {}", self.monthly_salary),
            });
        }
        Ok(())
    }
}

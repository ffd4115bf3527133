//! Pure loan arithmetic: flat-rate lookup, repayable totals, installments,
//! maturity dates and lifecycle state. Nothing here performs I/O or reads a
//! clock; the "as of" date is always a parameter.

pub mod lifecycle;
pub mod maturity;
pub mod rates;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

pub use lifecycle::{derive_state, derive_state_now};
pub use maturity::compute_maturity_date;
pub use rates::{lookup_rate, RateTable};

/// loan request as entered at origination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub duration_months: u32,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(principal: Money, duration_months: u32, start_date: NaiveDate) -> Self {
        Self {
            principal,
            duration_months,
            start_date,
        }
    }
}

/// repayment schedule derived from [`LoanTerms`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSchedule {
    pub rate: Rate,
    pub total_repayable: Money,
    pub installment: Money,
    pub maturity_date: NaiveDate,
}

impl LoanSchedule {
    /// compute against the standard rate table
    pub fn compute(terms: &LoanTerms) -> Result<Self> {
        Self::compute_with(terms, &RateTable::standard())
    }

    pub fn compute_with(terms: &LoanTerms, table: &RateTable) -> Result<Self> {
        let (rate, total_repayable) =
            compute_total_repayable_with(table, terms.principal, terms.duration_months)?;
        let installment = compute_installment(total_repayable, terms.duration_months)?;
        let maturity_date = compute_maturity_date(terms.start_date, terms.duration_months)?;

        Ok(Self {
            rate,
            total_repayable,
            installment,
            maturity_date,
        })
    }

    /// money fields rounded for storage; rate and dates are untouched
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            rate: self.rate,
            total_repayable: self.total_repayable.round_dp(dp),
            installment: self.installment.round_dp(dp),
            maturity_date: self.maturity_date,
        }
    }
}

/// `(rate, principal * (1 + rate))` using the standard table
pub fn compute_total_repayable(principal: Money, months: u32) -> Result<(Rate, Money)> {
    ensure_positive_principal(principal)?;
    let rate = lookup_rate(months)?;
    Ok((rate, apply_rate(principal, rate)?))
}

pub fn compute_total_repayable_with(
    table: &RateTable,
    principal: Money,
    months: u32,
) -> Result<(Rate, Money)> {
    ensure_positive_principal(principal)?;
    let rate = table.lookup(months)?;
    Ok((rate, apply_rate(principal, rate)?))
}

/// `total / months`, rejecting a zero duration
pub fn compute_installment(total: Money, months: u32) -> Result<Money> {
    if months == 0 {
        return Err(LoanError::InvalidDuration { months });
    }
    total
        .checked_div(Decimal::from(months))
        .ok_or(LoanError::AmountOverflow { operation: "installment" })
}

fn apply_rate(principal: Money, rate: Rate) -> Result<Money> {
    principal
        .checked_mul(rate.growth_factor())
        .ok_or(LoanError::AmountOverflow { operation: "total repayable" })
}

fn ensure_positive_principal(principal: Money) -> Result<()> {
    if !principal.is_positive() {
        return Err(LoanError::NonPositivePrincipal { amount: principal });
    }
    Ok(())
}

/// loan simulation shown before a contract exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Money,
    pub duration_months: u32,
    pub rate: Rate,
    pub rate_percentage: Decimal,
    pub total_repayable: Money,
    pub installment: Money,
}

/// quote a loan with display values rounded to `dp` places
pub fn simulate(table: &RateTable, principal: Money, months: u32, dp: u32) -> Result<LoanQuote> {
    let (rate, total) = compute_total_repayable_with(table, principal, months)?;
    let installment = compute_installment(total, months)?;

    Ok(LoanQuote {
        principal,
        duration_months: months,
        rate,
        rate_percentage: rate.as_percentage().round_dp(2),
        total_repayable: total.round_dp(dp),
        installment: installment.round_dp(dp),
    })
}

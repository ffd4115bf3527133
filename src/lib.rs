pub mod access;
pub mod calculator;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod payments;
pub mod portfolio;
pub mod serialization;
pub mod types;

// re-export key types
pub use access::{Action, Operator, Role};
pub use calculator::{
    compute_installment, compute_maturity_date, compute_total_repayable, derive_state,
    derive_state_now, lookup_rate, simulate, LoanQuote, LoanSchedule, LoanTerms, RateTable,
};
pub use config::{DashboardConfig, LoanProductConfig};
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LoanError, Result};
pub use events::{Event, EventStore};
pub use ledger::LoanLedger;
pub use loan::{Loan, LoanBuilder, LoanUpdate};
pub use payments::{parse_amount, parse_payment_date, Payment, PaymentRequest};
pub use portfolio::{Attendant, AttendantUpdate, Dashboard, DebtorEntry, LoanBook, MonthlySummary};
pub use serialization::{LoanDetailView, LoanView, PaymentView, ReceiptView};
pub use types::{AttendantId, Borrower, CreditState, LoanId, PaymentId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

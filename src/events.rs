use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{CreditState, LoanId, PaymentId};

/// all events recorded against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        duration_months: u32,
        rate: Rate,
        total_repayable: Money,
        maturity_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    LoanAmended {
        loan_id: LoanId,
        fields: Vec<String>,
        schedule_recomputed: bool,
        timestamp: DateTime<Utc>,
    },
    StateChanged {
        loan_id: LoanId,
        old_state: CreditState,
        new_state: CreditState,
        as_of: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentPosted {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        paid_on: NaiveDate,
        outstanding_after: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentReversed {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        outstanding_after: Money,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn loan_id(&self) -> LoanId {
        match self {
            Event::LoanOriginated { loan_id, .. }
            | Event::LoanAmended { loan_id, .. }
            | Event::StateChanged { loan_id, .. }
            | Event::PaymentPosted { loan_id, .. }
            | Event::PaymentReversed { loan_id, .. } => *loan_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

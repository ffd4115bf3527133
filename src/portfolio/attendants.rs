use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::LoanBook;
use crate::access::{Action, Operator};
use crate::errors::{LoanError, Result};
use crate::types::AttendantId;

/// staff member that payments are attributed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendant {
    pub id: AttendantId,
    pub name: String,
    /// unique across attendants when present
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Attendant {
    fn validate(&self) -> Result<()> {
        LoanError::require_min_len("name", &self.name, 2)?;
        if let Some(email) = &self.email {
            LoanError::require_min_len("email", email, 5)?;
        }
        Ok(())
    }
}

/// partial update of an attendant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendantUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

impl LoanBook {
    pub fn create_attendant(
        &mut self,
        operator: &Operator,
        name: impl Into<String>,
        email: Option<String>,
        time_provider: &SafeTimeProvider,
    ) -> Result<&Attendant> {
        operator.authorize(Action::ManageAttendants)?;

        let attendant = Attendant {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            active: true,
            created_at: time_provider.now(),
        };
        attendant.validate()?;
        self.ensure_email_free(attendant.email.as_deref(), None)?;

        info!(attendant_id = %attendant.id, name = %attendant.name, "attendant created");
        self.attendants.push(attendant);

        let index = self.attendants.len() - 1;
        Ok(&self.attendants[index])
    }

    /// attendants ordered by name
    pub fn list_attendants(&self) -> Vec<&Attendant> {
        let mut attendants: Vec<&Attendant> = self.attendants.iter().collect();
        attendants.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        attendants
    }

    pub fn attendant(&self, id: AttendantId) -> Result<&Attendant> {
        self.attendants
            .iter()
            .find(|a| a.id == id)
            .ok_or(LoanError::AttendantNotFound { id })
    }

    pub fn update_attendant(
        &mut self,
        operator: &Operator,
        id: AttendantId,
        update: AttendantUpdate,
    ) -> Result<&Attendant> {
        operator.authorize(Action::ManageAttendants)?;

        let mut updated = self.attendant(id)?.clone();
        if let Some(name) = update.name {
            updated.name = name.trim().to_string();
        }
        if update.email.is_some() {
            updated.email = normalize_email(update.email);
        }
        if let Some(active) = update.active {
            updated.active = active;
        }
        updated.validate()?;
        self.ensure_email_free(updated.email.as_deref(), Some(id))?;

        let index = self
            .attendants
            .iter()
            .position(|a| a.id == id)
            .ok_or(LoanError::AttendantNotFound { id })?;
        self.attendants[index] = updated;

        info!(attendant_id = %id, "attendant updated");
        Ok(&self.attendants[index])
    }

    /// remove an attendant no payment refers to
    pub fn delete_attendant(&mut self, operator: &Operator, id: AttendantId) -> Result<Attendant> {
        operator.authorize(Action::ManageAttendants)?;

        let index = self
            .attendants
            .iter()
            .position(|a| a.id == id)
            .ok_or(LoanError::AttendantNotFound { id })?;

        let count = self
            .all_payments()
            .filter(|p| p.attendant_id == Some(id))
            .count();
        if count > 0 {
            return Err(LoanError::AttendantHasPayments { id, count });
        }

        info!(attendant_id = %id, "attendant deleted");
        Ok(self.attendants.remove(index))
    }

    pub(crate) fn attendant_name(&self, id: Option<AttendantId>) -> Option<String> {
        id.and_then(|id| self.attendant(id).ok())
            .map(|a| a.name.clone())
    }

    fn ensure_email_free(&self, email: Option<&str>, except: Option<AttendantId>) -> Result<()> {
        let Some(email) = email else {
            return Ok(());
        };
        let taken = self
            .attendants
            .iter()
            .any(|a| Some(a.id) != except && a.email.as_deref() == Some(email));
        if taken {
            return Err(LoanError::DuplicateEmail {
                email: email.to_string(),
            });
        }
        Ok(())
    }
}

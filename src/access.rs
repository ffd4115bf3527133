//! Operator roles and the permission matrix applied by the loan book.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{LoanError, Result};

/// fixed operator roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    ReadOnly,
}

/// operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    ViewLoans,
    ViewDashboard,
    SimulateLoan,
    DownloadReceipt,
    CreateLoan,
    AmendLoan,
    DeleteLoan,
    RecordPayment,
    DeletePayment,
    ManageAttendants,
    ManageOperators,
}

impl Role {
    /// role from its stored name; anything unrecognised is read-only
    pub fn from_name(name: &str) -> Role {
        match name.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "gestor" | "manager" => Role::Manager,
            _ => Role::ReadOnly,
        }
    }

    pub fn can(&self, action: Action) -> bool {
        match action {
            Action::ViewLoans
            | Action::ViewDashboard
            | Action::SimulateLoan
            | Action::DownloadReceipt => true,
            Action::CreateLoan
            | Action::AmendLoan
            | Action::RecordPayment
            | Action::ManageAttendants => matches!(self, Role::Admin | Role::Manager),
            Action::DeleteLoan | Action::DeletePayment | Action::ManageOperators => {
                matches!(self, Role::Admin)
            }
        }
    }
}

/// a logged-in staff user; credentials live outside this crate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub username: String,
    pub role: Role,
    pub active: bool,
}

impl Operator {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            active: true,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self::new(username, Role::Admin)
    }

    pub fn manager(username: impl Into<String>) -> Self {
        Self::new(username, Role::Manager)
    }

    pub fn read_only(username: impl Into<String>) -> Self {
        Self::new(username, Role::ReadOnly)
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn authorize(&self, action: Action) -> Result<()> {
        if !self.active {
            warn!(username = %self.username, ?action, "inactive operator rejected");
            return Err(LoanError::InactiveOperator {
                username: self.username.clone(),
            });
        }
        if !self.role.can(action) {
            warn!(username = %self.username, role = ?self.role, ?action, "operation denied");
            return Err(LoanError::PermissionDenied {
                role: self.role,
                action,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_name() {
        assert_eq!(Role::from_name("admin"), Role::Admin);
        assert_eq!(Role::from_name(" Gestor "), Role::Manager);
        assert_eq!(Role::from_name("manager"), Role::Manager);
        assert_eq!(Role::from_name("leitor"), Role::ReadOnly);
        assert_eq!(Role::from_name("superuser"), Role::ReadOnly);
        assert_eq!(Role::from_name(""), Role::ReadOnly);
    }

    #[test]
    fn test_permission_matrix() {
        assert!(Role::Admin.can(Action::DeletePayment));
        assert!(Role::Admin.can(Action::ManageOperators));

        assert!(Role::Manager.can(Action::CreateLoan));
        assert!(Role::Manager.can(Action::RecordPayment));
        assert!(!Role::Manager.can(Action::DeleteLoan));
        assert!(!Role::Manager.can(Action::DeletePayment));

        assert!(Role::ReadOnly.can(Action::DownloadReceipt));
        assert!(Role::ReadOnly.can(Action::ViewDashboard));
        assert!(!Role::ReadOnly.can(Action::RecordPayment));
        assert!(!Role::ReadOnly.can(Action::ManageAttendants));
    }

    #[test]
    fn test_inactive_operator_rejected() {
        let op = Operator::admin("root").deactivated();
        let err = op.authorize(Action::ViewLoans).unwrap_err();
        assert_eq!(err, LoanError::InactiveOperator { username: "root".to_string() });
    }

    #[test]
    fn test_denied_action_reports_role() {
        let op = Operator::read_only("viewer");
        let err = op.authorize(Action::CreateLoan).unwrap_err();
        assert_eq!(
            err,
            LoanError::PermissionDenied { role: Role::ReadOnly, action: Action::CreateLoan }
        );
    }
}

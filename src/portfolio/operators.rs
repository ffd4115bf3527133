//! Operator accounts kept by the loan book. Passwords and tokens are handled
//! outside this crate; the registry only tracks usernames, roles and whether
//! an account may act.

use tracing::info;

use super::LoanBook;
use crate::access::{Action, Operator, Role};
use crate::errors::{LoanError, Result};

impl LoanBook {
    /// Register an operator, active from the start.
    ///
    /// `role` is a stored role name such as `"admin"` or `"gestor"`; an
    /// unknown name registers a read-only operator.
    pub fn create_operator(&mut self, actor: &Operator, username: &str, role: &str) -> Result<&Operator> {
        actor.authorize(Action::ManageOperators)?;

        let username = username.trim();
        if username.is_empty() {
            return Err(LoanError::InvalidField {
                field: "username",
                message: "must not be empty".to_string(),
            });
        }
        if self.operators.iter().any(|o| o.username == username) {
            return Err(LoanError::DuplicateUsername {
                username: username.to_string(),
            });
        }

        let operator = Operator::new(username, Role::from_name(role));
        info!(username = %operator.username, role = ?operator.role, by = %actor.username, "operator created");
        self.operators.push(operator);

        let index = self.operators.len() - 1;
        Ok(&self.operators[index])
    }

    /// operators in creation order
    pub fn list_operators(&self, actor: &Operator) -> Result<Vec<&Operator>> {
        actor.authorize(Action::ManageOperators)?;
        Ok(self.operators.iter().collect())
    }

    pub fn operator(&self, username: &str) -> Result<&Operator> {
        let username = username.trim();
        self.operators
            .iter()
            .find(|o| o.username == username)
            .ok_or_else(|| LoanError::OperatorNotFound {
                username: username.to_string(),
            })
    }

    /// flip an operator between active and inactive
    pub fn toggle_operator(&mut self, actor: &Operator, username: &str) -> Result<&Operator> {
        actor.authorize(Action::ManageOperators)?;

        let username = username.trim();
        let operator = self
            .operators
            .iter_mut()
            .find(|o| o.username == username)
            .ok_or_else(|| LoanError::OperatorNotFound {
                username: username.to_string(),
            })?;
        operator.active = !operator.active;

        info!(username = %operator.username, active = operator.active, by = %actor.username, "operator toggled");
        Ok(operator)
    }
}

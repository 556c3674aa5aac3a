//! Expenses booked against a folder (handling, storage, transport, ...)

use crate::error::{CustomsError, Result};
use crate::validation::{self, TEXT_MAX};
use crate::{ExpenseId, FolderId};
use chrono::{DateTime, Utc};

/// Maximum width of an expense type label
pub const EXPENSE_TYPE_MAX: usize = 100;

/// A cost recorded on a folder
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,
    /// Folder the cost belongs to
    pub folder_id: FolderId,
    /// Kind of cost, e.g. "Magasinage"
    pub kind: String,
    /// Amount, when known
    pub amount: Option<f64>,
    /// What was paid for
    pub description: String,
    /// When the expense was recorded
    pub created_at: DateTime<Utc>,
}

/// Request to record an expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Kind of cost
    pub kind: String,
    /// Amount, when known
    pub amount: Option<f64>,
    /// What was paid for
    pub description: String,
}

impl NewExpense {
    /// Check and normalize the request
    pub fn validate(&self) -> Result<Self> {
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CustomsError::Validation(format!(
                    "amount must be a non-negative number (got {})",
                    amount
                )));
            }
        }
        Ok(Self {
            kind: validation::required("type", &self.kind, EXPENSE_TYPE_MAX)?,
            amount: self.amount,
            description: validation::required("description", &self.description, TEXT_MAX)?,
        })
    }

    /// Build the expense record for an already validated request
    pub fn into_expense(self, folder_id: FolderId, created_at: DateTime<Utc>) -> Expense {
        Expense {
            id: ExpenseId::new(),
            folder_id,
            kind: self.kind,
            amount: self.amount,
            description: self.description,
            created_at,
        }
    }
}

/// Sum of the known amounts
pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().filter_map(|e| e.amount).sum()
}

//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.
//!
//! Update commands are patches: `None` keeps the stored value. Nullable
//! columns use `Option<Option<_>>`, where `Some(None)` clears the value.

use chrono::NaiveDate;

use crate::{MoneyCents, TaskStatus, TransactionType};

/// Record a new income or expense.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub transaction_type: TransactionType,
    pub amount: MoneyCents,
    /// Defaults to today (UTC) when missing.
    pub created_at: Option<NaiveDate>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        transaction_type: TransactionType,
        amount: MoneyCents,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_type,
            amount,
            created_at: None,
            description: None,
            category_id: None,
        }
    }

    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDate) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Rewrite an existing transaction.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: i32,
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<MoneyCents>,
    pub created_at: Option<NaiveDate>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i32>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: i32) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            transaction_type: None,
            amount: None,
            created_at: None,
            description: None,
            category_id: None,
        }
    }

    #[must_use]
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDate) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<i32>) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Create a project.
#[derive(Clone, Debug)]
pub struct NewProjectCmd {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

impl NewProjectCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            description: None,
            end_date: None,
            is_active: None,
        }
    }
}

/// Patch a project.
#[derive(Clone, Debug, Default)]
pub struct UpdateProjectCmd {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

/// Create a task inside a project.
#[derive(Clone, Debug)]
pub struct NewTaskCmd {
    pub user_id: String,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<u32>,
    pub due_date: Option<NaiveDate>,
    /// Username the task is assigned to.
    pub owner: Option<String>,
}

impl NewTaskCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, project_id: i32, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            project_id,
            name: name.into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            owner: None,
        }
    }
}

/// Patch a task.
#[derive(Clone, Debug, Default)]
pub struct UpdateTaskCmd {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<u32>,
    pub due_date: Option<Option<NaiveDate>>,
    pub owner: Option<Option<String>>,
}

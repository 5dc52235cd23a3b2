//! Append-only expense ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, UserIdentity};
use coopra_domain::{Activity, ActivityKind, Expense, ExpenseCategory, MemberId};

use crate::ledger_ports::{ActivityRepository, ExpenseRepository, MemberRepository};

/// Fields required to record an expense.
#[derive(Debug, Clone)]
pub struct RecordExpenseInput {
    /// Classification for reporting.
    pub category: ExpenseCategory,
    /// Spent amount, strictly positive.
    pub amount: f64,
    /// Date of the expense.
    pub date: DateTime<Utc>,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Member who recorded the expense.
    pub created_by: MemberId,
}

/// Application service for the expense ledger.
#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
    members: Arc<dyn MemberRepository>,
    activities: Arc<dyn ActivityRepository>,
}

impl ExpenseService {
    /// Creates an expense service from its repositories.
    #[must_use]
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        members: Arc<dyn MemberRepository>,
        activities: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            expenses,
            members,
            activities,
        }
    }

    /// Appends an expense entry and logs the activity.
    pub async fn record(
        &self,
        identity: &UserIdentity,
        input: RecordExpenseInput,
    ) -> AppResult<Expense> {
        let tenant_id = identity.tenant_id();

        if self.members.find(tenant_id, input.created_by).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "member '{}' not found",
                input.created_by
            )));
        }

        let expense = Expense::new(
            tenant_id,
            input.category,
            input.amount,
            input.date,
            input.description,
            input.created_by,
            Utc::now(),
        )?;

        self.expenses.insert(tenant_id, expense.clone()).await?;

        self.activities
            .append(
                tenant_id,
                Activity::new(
                    tenant_id,
                    ActivityKind::Expense,
                    expense.created_by,
                    Some(expense.amount),
                    format!(
                        "Expense of ${} for {}",
                        expense.amount,
                        expense.category.as_str()
                    ),
                    None,
                    Utc::now(),
                ),
            )
            .await?;

        Ok(expense)
    }

    /// Lists the cooperative's expenses, newest first.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<Expense>> {
        self.expenses.list(identity.tenant_id()).await
    }
}

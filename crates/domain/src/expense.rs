//! Append-only expense ledger entity.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::member::MemberId;

/// Unique identifier for an expense record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    /// Creates a new random expense identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an expense identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ExpenseId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Expense classification used by the category breakdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Office supplies and rent.
    Office,
    /// Day-to-day operations.
    Operations,
    /// Repairs and upkeep.
    Maintenance,
    /// Anything uncategorized.
    Other,
}

impl ExpenseCategory {
    /// Returns the storage string for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Operations => "operations",
            Self::Maintenance => "maintenance",
            Self::Other => "other",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "office" => Ok(Self::Office),
            "operations" => Ok(Self::Operations),
            "maintenance" => Ok(Self::Maintenance),
            "other" => Ok(Self::Other),
            _ => Err(AppError::Validation(format!(
                "unknown expense category '{value}'"
            ))),
        }
    }
}

/// A categorized debit entry. No workflow, no review step, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Expense identifier.
    pub id: ExpenseId,
    /// Owning cooperative.
    pub tenant_id: TenantId,
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
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Creates an expense entry.
    pub fn new(
        tenant_id: TenantId,
        category: ExpenseCategory,
        amount: f64,
        date: DateTime<Utc>,
        description: Option<String>,
        created_by: MemberId,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if amount <= 0.0 {
            return Err(AppError::Validation(
                "expense amount must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id: ExpenseId::new(),
            tenant_id,
            category,
            amount,
            date,
            description: description.filter(|value| !value.trim().is_empty()),
            created_by,
            created_at: now,
        })
    }
}

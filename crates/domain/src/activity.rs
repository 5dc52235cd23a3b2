//! Append-only audit trail of financial workflow transitions.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use coopra_core::{AppError, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::member::MemberId;

/// Unique identifier for an activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(Uuid);

impl ActivityId {
    /// Creates a new random activity identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an activity identifier from an existing UUID value.
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

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActivityId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Workflow event types recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Contribution submitted or decided.
    Contribution,
    /// Loan applied for or rejected.
    LoanApplication,
    /// Loan approved with terms.
    LoanApproval,
    /// Repayment recorded against a loan.
    LoanRepayment,
    /// Expense recorded.
    Expense,
}

impl ActivityKind {
    /// Returns the storage string for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::LoanApplication => "loan_application",
            Self::LoanApproval => "loan_approval",
            Self::LoanRepayment => "loan_repayment",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for ActivityKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "contribution" => Ok(Self::Contribution),
            "loan_application" => Ok(Self::LoanApplication),
            "loan_approval" => Ok(Self::LoanApproval),
            "loan_repayment" => Ok(Self::LoanRepayment),
            "expense" => Ok(Self::Expense),
            _ => Err(AppError::Validation(format!(
                "unknown activity kind '{value}'"
            ))),
        }
    }
}

/// One audit-trail entry. Activities are appended by the workflow services
/// and never mutated afterwards; reporting and dashboards are their only
/// consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity identifier.
    pub id: ActivityId,
    /// Owning cooperative.
    pub tenant_id: TenantId,
    /// Event type.
    pub kind: ActivityKind,
    /// Member the event concerns.
    pub member_id: MemberId,
    /// Monetary amount, where the event carries one.
    pub amount: Option<f64>,
    /// Human-readable description generated from the triggering event.
    pub description: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Status snapshot at the time of the event, where applicable.
    pub status: Option<String>,
}

impl Activity {
    /// Creates an activity entry dated now.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        kind: ActivityKind,
        member_id: MemberId,
        amount: Option<f64>,
        description: impl Into<String>,
        status: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            tenant_id,
            kind,
            member_id,
            amount,
            description: description.into(),
            date: now,
            status,
        }
    }
}

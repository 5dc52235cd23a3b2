//! Contribution workflow entity.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::member::MemberId;

/// Unique identifier for a contribution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributionId(Uuid);

impl ContributionId {
    /// Creates a new random contribution identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a contribution identifier from an existing UUID value.
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

impl Default for ContributionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ContributionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// How a contribution was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed to a treasurer.
    Cash,
    /// Mobile money transfer.
    MobileMoney,
    /// Bank transfer.
    BankTransfer,
}

impl PaymentMethod {
    /// Returns the storage string for this payment method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::MobileMoney => "mobile_money",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cash" => Ok(Self::Cash),
            "mobile_money" => Ok(Self::MobileMoney),
            "bank_transfer" => Ok(Self::BankTransfer),
            _ => Err(AppError::Validation(format!(
                "unknown payment method '{value}'"
            ))),
        }
    }
}

/// Review state of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    /// Awaiting review.
    Pending,
    /// Approved and credited to the member ledger.
    Approved,
    /// Rejected without ledger effect.
    Rejected,
}

impl ContributionStatus {
    /// Returns the storage string for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether a reviewer has already decided this contribution.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for ContributionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown contribution status '{value}'"
            ))),
        }
    }
}

/// Reviewer decision on a pending contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionDecision {
    /// Approve and credit the member ledger.
    Approved,
    /// Reject without ledger effect.
    Rejected,
}

impl ContributionDecision {
    /// Returns the status a decided contribution ends in.
    #[must_use]
    pub fn as_status(&self) -> ContributionStatus {
        match self {
            Self::Approved => ContributionStatus::Approved,
            Self::Rejected => ContributionStatus::Rejected,
        }
    }
}

impl FromStr for ContributionDecision {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "contribution decision must be 'approved' or 'rejected', got '{value}'"
            ))),
        }
    }
}

/// A member contribution moving through the pending/approved/rejected
/// workflow. Decisions are one-shot; only approval has a side effect
/// (the member ledger credit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    /// Contribution identifier.
    pub id: ContributionId,
    /// Owning cooperative.
    pub tenant_id: TenantId,
    /// Contributing member.
    pub member_id: MemberId,
    /// Contributed amount, strictly positive.
    pub amount: f64,
    /// Date the contribution was made.
    pub date: DateTime<Utc>,
    /// How the contribution was paid.
    pub payment_method: PaymentMethod,
    /// Workflow status.
    pub status: ContributionStatus,
    /// Subject of the reviewer, set when decided.
    pub reviewed_by: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    /// Creates a pending contribution.
    pub fn new(
        tenant_id: TenantId,
        member_id: MemberId,
        amount: f64,
        payment_method: PaymentMethod,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if amount <= 0.0 {
            return Err(AppError::Validation(
                "contribution amount must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id: ContributionId::new(),
            tenant_id,
            member_id,
            amount,
            date,
            payment_method,
            status: ContributionStatus::Pending,
            reviewed_by: None,
            created_at: now,
        })
    }
}

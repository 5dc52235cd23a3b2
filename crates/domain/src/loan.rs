//! Loan lifecycle entity and repayment accounting.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Days, Months, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::member::MemberId;

/// Simple interest rate applied when an application does not specify one.
pub const DEFAULT_INTEREST_RATE: f64 = 0.10;

/// Loan term: the due date is this many months after the start date.
pub const LOAN_TERM_MONTHS: u32 = 12;

/// Unique identifier for a loan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    /// Creates a new random loan identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a loan identifier from an existing UUID value.
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

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for LoanId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state of a loan.
///
/// `rejected` and `completed` are terminal. `defaulted` is only reachable
/// through an explicit manual override; no scheduled sweep exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Application awaiting review.
    Pending,
    /// Approved with terms; disbursed and accruing interest.
    Approved,
    /// Rejected application.
    Rejected,
    /// Disbursed loan (legacy alias of `approved` in stored data).
    Active,
    /// Fully repaid.
    Completed,
    /// Manually marked as defaulted.
    Defaulted,
}

impl LoanStatus {
    /// Returns the storage string for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Defaulted => "defaulted",
        }
    }

    /// Returns whether the status admits no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Returns whether a reviewer has already decided this loan.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for LoanStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "defaulted" => Ok(Self::Defaulted),
            _ => Err(AppError::Validation(format!(
                "unknown loan status '{value}'"
            ))),
        }
    }
}

/// Reviewer decision on a pending loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    /// Approve with terms and start the repayment clock.
    Approved,
    /// Reject the application.
    Rejected,
}

impl LoanDecision {
    /// Returns the status a decided loan ends in.
    #[must_use]
    pub fn as_status(&self) -> LoanStatus {
        match self {
            Self::Approved => LoanStatus::Approved,
            Self::Rejected => LoanStatus::Rejected,
        }
    }
}

impl FromStr for LoanDecision {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "loan decision must be 'approved' or 'rejected', got '{value}'"
            ))),
        }
    }
}

/// A loan moving through application, review, repayment and completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Loan identifier.
    pub id: LoanId,
    /// Owning cooperative.
    pub tenant_id: TenantId,
    /// Borrowing member.
    pub member_id: MemberId,
    /// Amount the member asked for, strictly positive.
    pub requested_amount: f64,
    /// Amount granted at approval, if different terms were set.
    pub approved_amount: Option<f64>,
    /// Stated purpose of the loan.
    pub reason: String,
    /// Lifecycle status.
    pub status: LoanStatus,
    /// Simple interest rate as a fraction.
    pub interest_rate: f64,
    /// Disbursement date, set at approval.
    pub start_date: Option<DateTime<Utc>>,
    /// Repayment deadline, start date plus the loan term.
    pub due_date: Option<DateTime<Utc>>,
    /// Cumulative repaid amount; monotonically non-decreasing.
    pub amount_repaid: f64,
    /// Subject of the reviewer, set when decided.
    pub decided_by: Option<String>,
    /// Application timestamp.
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Creates a pending application at the default interest rate.
    pub fn new_application(
        tenant_id: TenantId,
        member_id: MemberId,
        requested_amount: f64,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if requested_amount <= 0.0 {
            return Err(AppError::Validation(
                "requested amount must be positive".to_owned(),
            ));
        }

        let reason = reason.into().trim().to_owned();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "loan reason must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id: LoanId::new(),
            tenant_id,
            member_id,
            requested_amount,
            approved_amount: None,
            reason,
            status: LoanStatus::Pending,
            interest_rate: DEFAULT_INTEREST_RATE,
            start_date: None,
            due_date: None,
            amount_repaid: 0.0,
            decided_by: None,
            created_at: now,
        })
    }

    /// Returns the amount repayment is measured against: the approved amount
    /// when terms were set, otherwise the requested amount.
    #[must_use]
    pub fn principal(&self) -> f64 {
        self.approved_amount.unwrap_or(self.requested_amount)
    }

    /// Returns the outstanding balance, floored at zero.
    #[must_use]
    pub fn outstanding(&self) -> f64 {
        (self.principal() - self.amount_repaid).max(0.0)
    }

    /// Computes the due date for a loan disbursed at `start`.
    #[must_use]
    pub fn due_date_for(start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_months(Months::new(LOAN_TERM_MONTHS))
            .or_else(|| start.checked_add_days(Days::new(365)))
            .unwrap_or(start)
    }

    /// Adds a repayment and completes the loan once the cumulative total
    /// reaches the principal.
    ///
    /// This is the single in-memory form of the repayment transition; the
    /// PostgreSQL adapter performs the same arithmetic as one conditional
    /// UPDATE so concurrent postings cannot lose increments.
    pub fn apply_repayment(&mut self, amount: f64) -> AppResult<()> {
        if amount <= 0.0 {
            return Err(AppError::Validation(
                "repayment amount must be positive".to_owned(),
            ));
        }

        self.amount_repaid += amount;
        if self.amount_repaid >= self.principal() {
            self.status = LoanStatus::Completed;
        }

        Ok(())
    }
}

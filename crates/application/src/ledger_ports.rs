//! Ports for the tenant-scoped ledgers and the activity log.
//!
//! Every method takes the caller's [`TenantId`] as its first parameter; no
//! implementation may read or write a row whose tenant column differs from
//! it. Omitting the scope is a compile-time error by construction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coopra_core::{AppResult, TenantId};
use coopra_domain::{
    Activity, Contribution, ContributionId, ContributionStatus, Expense, ExpenseCategory, Loan,
    LoanId, LoanStatus, Member, MemberId,
};

/// One month's total for a monetary series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-based.
    pub month: u32,
    /// Summed amount for the month.
    pub total: f64,
}

/// Per-category expense total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    /// Expense category.
    pub category: ExpenseCategory,
    /// Summed amount for the category.
    pub total: f64,
}

/// Per-member loan counters used by the member activity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberLoanStats {
    /// Member the counters belong to.
    pub member_id: MemberId,
    /// Loans currently in the `active` status.
    pub active_loans: i64,
    /// Loans that reached `completed`.
    pub repaid_loans: i64,
    /// All loans ever taken.
    pub total_loans: i64,
}

/// Per-member activity counters used by the member activity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberActivityStats {
    /// Member the counters belong to.
    pub member_id: MemberId,
    /// Date of the newest activity entry.
    pub last_activity: DateTime<Utc>,
    /// Number of activity entries.
    pub activity_count: i64,
}

/// Port for member records and the denormalized contribution ledger.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Persists a new member. Duplicate emails surface as `Conflict`.
    async fn insert(&self, tenant_id: TenantId, member: Member) -> AppResult<()>;

    /// Finds a member within the cooperative.
    async fn find(&self, tenant_id: TenantId, member_id: MemberId) -> AppResult<Option<Member>>;

    /// Lists the cooperative's members.
    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Member>>;

    /// Replaces a member's profile fields.
    async fn update(&self, tenant_id: TenantId, member: Member) -> AppResult<()>;

    /// Atomically increments a member's running contribution total.
    ///
    /// Must be a single store-level increment, never load-add-save.
    async fn credit_contribution(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        amount: f64,
    ) -> AppResult<()>;

    /// Counts members whose role equals the given role name.
    async fn count_with_role(&self, tenant_id: TenantId, role_name: &str) -> AppResult<i64>;
}

/// Port for contribution workflow records.
#[async_trait]
pub trait ContributionRepository: Send + Sync {
    /// Persists a new pending contribution.
    async fn insert(&self, tenant_id: TenantId, contribution: Contribution) -> AppResult<()>;

    /// Finds a contribution within the cooperative.
    async fn find(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
    ) -> AppResult<Option<Contribution>>;

    /// Lists contributions, optionally filtered by status, newest first.
    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<ContributionStatus>,
    ) -> AppResult<Vec<Contribution>>;

    /// Records a review decision and returns the updated contribution.
    async fn record_decision(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
        status: ContributionStatus,
        reviewer: &str,
    ) -> AppResult<Contribution>;

    /// Sums approved contributions per calendar month from `since` onward.
    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>>;
}

/// Port for loan lifecycle records.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Persists a new pending application.
    async fn insert(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()>;

    /// Finds a loan within the cooperative.
    async fn find(&self, tenant_id: TenantId, loan_id: LoanId) -> AppResult<Option<Loan>>;

    /// Lists loans, optionally filtered by status, newest first.
    async fn list(&self, tenant_id: TenantId, status: Option<LoanStatus>)
    -> AppResult<Vec<Loan>>;

    /// Replaces a loan's decision fields (status, terms, dates, reviewer).
    async fn record_decision(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()>;

    /// Atomically adds a repayment and flips the status to `completed` once
    /// the cumulative total reaches the principal.
    ///
    /// Must be a single conditional store-level update so that concurrent
    /// postings cannot lose increments. Returns the updated loan.
    async fn add_repayment(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        amount: f64,
    ) -> AppResult<Loan>;

    /// Overwrites a loan's status and returns the updated loan.
    async fn set_status(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        status: LoanStatus,
    ) -> AppResult<Loan>;

    /// Sums approved amounts per calendar month of application from `since`
    /// onward, counting only approved loans.
    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>>;

    /// Returns per-member loan counters.
    async fn stats_by_member(&self, tenant_id: TenantId) -> AppResult<Vec<MemberLoanStats>>;
}

/// Port for the append-only expense ledger.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Persists a new expense entry.
    async fn insert(&self, tenant_id: TenantId, expense: Expense) -> AppResult<()>;

    /// Lists expenses, newest date first.
    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Expense>>;

    /// Sums expenses per calendar month from `since` onward.
    async fn monthly_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>>;

    /// Sums expenses per category over all time.
    async fn category_totals(&self, tenant_id: TenantId) -> AppResult<Vec<CategoryTotal>>;
}

/// Port for the append-only activity log.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Appends an activity entry. Entries are never mutated afterwards.
    async fn append(&self, tenant_id: TenantId, activity: Activity) -> AppResult<()>;

    /// Returns the newest activity entries, most recent first.
    async fn recent(&self, tenant_id: TenantId, limit: usize) -> AppResult<Vec<Activity>>;

    /// Returns per-member activity counters.
    async fn stats_by_member(&self, tenant_id: TenantId)
    -> AppResult<Vec<MemberActivityStats>>;
}

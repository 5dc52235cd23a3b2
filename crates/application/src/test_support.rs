//! In-memory fakes for the ledger ports, shared by the service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{
    Activity, Contribution, ContributionId, ContributionStatus, Expense, Loan, LoanId, LoanStatus,
    Member, MemberId, Role, RoleId,
};
use tokio::sync::Mutex;

use crate::ledger_ports::{
    ActivityRepository, CategoryTotal, ContributionRepository, ExpenseRepository, LoanRepository,
    MemberActivityStats, MemberLoanStats, MemberRepository, MonthlyTotal,
};
use crate::role_ports::RoleRepository;

fn monthly_buckets(entries: impl Iterator<Item = (DateTime<Utc>, f64)>) -> Vec<MonthlyTotal> {
    let mut buckets: HashMap<(i32, u32), f64> = HashMap::new();
    for (date, amount) in entries {
        *buckets.entry((date.year(), date.month())).or_insert(0.0) += amount;
    }

    let mut totals: Vec<MonthlyTotal> = buckets
        .into_iter()
        .map(|((year, month), total)| MonthlyTotal { year, month, total })
        .collect();
    totals.sort_by_key(|bucket| (bucket.year, bucket.month));
    totals
}

#[derive(Default)]
pub(crate) struct FakeMembers {
    pub(crate) rows: Mutex<HashMap<MemberId, Member>>,
}

impl FakeMembers {
    pub(crate) async fn seed(&self, member: Member) {
        self.rows.lock().await.insert(member.id, member);
    }
}

#[async_trait]
impl MemberRepository for FakeMembers {
    async fn insert(&self, tenant_id: TenantId, member: Member) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        if rows
            .values()
            .any(|existing| existing.tenant_id == tenant_id && existing.email == member.email)
        {
            return Err(AppError::Conflict(format!(
                "a member with email '{}' already exists",
                member.email
            )));
        }

        rows.insert(member.id, member);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, member_id: MemberId) -> AppResult<Option<Member>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&member_id)
            .filter(|member| member.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Member>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .filter(|member| member.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn update(&self, tenant_id: TenantId, member: Member) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get(&member.id) {
            Some(existing) if existing.tenant_id == tenant_id => {
                rows.insert(member.id, member);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "member '{}' not found",
                member.id
            ))),
        }
    }

    async fn credit_contribution(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        amount: f64,
    ) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&member_id) {
            Some(member) if member.tenant_id == tenant_id => {
                member.total_contributions += amount;
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "member '{member_id}' not found"
            ))),
        }
    }

    async fn count_with_role(&self, tenant_id: TenantId, role_name: &str) -> AppResult<i64> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .filter(|member| member.tenant_id == tenant_id && member.role.as_str() == role_name)
            .count() as i64)
    }
}

#[derive(Default)]
pub(crate) struct FakeContributions {
    pub(crate) rows: Mutex<HashMap<ContributionId, Contribution>>,
}

impl FakeContributions {
    pub(crate) async fn seed(&self, contribution: Contribution) {
        self.rows.lock().await.insert(contribution.id, contribution);
    }
}

#[async_trait]
impl ContributionRepository for FakeContributions {
    async fn insert(&self, _tenant_id: TenantId, contribution: Contribution) -> AppResult<()> {
        self.rows
            .lock()
            .await
            .insert(contribution.id, contribution);
        Ok(())
    }

    async fn find(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
    ) -> AppResult<Option<Contribution>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&contribution_id)
            .filter(|contribution| contribution.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<ContributionStatus>,
    ) -> AppResult<Vec<Contribution>> {
        let mut rows: Vec<Contribution> = self
            .rows
            .lock()
            .await
            .values()
            .filter(|contribution| contribution.tenant_id == tenant_id)
            .filter(|contribution| status.is_none_or(|wanted| contribution.status == wanted))
            .cloned()
            .collect();
        rows.sort_by_key(|contribution| std::cmp::Reverse(contribution.created_at));
        Ok(rows)
    }

    async fn record_decision(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
        status: ContributionStatus,
        reviewer: &str,
    ) -> AppResult<Contribution> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&contribution_id) {
            Some(contribution) if contribution.tenant_id == tenant_id => {
                contribution.status = status;
                contribution.reviewed_by = Some(reviewer.to_owned());
                Ok(contribution.clone())
            }
            _ => Err(AppError::NotFound(format!(
                "contribution '{contribution_id}' not found"
            ))),
        }
    }

    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = self.rows.lock().await;
        Ok(monthly_buckets(
            rows.values()
                .filter(|contribution| {
                    contribution.tenant_id == tenant_id
                        && contribution.status == ContributionStatus::Approved
                        && contribution.date >= since
                })
                .map(|contribution| (contribution.date, contribution.amount)),
        ))
    }
}

#[derive(Default)]
pub(crate) struct FakeLoans {
    pub(crate) rows: Mutex<HashMap<LoanId, Loan>>,
}

impl FakeLoans {
    pub(crate) async fn seed(&self, loan: Loan) {
        self.rows.lock().await.insert(loan.id, loan);
    }
}

#[async_trait]
impl LoanRepository for FakeLoans {
    async fn insert(&self, _tenant_id: TenantId, loan: Loan) -> AppResult<()> {
        self.rows.lock().await.insert(loan.id, loan);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, loan_id: LoanId) -> AppResult<Option<Loan>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&loan_id)
            .filter(|loan| loan.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<Loan>> {
        let mut rows: Vec<Loan> = self
            .rows
            .lock()
            .await
            .values()
            .filter(|loan| loan.tenant_id == tenant_id)
            .filter(|loan| status.is_none_or(|wanted| loan.status == wanted))
            .cloned()
            .collect();
        rows.sort_by_key(|loan| std::cmp::Reverse(loan.created_at));
        Ok(rows)
    }

    async fn record_decision(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get(&loan.id) {
            Some(existing) if existing.tenant_id == tenant_id => {
                rows.insert(loan.id, loan);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("loan '{}' not found", loan.id))),
        }
    }

    async fn add_repayment(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        amount: f64,
    ) -> AppResult<Loan> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&loan_id) {
            Some(loan) if loan.tenant_id == tenant_id => {
                loan.apply_repayment(amount)?;
                Ok(loan.clone())
            }
            _ => Err(AppError::NotFound(format!("loan '{loan_id}' not found"))),
        }
    }

    async fn set_status(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        status: LoanStatus,
    ) -> AppResult<Loan> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&loan_id) {
            Some(loan) if loan.tenant_id == tenant_id => {
                loan.status = status;
                Ok(loan.clone())
            }
            _ => Err(AppError::NotFound(format!("loan '{loan_id}' not found"))),
        }
    }

    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = self.rows.lock().await;
        Ok(monthly_buckets(
            rows.values()
                .filter(|loan| {
                    loan.tenant_id == tenant_id
                        && loan.status != LoanStatus::Pending
                        && loan.status != LoanStatus::Rejected
                        && loan.created_at >= since
                })
                .map(|loan| (loan.created_at, loan.principal())),
        ))
    }

    async fn stats_by_member(&self, tenant_id: TenantId) -> AppResult<Vec<MemberLoanStats>> {
        let rows = self.rows.lock().await;
        let mut stats: HashMap<MemberId, MemberLoanStats> = HashMap::new();
        for loan in rows.values().filter(|loan| loan.tenant_id == tenant_id) {
            let entry = stats.entry(loan.member_id).or_insert(MemberLoanStats {
                member_id: loan.member_id,
                active_loans: 0,
                repaid_loans: 0,
                total_loans: 0,
            });
            entry.total_loans += 1;
            match loan.status {
                LoanStatus::Approved | LoanStatus::Active => entry.active_loans += 1,
                LoanStatus::Completed => entry.repaid_loans += 1,
                _ => {}
            }
        }
        Ok(stats.into_values().collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeExpenses {
    pub(crate) rows: Mutex<Vec<Expense>>,
}

impl FakeExpenses {
    pub(crate) async fn seed(&self, expense: Expense) {
        self.rows.lock().await.push(expense);
    }
}

#[async_trait]
impl ExpenseRepository for FakeExpenses {
    async fn insert(&self, _tenant_id: TenantId, expense: Expense) -> AppResult<()> {
        self.rows.lock().await.push(expense);
        Ok(())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Expense>> {
        let mut rows: Vec<Expense> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|expense| expense.tenant_id == tenant_id)
            .cloned()
            .collect();
        rows.sort_by_key(|expense| std::cmp::Reverse(expense.date));
        Ok(rows)
    }

    async fn monthly_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = self.rows.lock().await;
        Ok(monthly_buckets(
            rows.iter()
                .filter(|expense| expense.tenant_id == tenant_id && expense.date >= since)
                .map(|expense| (expense.date, expense.amount)),
        ))
    }

    async fn category_totals(&self, tenant_id: TenantId) -> AppResult<Vec<CategoryTotal>> {
        let rows = self.rows.lock().await;
        let mut totals: HashMap<&'static str, CategoryTotal> = HashMap::new();
        for expense in rows.iter().filter(|expense| expense.tenant_id == tenant_id) {
            totals
                .entry(expense.category.as_str())
                .and_modify(|total| total.total += expense.amount)
                .or_insert(CategoryTotal {
                    category: expense.category,
                    total: expense.amount,
                });
        }
        Ok(totals.into_values().collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeActivities {
    pub(crate) rows: Mutex<Vec<Activity>>,
}

impl FakeActivities {
    pub(crate) async fn seed(&self, activity: Activity) {
        self.rows.lock().await.push(activity);
    }

    pub(crate) async fn entries(&self) -> Vec<Activity> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl ActivityRepository for FakeActivities {
    async fn append(&self, _tenant_id: TenantId, activity: Activity) -> AppResult<()> {
        self.rows.lock().await.push(activity);
        Ok(())
    }

    async fn recent(&self, tenant_id: TenantId, limit: usize) -> AppResult<Vec<Activity>> {
        let mut rows: Vec<Activity> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|activity| activity.tenant_id == tenant_id)
            .cloned()
            .collect();
        rows.sort_by_key(|activity| std::cmp::Reverse(activity.date));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn stats_by_member(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<MemberActivityStats>> {
        let rows = self.rows.lock().await;
        let mut stats: HashMap<MemberId, MemberActivityStats> = HashMap::new();
        for activity in rows.iter().filter(|activity| activity.tenant_id == tenant_id) {
            let member_id = activity.member_id;
            stats
                .entry(member_id)
                .and_modify(|entry| {
                    entry.activity_count += 1;
                    if activity.date > entry.last_activity {
                        entry.last_activity = activity.date;
                    }
                })
                .or_insert(MemberActivityStats {
                    member_id,
                    last_activity: activity.date,
                    activity_count: 1,
                });
        }
        Ok(stats.into_values().collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeRoles {
    pub(crate) rows: Mutex<HashMap<RoleId, Role>>,
}

impl FakeRoles {
    pub(crate) async fn seed(&self, role: Role) {
        self.rows.lock().await.insert(role.id, role);
    }
}

#[async_trait]
impl RoleRepository for FakeRoles {
    async fn insert(&self, tenant_id: TenantId, role: Role) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        if rows
            .values()
            .any(|existing| existing.tenant_id == tenant_id && existing.name == role.name)
        {
            return Err(AppError::Conflict(format!(
                "a role named '{}' already exists",
                role.name
            )));
        }

        rows.insert(role.id, role);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&role_id)
            .filter(|role| role.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let mut rows: Vec<Role> = self
            .rows
            .lock()
            .await
            .values()
            .filter(|role| role.tenant_id == tenant_id)
            .cloned()
            .collect();
        rows.sort_by_key(|role| std::cmp::Reverse(role.created_at));
        Ok(rows)
    }

    async fn update(&self, tenant_id: TenantId, role: Role) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get(&role.id) {
            Some(existing) if existing.tenant_id == tenant_id => {
                rows.insert(role.id, role);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("role '{}' not found", role.id))),
        }
    }

    async fn delete(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get(&role_id) {
            Some(existing) if existing.tenant_id == tenant_id => {
                rows.remove(&role_id);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!("role '{role_id}' not found"))),
        }
    }
}

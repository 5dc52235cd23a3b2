//! In-memory implementation of every storage port.
//!
//! Backs the HTTP handler tests and local development without PostgreSQL.
//! Uniqueness checks and the atomic ledger updates run under a single
//! write lock per table, matching the single-statement guarantees of the
//! PostgreSQL adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use tokio::sync::RwLock;

use coopra_application::{
    ActivityRepository, CategoryTotal, ContributionRepository, CooperativeRepository,
    ExpenseRepository, LoanRepository, MemberActivityStats, MemberLoanStats, MemberRepository,
    MonthlyTotal, RoleRepository, SubjectDirectory,
};
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{
    Activity, Contribution, ContributionId, ContributionStatus, Cooperative, Expense, JoinCode,
    Loan, LoanId, LoanStatus, Member, MemberId, Role, RoleId,
};

/// In-memory store implementing all storage ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    cooperatives: RwLock<HashMap<TenantId, Cooperative>>,
    subjects: RwLock<HashMap<String, TenantId>>,
    members: RwLock<HashMap<(TenantId, MemberId), Member>>,
    contributions: RwLock<HashMap<(TenantId, ContributionId), Contribution>>,
    loans: RwLock<HashMap<(TenantId, LoanId), Loan>>,
    expenses: RwLock<Vec<Expense>>,
    activities: RwLock<Vec<Activity>>,
    roles: RwLock<HashMap<(TenantId, RoleId), Role>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

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

#[async_trait]
impl CooperativeRepository for InMemoryStore {
    async fn insert(&self, cooperative: Cooperative) -> AppResult<()> {
        let mut cooperatives = self.cooperatives.write().await;

        if cooperatives
            .values()
            .any(|existing| existing.manager_subject == cooperative.manager_subject)
        {
            return Err(AppError::AlreadyManages);
        }

        if cooperatives.values().any(|existing| {
            existing.name == cooperative.name || existing.join_code == cooperative.join_code
        }) {
            return Err(AppError::Conflict(format!(
                "a cooperative named '{}' already exists",
                cooperative.name
            )));
        }

        cooperatives.insert(cooperative.id, cooperative);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<Cooperative>> {
        Ok(self.cooperatives.read().await.get(&tenant_id).cloned())
    }

    async fn find_by_join_code(&self, join_code: &JoinCode) -> AppResult<Option<Cooperative>> {
        Ok(self
            .cooperatives
            .read()
            .await
            .values()
            .find(|cooperative| &cooperative.join_code == join_code)
            .cloned())
    }

    async fn find_by_manager(&self, subject: &str) -> AppResult<Option<Cooperative>> {
        Ok(self
            .cooperatives
            .read()
            .await
            .values()
            .find(|cooperative| cooperative.manager_subject == subject)
            .cloned())
    }

    async fn join_code_exists(&self, join_code: &JoinCode) -> AppResult<bool> {
        Ok(self
            .cooperatives
            .read()
            .await
            .values()
            .any(|cooperative| &cooperative.join_code == join_code))
    }
}

#[async_trait]
impl SubjectDirectory for InMemoryStore {
    async fn tenant_for_subject(&self, subject: &str) -> AppResult<Option<TenantId>> {
        Ok(self.subjects.read().await.get(subject).copied())
    }

    async fn attach_subject(&self, tenant_id: TenantId, subject: &str) -> AppResult<()> {
        let mut subjects = self.subjects.write().await;
        if subjects.contains_key(subject) {
            return Err(AppError::AlreadyMember);
        }

        subjects.insert(subject.to_owned(), tenant_id);
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn insert(&self, tenant_id: TenantId, member: Member) -> AppResult<()> {
        let mut members = self.members.write().await;

        if members.iter().any(|((stored_tenant, _), stored)| {
            stored_tenant == &tenant_id && stored.email == member.email
        }) {
            return Err(AppError::Conflict(format!(
                "a member with email '{}' already exists",
                member.email
            )));
        }

        members.insert((tenant_id, member.id), member);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, member_id: MemberId) -> AppResult<Option<Member>> {
        Ok(self
            .members
            .read()
            .await
            .get(&(tenant_id, member_id))
            .cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Member>> {
        let members = self.members.read().await;
        let mut values: Vec<Member> = members
            .iter()
            .filter_map(|((stored_tenant, _), member)| {
                (stored_tenant == &tenant_id).then(|| member.clone())
            })
            .collect();
        values.sort_by_key(|member| std::cmp::Reverse(member.join_date));
        Ok(values)
    }

    async fn update(&self, tenant_id: TenantId, member: Member) -> AppResult<()> {
        let mut members = self.members.write().await;
        let key = (tenant_id, member.id);
        if !members.contains_key(&key) {
            return Err(AppError::NotFound(format!(
                "member '{}' not found",
                member.id
            )));
        }

        members.insert(key, member);
        Ok(())
    }

    async fn credit_contribution(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        amount: f64,
    ) -> AppResult<()> {
        let mut members = self.members.write().await;
        let member = members.get_mut(&(tenant_id, member_id)).ok_or_else(|| {
            AppError::NotFound(format!("member '{member_id}' not found"))
        })?;

        member.total_contributions += amount;
        Ok(())
    }

    async fn count_with_role(&self, tenant_id: TenantId, role_name: &str) -> AppResult<i64> {
        Ok(self
            .members
            .read()
            .await
            .iter()
            .filter(|((stored_tenant, _), member)| {
                stored_tenant == &tenant_id && member.role.as_str() == role_name
            })
            .count() as i64)
    }
}

#[async_trait]
impl ContributionRepository for InMemoryStore {
    async fn insert(&self, tenant_id: TenantId, contribution: Contribution) -> AppResult<()> {
        self.contributions
            .write()
            .await
            .insert((tenant_id, contribution.id), contribution);
        Ok(())
    }

    async fn find(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
    ) -> AppResult<Option<Contribution>> {
        Ok(self
            .contributions
            .read()
            .await
            .get(&(tenant_id, contribution_id))
            .cloned())
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<ContributionStatus>,
    ) -> AppResult<Vec<Contribution>> {
        let contributions = self.contributions.read().await;
        let mut values: Vec<Contribution> = contributions
            .iter()
            .filter_map(|((stored_tenant, _), contribution)| {
                (stored_tenant == &tenant_id
                    && status.is_none_or(|wanted| contribution.status == wanted))
                .then(|| contribution.clone())
            })
            .collect();
        values.sort_by_key(|contribution| std::cmp::Reverse(contribution.created_at));
        Ok(values)
    }

    async fn record_decision(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
        status: ContributionStatus,
        reviewer: &str,
    ) -> AppResult<Contribution> {
        let mut contributions = self.contributions.write().await;
        let contribution = contributions
            .get_mut(&(tenant_id, contribution_id))
            .ok_or_else(|| {
                AppError::NotFound(format!("contribution '{contribution_id}' not found"))
            })?;

        contribution.status = status;
        contribution.reviewed_by = Some(reviewer.to_owned());
        Ok(contribution.clone())
    }

    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let contributions = self.contributions.read().await;
        Ok(monthly_buckets(
            contributions
                .iter()
                .filter(|((stored_tenant, _), contribution)| {
                    stored_tenant == &tenant_id
                        && contribution.status == ContributionStatus::Approved
                        && contribution.date >= since
                })
                .map(|(_, contribution)| (contribution.date, contribution.amount)),
        ))
    }
}

#[async_trait]
impl LoanRepository for InMemoryStore {
    async fn insert(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()> {
        self.loans.write().await.insert((tenant_id, loan.id), loan);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, loan_id: LoanId) -> AppResult<Option<Loan>> {
        Ok(self.loans.read().await.get(&(tenant_id, loan_id)).cloned())
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<Loan>> {
        let loans = self.loans.read().await;
        let mut values: Vec<Loan> = loans
            .iter()
            .filter_map(|((stored_tenant, _), loan)| {
                (stored_tenant == &tenant_id && status.is_none_or(|wanted| loan.status == wanted))
                    .then(|| loan.clone())
            })
            .collect();
        values.sort_by_key(|loan| std::cmp::Reverse(loan.created_at));
        Ok(values)
    }

    async fn record_decision(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()> {
        let mut loans = self.loans.write().await;
        let key = (tenant_id, loan.id);
        if !loans.contains_key(&key) {
            return Err(AppError::NotFound(format!("loan '{}' not found", loan.id)));
        }

        loans.insert(key, loan);
        Ok(())
    }

    async fn add_repayment(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        amount: f64,
    ) -> AppResult<Loan> {
        let mut loans = self.loans.write().await;
        let loan = loans
            .get_mut(&(tenant_id, loan_id))
            .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;

        loan.apply_repayment(amount)?;
        Ok(loan.clone())
    }

    async fn set_status(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        status: LoanStatus,
    ) -> AppResult<Loan> {
        let mut loans = self.loans.write().await;
        let loan = loans
            .get_mut(&(tenant_id, loan_id))
            .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;

        loan.status = status;
        Ok(loan.clone())
    }

    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let loans = self.loans.read().await;
        Ok(monthly_buckets(
            loans
                .iter()
                .filter(|((stored_tenant, _), loan)| {
                    stored_tenant == &tenant_id
                        && loan.status != LoanStatus::Pending
                        && loan.status != LoanStatus::Rejected
                        && loan.created_at >= since
                })
                .map(|(_, loan)| (loan.created_at, loan.principal())),
        ))
    }

    async fn stats_by_member(&self, tenant_id: TenantId) -> AppResult<Vec<MemberLoanStats>> {
        let loans = self.loans.read().await;
        let mut stats: HashMap<MemberId, MemberLoanStats> = HashMap::new();
        for ((stored_tenant, _), loan) in loans.iter() {
            if stored_tenant != &tenant_id {
                continue;
            }

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

#[async_trait]
impl ExpenseRepository for InMemoryStore {
    async fn insert(&self, _tenant_id: TenantId, expense: Expense) -> AppResult<()> {
        self.expenses.write().await.push(expense);
        Ok(())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        let mut values: Vec<Expense> = expenses
            .iter()
            .filter(|expense| expense.tenant_id == tenant_id)
            .cloned()
            .collect();
        values.sort_by_key(|expense| std::cmp::Reverse(expense.date));
        Ok(values)
    }

    async fn monthly_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let expenses = self.expenses.read().await;
        Ok(monthly_buckets(
            expenses
                .iter()
                .filter(|expense| expense.tenant_id == tenant_id && expense.date >= since)
                .map(|expense| (expense.date, expense.amount)),
        ))
    }

    async fn category_totals(&self, tenant_id: TenantId) -> AppResult<Vec<CategoryTotal>> {
        let expenses = self.expenses.read().await;
        let mut totals: HashMap<&'static str, CategoryTotal> = HashMap::new();
        for expense in expenses.iter().filter(|expense| expense.tenant_id == tenant_id) {
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

#[async_trait]
impl ActivityRepository for InMemoryStore {
    async fn append(&self, _tenant_id: TenantId, activity: Activity) -> AppResult<()> {
        self.activities.write().await.push(activity);
        Ok(())
    }

    async fn recent(&self, tenant_id: TenantId, limit: usize) -> AppResult<Vec<Activity>> {
        let activities = self.activities.read().await;
        let mut values: Vec<Activity> = activities
            .iter()
            .filter(|activity| activity.tenant_id == tenant_id)
            .cloned()
            .collect();
        values.sort_by_key(|activity| std::cmp::Reverse(activity.date));
        values.truncate(limit);
        Ok(values)
    }

    async fn stats_by_member(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<MemberActivityStats>> {
        let activities = self.activities.read().await;
        let mut stats: HashMap<MemberId, MemberActivityStats> = HashMap::new();
        for activity in activities
            .iter()
            .filter(|activity| activity.tenant_id == tenant_id)
        {
            stats
                .entry(activity.member_id)
                .and_modify(|entry| {
                    entry.activity_count += 1;
                    if activity.date > entry.last_activity {
                        entry.last_activity = activity.date;
                    }
                })
                .or_insert(MemberActivityStats {
                    member_id: activity.member_id,
                    last_activity: activity.date,
                    activity_count: 1,
                });
        }
        Ok(stats.into_values().collect())
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn insert(&self, tenant_id: TenantId, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if roles.iter().any(|((stored_tenant, _), stored)| {
            stored_tenant == &tenant_id && stored.name == role.name
        }) {
            return Err(AppError::Conflict(format!(
                "a role named '{}' already exists",
                role.name
            )));
        }

        roles.insert((tenant_id, role.id), role);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&(tenant_id, role_id)).cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut values: Vec<Role> = roles
            .iter()
            .filter_map(|((stored_tenant, _), role)| {
                (stored_tenant == &tenant_id).then(|| role.clone())
            })
            .collect();
        values.sort_by_key(|role| std::cmp::Reverse(role.created_at));
        Ok(values)
    }

    async fn update(&self, tenant_id: TenantId, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let key = (tenant_id, role.id);
        if !roles.contains_key(&key) {
            return Err(AppError::NotFound(format!("role '{}' not found", role.id)));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn delete(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles.remove(&(tenant_id, role_id)).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' not found")));
        }

        Ok(())
    }
}

use chrono::{DateTime, Utc};
use coopra_application::RoleWithUsage;
use coopra_domain::{
    Activity, ActivityId, Contribution, ContributionId, Expense, ExpenseId, Loan, LoanId, Member,
    MemberId, Role, RoleId,
};
use serde::{Deserialize, Serialize};

/// Incoming payload for member registration.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub contribution_plan: f64,
}

/// Incoming payload for a member profile update.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub status: String,
    pub contribution_plan: f64,
}

/// API representation of a member.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub status: String,
    pub join_date: DateTime<Utc>,
    pub contribution_plan: f64,
    pub total_contributions: f64,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email.as_str().to_owned(),
            phone: member.phone,
            role: member.role.as_str().to_owned(),
            status: member.status.as_str().to_owned(),
            join_date: member.join_date,
            contribution_plan: member.contribution_plan,
            total_contributions: member.total_contributions,
        }
    }
}

/// Incoming payload for a contribution submission.
#[derive(Debug, Deserialize)]
pub struct SubmitContributionRequest {
    pub member_id: MemberId,
    pub amount: f64,
    pub payment_method: String,
    pub date: Option<DateTime<Utc>>,
}

/// Incoming payload for a contribution review decision.
#[derive(Debug, Deserialize)]
pub struct ReviewContributionRequest {
    pub decision: String,
}

/// API representation of a contribution.
#[derive(Debug, Serialize)]
pub struct ContributionResponse {
    pub id: ContributionId,
    pub member_id: MemberId,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub payment_method: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Contribution> for ContributionResponse {
    fn from(contribution: Contribution) -> Self {
        Self {
            id: contribution.id,
            member_id: contribution.member_id,
            amount: contribution.amount,
            date: contribution.date,
            payment_method: contribution.payment_method.as_str().to_owned(),
            status: contribution.status.as_str().to_owned(),
            reviewed_by: contribution.reviewed_by,
            created_at: contribution.created_at,
        }
    }
}

/// Incoming payload for a loan application.
#[derive(Debug, Deserialize)]
pub struct LoanApplicationRequest {
    pub member_id: MemberId,
    pub requested_amount: f64,
    pub reason: String,
}

/// Incoming payload for a loan review decision.
#[derive(Debug, Deserialize)]
pub struct LoanDecisionRequest {
    pub decision: String,
    pub approved_amount: Option<f64>,
    pub interest_rate: Option<f64>,
}

/// Incoming payload for a loan repayment.
#[derive(Debug, Deserialize)]
pub struct RepaymentRequest {
    pub amount: f64,
}

/// API representation of a loan.
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: LoanId,
    pub member_id: MemberId,
    pub requested_amount: f64,
    pub approved_amount: Option<f64>,
    pub reason: String,
    pub status: String,
    pub interest_rate: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub amount_repaid: f64,
    pub decided_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id,
            member_id: loan.member_id,
            requested_amount: loan.requested_amount,
            approved_amount: loan.approved_amount,
            reason: loan.reason,
            status: loan.status.as_str().to_owned(),
            interest_rate: loan.interest_rate,
            start_date: loan.start_date,
            due_date: loan.due_date,
            amount_repaid: loan.amount_repaid,
            decided_by: loan.decided_by,
            created_at: loan.created_at,
        }
    }
}

/// Incoming payload for an expense record.
#[derive(Debug, Deserialize)]
pub struct RecordExpenseRequest {
    pub category: String,
    pub amount: f64,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_by: MemberId,
}

/// API representation of an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    pub category: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            category: expense.category.as_str().to_owned(),
            amount: expense.amount,
            date: expense.date,
            description: expense.description,
            created_by: expense.created_by,
            created_at: expense.created_at,
        }
    }
}

/// API representation of an activity log entry.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: ActivityId,
    pub kind: String,
    pub member_id: MemberId,
    pub amount: Option<f64>,
    pub description: String,
    pub date: DateTime<Utc>,
    pub status: Option<String>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            kind: activity.kind.as_str().to_owned(),
            member_id: activity.member_id,
            amount: activity.amount,
            description: activity.description,
            date: activity.date,
            status: activity.status,
        }
    }
}

/// Incoming payload for creating or replacing a custom role.
#[derive(Debug, Deserialize)]
pub struct SaveRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

/// API representation of a custom role, with its assignment count.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<RoleWithUsage> for RoleResponse {
    fn from(usage: RoleWithUsage) -> Self {
        Self {
            id: usage.role.id,
            name: usage.role.name,
            permissions: usage.role.permissions,
            member_count: usage.member_count,
            created_at: usage.role.created_at,
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            permissions: role.permissions,
            member_count: 0,
            created_at: role.created_at,
        }
    }
}

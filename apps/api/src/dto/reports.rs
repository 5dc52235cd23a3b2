use chrono::{DateTime, Utc};
use coopra_application::{
    CategoryBreakdown, FinancialSummary, MemberActivityReport, MemberRepaymentRate,
    MemberReportRow, MemberReportSummary, MonthlyBreakdown,
};
use coopra_domain::MemberId;
use serde::Serialize;

/// One month of aggregated financial movement.
#[derive(Debug, Serialize)]
pub struct MonthlyBreakdownResponse {
    pub month: String,
    pub contributions: f64,
    pub expenses: f64,
    pub loans: f64,
    pub net_balance: f64,
}

impl From<MonthlyBreakdown> for MonthlyBreakdownResponse {
    fn from(breakdown: MonthlyBreakdown) -> Self {
        Self {
            month: breakdown.month,
            contributions: breakdown.contributions,
            expenses: breakdown.expenses,
            loans: breakdown.loans,
            net_balance: breakdown.net_balance,
        }
    }
}

/// Expense totals for one category.
#[derive(Debug, Serialize)]
pub struct CategoryBreakdownResponse {
    pub category: String,
    pub total: f64,
    pub percentage: i64,
}

impl From<CategoryBreakdown> for CategoryBreakdownResponse {
    fn from(breakdown: CategoryBreakdown) -> Self {
        Self {
            category: breakdown.category.as_str().to_owned(),
            total: breakdown.total,
            percentage: breakdown.percentage,
        }
    }
}

/// Financial report over the trailing six-month window.
#[derive(Debug, Serialize)]
pub struct FinancialSummaryResponse {
    pub months: Vec<MonthlyBreakdownResponse>,
    pub total_contributions: f64,
    pub total_expenses: f64,
    pub total_loans: f64,
    pub net_balance: f64,
    pub category_breakdown: Vec<CategoryBreakdownResponse>,
    pub growth_rate: f64,
}

impl From<FinancialSummary> for FinancialSummaryResponse {
    fn from(summary: FinancialSummary) -> Self {
        Self {
            months: summary.months.into_iter().map(Into::into).collect(),
            total_contributions: summary.total_contributions,
            total_expenses: summary.total_expenses,
            total_loans: summary.total_loans,
            net_balance: summary.net_balance,
            category_breakdown: summary
                .category_breakdown
                .into_iter()
                .map(Into::into)
                .collect(),
            growth_rate: summary.growth_rate,
        }
    }
}

/// One member's engagement figures.
#[derive(Debug, Serialize)]
pub struct MemberReportRowResponse {
    pub member_id: MemberId,
    pub name: String,
    pub status: String,
    pub total_contributions: f64,
    pub contribution_plan: f64,
    pub active_loans: i64,
    pub repaid_loans: i64,
    pub total_loans: i64,
    pub last_activity: Option<DateTime<Utc>>,
    pub activity_count: i64,
    pub participation_score: i64,
}

impl From<MemberReportRow> for MemberReportRowResponse {
    fn from(row: MemberReportRow) -> Self {
        Self {
            member_id: row.member_id,
            name: row.name,
            status: row.status.as_str().to_owned(),
            total_contributions: row.total_contributions,
            contribution_plan: row.contribution_plan,
            active_loans: row.active_loans,
            repaid_loans: row.repaid_loans,
            total_loans: row.total_loans,
            last_activity: row.last_activity,
            activity_count: row.activity_count,
            participation_score: row.participation_score,
        }
    }
}

/// A member's share of repaid loans.
#[derive(Debug, Serialize)]
pub struct MemberRepaymentRateResponse {
    pub member_id: MemberId,
    pub name: String,
    pub repayment_rate: f64,
}

impl From<MemberRepaymentRate> for MemberRepaymentRateResponse {
    fn from(rate: MemberRepaymentRate) -> Self {
        Self {
            member_id: rate.member_id,
            name: rate.name,
            repayment_rate: rate.repayment_rate,
        }
    }
}

/// Roll-up figures for the member report.
#[derive(Debug, Serialize)]
pub struct MemberReportSummaryResponse {
    pub total_members: i64,
    pub active_members: i64,
    pub average_participation: f64,
    pub total_contributions: f64,
}

impl From<MemberReportSummary> for MemberReportSummaryResponse {
    fn from(summary: MemberReportSummary) -> Self {
        Self {
            total_members: summary.total_members,
            active_members: summary.active_members,
            average_participation: summary.average_participation,
            total_contributions: summary.total_contributions,
        }
    }
}

/// Member engagement report with ranked slices.
#[derive(Debug, Serialize)]
pub struct MemberActivityReportResponse {
    pub members: Vec<MemberReportRowResponse>,
    pub summary: MemberReportSummaryResponse,
    pub top_contributors: Vec<MemberReportRowResponse>,
    pub most_active: Vec<MemberReportRowResponse>,
    pub repayment_rates: Vec<MemberRepaymentRateResponse>,
}

impl From<MemberActivityReport> for MemberActivityReportResponse {
    fn from(report: MemberActivityReport) -> Self {
        Self {
            members: report.members.into_iter().map(Into::into).collect(),
            summary: report.summary.into(),
            top_contributors: report
                .top_contributors
                .into_iter()
                .map(Into::into)
                .collect(),
            most_active: report.most_active.into_iter().map(Into::into).collect(),
            repayment_rates: report
                .repayment_rates
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

//! On-demand reporting over the ledgers and the activity log.
//!
//! Reports are computed from the stores at request time; nothing here is
//! cached or maintained incrementally.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use coopra_core::{AppError, AppResult, UserIdentity};
use coopra_domain::{Activity, ExpenseCategory, MemberId, MemberStatus};

use crate::ledger_ports::{
    ActivityRepository, ContributionRepository, ExpenseRepository, LoanRepository,
    MemberRepository, MonthlyTotal,
};

/// Number of trailing calendar months covered by the financial summary.
pub const REPORT_WINDOW_MONTHS: usize = 6;

/// Default number of entries returned by the activity feed.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One month of the financial summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBreakdown {
    /// Display label, e.g. `Mar 25`.
    pub month: String,
    /// Approved contributions for the month.
    pub contributions: f64,
    /// Expenses for the month.
    pub expenses: f64,
    /// Approved loan principals for the month of application.
    pub loans: f64,
    /// Contributions minus expenses.
    pub net_balance: f64,
}

/// Share of total spending in one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    /// Expense category.
    pub category: ExpenseCategory,
    /// Summed amount for the category.
    pub total: f64,
    /// Share of all spending, rounded to an integer percentage.
    pub percentage: i64,
}

/// Six-month financial summary.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    /// Oldest-first monthly breakdown covering the report window.
    pub months: Vec<MonthlyBreakdown>,
    /// Approved contributions over the window.
    pub total_contributions: f64,
    /// Expenses over the window.
    pub total_expenses: f64,
    /// Approved loan principals over the window.
    pub total_loans: f64,
    /// Contributions minus expenses over the window.
    pub net_balance: f64,
    /// All-time expense shares by category.
    pub category_breakdown: Vec<CategoryBreakdown>,
    /// Contribution growth of the last three months against the prior
    /// three, as a percentage rounded to one decimal.
    pub growth_rate: f64,
}

/// Per-member row of the member activity report.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberReportRow {
    /// Member identifier.
    pub member_id: MemberId,
    /// Member name.
    pub name: String,
    /// Membership status.
    pub status: MemberStatus,
    /// Running total of approved contributions.
    pub total_contributions: f64,
    /// Expected periodic contribution amount.
    pub contribution_plan: f64,
    /// Loans approved and not yet completed.
    pub active_loans: i64,
    /// Loans fully repaid.
    pub repaid_loans: i64,
    /// All loans ever taken.
    pub total_loans: i64,
    /// Date of the newest activity entry, if any.
    pub last_activity: Option<DateTime<Utc>>,
    /// Number of activity entries.
    pub activity_count: i64,
    /// Composite engagement score from 0 upward.
    pub participation_score: i64,
}

/// Repayment discipline of one borrowing member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRepaymentRate {
    /// Member identifier.
    pub member_id: MemberId,
    /// Member name.
    pub name: String,
    /// Completed loans as a percentage of all loans.
    pub repayment_rate: f64,
}

/// Aggregate block of the member activity report.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberReportSummary {
    /// All members.
    pub total_members: i64,
    /// Members in the `active` status.
    pub active_members: i64,
    /// Mean participation score.
    pub average_participation: f64,
    /// Sum of all member ledger totals.
    pub total_contributions: f64,
}

/// Member activity report: per-member rows plus ranked slices.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberActivityReport {
    /// One row per member.
    pub members: Vec<MemberReportRow>,
    /// Aggregate block.
    pub summary: MemberReportSummary,
    /// Top ten members by ledger total.
    pub top_contributors: Vec<MemberReportRow>,
    /// Top ten members by activity count.
    pub most_active: Vec<MemberReportRow>,
    /// Top ten borrowing members by repayment rate.
    pub repayment_rates: Vec<MemberRepaymentRate>,
}

/// Application service computing reports on demand.
#[derive(Clone)]
pub struct ReportingService {
    contributions: Arc<dyn ContributionRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    loans: Arc<dyn LoanRepository>,
    members: Arc<dyn MemberRepository>,
    activities: Arc<dyn ActivityRepository>,
}

impl ReportingService {
    /// Creates a reporting service from its repositories.
    #[must_use]
    pub fn new(
        contributions: Arc<dyn ContributionRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        loans: Arc<dyn LoanRepository>,
        members: Arc<dyn MemberRepository>,
        activities: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            contributions,
            expenses,
            loans,
            members,
            activities,
        }
    }

    /// Computes the trailing six-month financial summary.
    pub async fn financial_summary(&self, identity: &UserIdentity) -> AppResult<FinancialSummary> {
        self.financial_summary_at(identity, Utc::now()).await
    }

    async fn financial_summary_at(
        &self,
        identity: &UserIdentity,
        now: DateTime<Utc>,
    ) -> AppResult<FinancialSummary> {
        let tenant_id = identity.tenant_id();
        let window = report_window(now)?;
        let since = window.since;

        let contribution_totals = self
            .contributions
            .monthly_approved_totals(tenant_id, since)
            .await?;
        let expense_totals = self.expenses.monthly_totals(tenant_id, since).await?;
        let loan_totals = self.loans.monthly_approved_totals(tenant_id, since).await?;
        let category_totals = self.expenses.category_totals(tenant_id).await?;

        let contributions_by_month = index_by_month(&contribution_totals);
        let expenses_by_month = index_by_month(&expense_totals);
        let loans_by_month = index_by_month(&loan_totals);

        let mut months = Vec::with_capacity(window.months.len());
        for (year, month) in &window.months {
            let key = (*year, *month);
            let contributions = contributions_by_month.get(&key).copied().unwrap_or(0.0);
            let expenses = expenses_by_month.get(&key).copied().unwrap_or(0.0);
            let loans = loans_by_month.get(&key).copied().unwrap_or(0.0);

            months.push(MonthlyBreakdown {
                month: month_label(*year, *month),
                contributions,
                expenses,
                loans,
                net_balance: contributions - expenses,
            });
        }

        let total_contributions: f64 = months.iter().map(|entry| entry.contributions).sum();
        let total_expenses: f64 = months.iter().map(|entry| entry.expenses).sum();
        let total_loans: f64 = months.iter().map(|entry| entry.loans).sum();

        let grand_total: f64 = category_totals.iter().map(|entry| entry.total).sum();
        let mut category_breakdown: Vec<CategoryBreakdown> = category_totals
            .iter()
            .map(|entry| CategoryBreakdown {
                category: entry.category,
                total: entry.total,
                percentage: if grand_total > 0.0 {
                    (entry.total / grand_total * 100.0).round() as i64
                } else {
                    0
                },
            })
            .collect();
        category_breakdown.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let growth_rate = contribution_growth_rate(&months);

        Ok(FinancialSummary {
            months,
            total_contributions,
            total_expenses,
            total_loans,
            net_balance: total_contributions - total_expenses,
            category_breakdown,
            growth_rate,
        })
    }

    /// Computes the member activity report.
    pub async fn member_activity_report(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<MemberActivityReport> {
        let tenant_id = identity.tenant_id();
        let now = Utc::now();

        let members = self.members.list(tenant_id).await?;
        let loan_stats = self.loans.stats_by_member(tenant_id).await?;
        let activity_stats = self.activities.stats_by_member(tenant_id).await?;

        let loans_by_member: HashMap<MemberId, _> = loan_stats
            .into_iter()
            .map(|stats| (stats.member_id, stats))
            .collect();
        let activity_by_member: HashMap<MemberId, _> = activity_stats
            .into_iter()
            .map(|stats| (stats.member_id, stats))
            .collect();

        let mut rows = Vec::with_capacity(members.len());
        for member in &members {
            let loans = loans_by_member.get(&member.id);
            let activity = activity_by_member.get(&member.id);

            let total_loans = loans.map_or(0, |stats| stats.total_loans);
            let repaid_loans = loans.map_or(0, |stats| stats.repaid_loans);
            let activity_count = activity.map_or(0, |stats| stats.activity_count);

            let months = months_since(member.join_date, now);
            let expected = months as f64 * member.contribution_plan;
            let contribution_ratio = if expected > 0.0 {
                member.total_contributions / expected
            } else {
                0.0
            };
            let activity_factor = (activity_count as f64 / 10.0).min(1.0);
            let repayment_factor = repaid_loans as f64 / total_loans.max(1) as f64;

            let participation_score = ((contribution_ratio * 0.5
                + activity_factor * 0.3
                + repayment_factor * 0.2)
                * 100.0)
                .round() as i64;

            rows.push(MemberReportRow {
                member_id: member.id,
                name: member.name.clone(),
                status: member.status,
                total_contributions: member.total_contributions,
                contribution_plan: member.contribution_plan,
                active_loans: loans.map_or(0, |stats| stats.active_loans),
                repaid_loans,
                total_loans,
                last_activity: activity.map(|stats| stats.last_activity),
                activity_count,
                participation_score,
            });
        }

        let total_members = rows.len() as i64;
        let active_members = members
            .iter()
            .filter(|member| member.status == MemberStatus::Active)
            .count() as i64;
        let total_contributions: f64 = rows.iter().map(|row| row.total_contributions).sum();
        let average_participation = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|row| row.participation_score as f64).sum::<f64>() / rows.len() as f64
        };

        let mut top_contributors = rows.clone();
        top_contributors.sort_by(|a, b| {
            b.total_contributions
                .partial_cmp(&a.total_contributions)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        top_contributors.truncate(10);

        let mut most_active = rows.clone();
        most_active.sort_by_key(|row| std::cmp::Reverse(row.activity_count));
        most_active.truncate(10);

        let mut repayment_rates: Vec<MemberRepaymentRate> = rows
            .iter()
            .filter(|row| row.total_loans > 0)
            .map(|row| MemberRepaymentRate {
                member_id: row.member_id,
                name: row.name.clone(),
                repayment_rate: row.repaid_loans as f64 / row.total_loans as f64 * 100.0,
            })
            .collect();
        repayment_rates.sort_by(|a, b| {
            b.repayment_rate
                .partial_cmp(&a.repayment_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        repayment_rates.truncate(10);

        Ok(MemberActivityReport {
            members: rows,
            summary: MemberReportSummary {
                total_members,
                active_members,
                average_participation,
                total_contributions,
            },
            top_contributors,
            most_active,
            repayment_rates,
        })
    }

    /// Returns the newest activity entries for dashboards.
    pub async fn recent_activity(
        &self,
        identity: &UserIdentity,
        limit: Option<usize>,
    ) -> AppResult<Vec<Activity>> {
        self.activities
            .recent(
                identity.tenant_id(),
                limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT),
            )
            .await
    }
}

struct ReportWindow {
    /// Start of the oldest month in the window.
    since: DateTime<Utc>,
    /// (year, month) pairs, oldest first.
    months: Vec<(i32, u32)>,
}

fn report_window(now: DateTime<Utc>) -> AppResult<ReportWindow> {
    let mut months = Vec::with_capacity(REPORT_WINDOW_MONTHS);
    let mut year = now.year();
    let mut month = now.month();

    for _ in 0..REPORT_WINDOW_MONTHS {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();

    let (oldest_year, oldest_month) = months[0];
    let since = Utc
        .with_ymd_and_hms(oldest_year, oldest_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "invalid report window start {oldest_year}-{oldest_month:02}"
            ))
        })?;

    Ok(ReportWindow { since, months })
}

fn index_by_month(totals: &[MonthlyTotal]) -> HashMap<(i32, u32), f64> {
    totals
        .iter()
        .map(|total| ((total.year, total.month), total.total))
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    let abbreviation = MONTH_ABBREVIATIONS
        .get(month as usize - 1)
        .copied()
        .unwrap_or("???");
    format!("{abbreviation} {:02}", year.rem_euclid(100))
}

/// Contribution growth of the last three window months against the prior
/// three, as a percentage rounded to one decimal. Zero when the prior
/// half saw no contributions.
fn contribution_growth_rate(months: &[MonthlyBreakdown]) -> f64 {
    if months.len() < REPORT_WINDOW_MONTHS {
        return 0.0;
    }

    let first_half: f64 = months[..3].iter().map(|entry| entry.contributions).sum();
    let second_half: f64 = months[3..].iter().map(|entry| entry.contributions).sum();

    if first_half <= 0.0 {
        return 0.0;
    }

    let rate = (second_half - first_half) / first_half * 100.0;
    (rate * 10.0).round() / 10.0
}

fn months_since(join_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let months = i64::from(now.year() - join_date.year()) * 12
        + i64::from(now.month() as i32 - join_date.month() as i32);
    months.max(1)
}

#[cfg(test)]
mod tests;

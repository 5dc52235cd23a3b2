use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use coopra_core::{TenantId, UserIdentity};
use coopra_domain::{
    Activity, ActivityKind, Contribution, ContributionStatus, Expense, ExpenseCategory, Loan,
    LoanStatus, Member, MemberId, MemberRole, PaymentMethod,
};

use super::{
    MonthlyBreakdown, ReportingService, contribution_growth_rate, month_label, months_since,
    report_window,
};
use crate::test_support::{
    FakeActivities, FakeContributions, FakeExpenses, FakeLoans, FakeMembers,
};

struct Harness {
    contributions: Arc<FakeContributions>,
    expenses: Arc<FakeExpenses>,
    loans: Arc<FakeLoans>,
    members: Arc<FakeMembers>,
    activities: Arc<FakeActivities>,
    service: ReportingService,
    identity: UserIdentity,
}

fn harness() -> Harness {
    let contributions = Arc::new(FakeContributions::default());
    let expenses = Arc::new(FakeExpenses::default());
    let loans = Arc::new(FakeLoans::default());
    let members = Arc::new(FakeMembers::default());
    let activities = Arc::new(FakeActivities::default());
    let service = ReportingService::new(
        contributions.clone(),
        expenses.clone(),
        loans.clone(),
        members.clone(),
        activities.clone(),
    );

    Harness {
        contributions,
        expenses,
        loans,
        members,
        activities,
        service,
        identity: UserIdentity::new("auth0|chair", "Chair", None, TenantId::new()),
    }
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single() {
        Some(date) => date,
        None => panic!("invalid test date {year}-{month:02}-{day:02}"),
    }
}

async fn seed_member(harness: &Harness, name: &str, email: &str, plan: f64) -> Member {
    let member = match Member::new(
        harness.identity.tenant_id(),
        name,
        email,
        "+2348012345678",
        MemberRole::Member,
        plan,
        Utc::now(),
    ) {
        Ok(member) => member,
        Err(error) => panic!("member should be valid: {error}"),
    };
    harness.members.seed(member.clone()).await;
    member
}

async fn seed_approved_contribution(
    harness: &Harness,
    member_id: MemberId,
    amount: f64,
    date: DateTime<Utc>,
) {
    let mut contribution = match Contribution::new(
        harness.identity.tenant_id(),
        member_id,
        amount,
        PaymentMethod::Cash,
        date,
        date,
    ) {
        Ok(contribution) => contribution,
        Err(error) => panic!("contribution should be valid: {error}"),
    };
    contribution.status = ContributionStatus::Approved;
    harness.contributions.seed(contribution).await;
}

async fn seed_expense(
    harness: &Harness,
    created_by: MemberId,
    category: ExpenseCategory,
    amount: f64,
    date: DateTime<Utc>,
) {
    let expense = match Expense::new(
        harness.identity.tenant_id(),
        category,
        amount,
        date,
        None,
        created_by,
        date,
    ) {
        Ok(expense) => expense,
        Err(error) => panic!("expense should be valid: {error}"),
    };
    harness.expenses.seed(expense).await;
}

async fn seed_loan(
    harness: &Harness,
    member_id: MemberId,
    amount: f64,
    status: LoanStatus,
    created_at: DateTime<Utc>,
) {
    let mut loan = match Loan::new_application(
        harness.identity.tenant_id(),
        member_id,
        amount,
        "seed",
        created_at,
    ) {
        Ok(loan) => loan,
        Err(error) => panic!("loan should be valid: {error}"),
    };
    loan.status = status;
    if status != LoanStatus::Pending && status != LoanStatus::Rejected {
        loan.approved_amount = Some(amount);
    }
    harness.loans.seed(loan).await;
}

#[test]
fn report_window_spans_six_months_oldest_first() {
    let window = report_window(at(2026, 8, 15));
    assert!(window.is_ok());
    if let Ok(window) = window {
        assert_eq!(
            window.months,
            vec![
                (2026, 3),
                (2026, 4),
                (2026, 5),
                (2026, 6),
                (2026, 7),
                (2026, 8)
            ]
        );
        assert_eq!(
            Some(window.since),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single()
        );
    }
}

#[test]
fn report_window_crosses_year_boundaries() {
    let window = report_window(at(2026, 2, 1));
    assert!(window.is_ok());
    if let Ok(window) = window {
        assert_eq!(window.months[0], (2025, 9));
        assert_eq!(window.months[5], (2026, 2));
    }
}

#[test]
fn month_labels_use_two_digit_years() {
    assert_eq!(month_label(2026, 3), "Mar 26");
    assert_eq!(month_label(2025, 12), "Dec 25");
    assert_eq!(month_label(2009, 1), "Jan 09");
}

#[test]
fn growth_rate_compares_window_halves_to_one_decimal() {
    let month = |contributions: f64| MonthlyBreakdown {
        month: "x".to_owned(),
        contributions,
        expenses: 0.0,
        loans: 0.0,
        net_balance: contributions,
    };

    let months = vec![
        month(100.0),
        month(100.0),
        month(100.0),
        month(110.0),
        month(120.0),
        month(130.0),
    ];
    assert_eq!(contribution_growth_rate(&months), 20.0);

    let thirds = vec![
        month(100.0),
        month(100.0),
        month(100.0),
        month(100.0),
        month(100.0),
        month(100.0 + 1.0 / 3.0),
    ];
    assert_eq!(contribution_growth_rate(&thirds), 0.1);

    let empty_first_half = vec![
        month(0.0),
        month(0.0),
        month(0.0),
        month(100.0),
        month(100.0),
        month(100.0),
    ];
    assert_eq!(contribution_growth_rate(&empty_first_half), 0.0);
}

#[test]
fn months_since_is_floored_at_one() {
    let now = at(2026, 8, 15);
    assert_eq!(months_since(at(2026, 8, 1), now), 1);
    assert_eq!(months_since(at(2026, 9, 1), now), 1);
    assert_eq!(months_since(at(2026, 2, 28), now), 6);
    assert_eq!(months_since(at(2024, 8, 15), now), 24);
}

#[tokio::test]
async fn financial_summary_aggregates_per_month_and_overall() {
    let harness = harness();
    let member = seed_member(&harness, "Ada Obi", "ada@example.com", 100.0).await;

    let now = Utc::now();
    seed_approved_contribution(&harness, member.id, 500.0, now).await;
    seed_approved_contribution(&harness, member.id, 250.0, now).await;
    seed_expense(&harness, member.id, ExpenseCategory::Office, 100.0, now).await;
    seed_loan(&harness, member.id, 1000.0, LoanStatus::Approved, now).await;

    let summary = harness.service.financial_summary(&harness.identity).await;
    assert!(summary.is_ok());
    if let Ok(summary) = summary {
        assert_eq!(summary.months.len(), 6);
        assert_eq!(summary.total_contributions, 750.0);
        assert_eq!(summary.total_expenses, 100.0);
        assert_eq!(summary.total_loans, 1000.0);
        assert_eq!(summary.net_balance, 650.0);

        let current = &summary.months[5];
        assert_eq!(current.contributions, 750.0);
        assert_eq!(current.expenses, 100.0);
        assert_eq!(current.net_balance, 650.0);

        for earlier in &summary.months[..5] {
            assert_eq!(earlier.contributions, 0.0);
            assert_eq!(earlier.net_balance, 0.0);
        }
    }
}

#[tokio::test]
async fn pending_contributions_and_rejected_loans_are_excluded() {
    let harness = harness();
    let member = seed_member(&harness, "Ada Obi", "ada@example.com", 100.0).await;
    let now = Utc::now();

    let pending = match Contribution::new(
        harness.identity.tenant_id(),
        member.id,
        999.0,
        PaymentMethod::Cash,
        now,
        now,
    ) {
        Ok(contribution) => contribution,
        Err(error) => panic!("contribution should be valid: {error}"),
    };
    harness.contributions.seed(pending).await;
    seed_loan(&harness, member.id, 999.0, LoanStatus::Rejected, now).await;

    let summary = harness.service.financial_summary(&harness.identity).await;
    assert!(summary.is_ok());
    if let Ok(summary) = summary {
        assert_eq!(summary.total_contributions, 0.0);
        assert_eq!(summary.total_loans, 0.0);
    }
}

#[tokio::test]
async fn category_breakdown_uses_rounded_integer_percentages() {
    let harness = harness();
    let member = seed_member(&harness, "Ada Obi", "ada@example.com", 100.0).await;
    let now = Utc::now();

    seed_expense(&harness, member.id, ExpenseCategory::Office, 200.0, now).await;
    seed_expense(&harness, member.id, ExpenseCategory::Operations, 100.0, now).await;

    let summary = harness.service.financial_summary(&harness.identity).await;
    assert!(summary.is_ok());
    if let Ok(summary) = summary {
        assert_eq!(summary.category_breakdown.len(), 2);
        assert_eq!(summary.category_breakdown[0].category, ExpenseCategory::Office);
        assert_eq!(summary.category_breakdown[0].percentage, 67);
        assert_eq!(summary.category_breakdown[1].percentage, 33);
    }
}

#[tokio::test]
async fn member_report_scores_contributions_activity_and_repayment() {
    let harness = harness();
    let tenant_id = harness.identity.tenant_id();

    // Joined this month (one month of history), plan 100, contributed 100:
    // contribution ratio 1.0. Ten activities saturate the activity factor.
    // One completed loan out of one gives a full repayment factor.
    let mut member = seed_member(&harness, "Ada Obi", "ada@example.com", 100.0).await;
    member.total_contributions = 100.0;
    harness.members.seed(member.clone()).await;

    for _ in 0..10 {
        harness
            .activities
            .seed(Activity::new(
                tenant_id,
                ActivityKind::Contribution,
                member.id,
                Some(10.0),
                "Contribution of $10 submitted",
                Some("pending".to_owned()),
                Utc::now(),
            ))
            .await;
    }
    seed_loan(&harness, member.id, 100.0, LoanStatus::Completed, Utc::now()).await;

    let report = harness.service.member_activity_report(&harness.identity).await;
    assert!(report.is_ok());
    if let Ok(report) = report {
        assert_eq!(report.members.len(), 1);
        let row = &report.members[0];
        assert_eq!(row.participation_score, 100);
        assert_eq!(row.repaid_loans, 1);
        assert_eq!(row.activity_count, 10);
        assert!(row.last_activity.is_some());

        assert_eq!(report.summary.total_members, 1);
        assert_eq!(report.summary.active_members, 1);
        assert_eq!(report.summary.average_participation, 100.0);
        assert_eq!(report.summary.total_contributions, 100.0);

        assert_eq!(report.repayment_rates.len(), 1);
        assert_eq!(report.repayment_rates[0].repayment_rate, 100.0);
    }
}

#[tokio::test]
async fn member_without_history_scores_zero() {
    let harness = harness();
    seed_member(&harness, "Grace Eze", "grace@example.com", 100.0).await;

    let report = harness.service.member_activity_report(&harness.identity).await;
    assert!(report.is_ok());
    if let Ok(report) = report {
        assert_eq!(report.members[0].participation_score, 0);
        assert_eq!(report.members[0].total_loans, 0);
        assert_eq!(report.members[0].last_activity, None);
        assert!(report.repayment_rates.is_empty());
    }
}

#[tokio::test]
async fn ranked_slices_are_capped_at_ten() {
    let harness = harness();

    for index in 0..12 {
        let mut member = seed_member(
            &harness,
            &format!("Member {index}"),
            &format!("member{index}@example.com"),
            100.0,
        )
        .await;
        member.total_contributions = f64::from(index) * 10.0;
        harness.members.seed(member).await;
    }

    let report = harness.service.member_activity_report(&harness.identity).await;
    assert!(report.is_ok());
    if let Ok(report) = report {
        assert_eq!(report.members.len(), 12);
        assert_eq!(report.top_contributors.len(), 10);
        assert_eq!(report.most_active.len(), 10);
        assert_eq!(report.top_contributors[0].total_contributions, 110.0);
    }
}

#[tokio::test]
async fn recent_activity_defaults_to_ten_entries() {
    let harness = harness();
    let tenant_id = harness.identity.tenant_id();
    let member_id = MemberId::new();

    for index in 0..15 {
        harness
            .activities
            .seed(Activity::new(
                tenant_id,
                ActivityKind::Contribution,
                member_id,
                Some(f64::from(index)),
                format!("Contribution of ${index} submitted"),
                Some("pending".to_owned()),
                Utc::now(),
            ))
            .await;
    }

    let feed = harness.service.recent_activity(&harness.identity, None).await;
    assert_eq!(feed.map(|rows| rows.len()).ok(), Some(10));

    let limited = harness
        .service
        .recent_activity(&harness.identity, Some(3))
        .await;
    assert_eq!(limited.map(|rows| rows.len()).ok(), Some(3));
}

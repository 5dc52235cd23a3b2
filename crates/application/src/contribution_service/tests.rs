use std::sync::Arc;

use chrono::Utc;
use coopra_core::{AppError, TenantId, UserIdentity};
use coopra_domain::{
    ActivityKind, ContributionDecision, ContributionId, ContributionStatus, LendingPolicy, Member,
    MemberId, MemberRole, PaymentMethod,
};

use super::{ContributionService, SubmitContributionInput};
use crate::ledger_ports::MemberRepository;
use crate::test_support::{FakeActivities, FakeContributions, FakeMembers};

struct Harness {
    contributions: Arc<FakeContributions>,
    members: Arc<FakeMembers>,
    activities: Arc<FakeActivities>,
    service: ContributionService,
    identity: UserIdentity,
}

fn harness(policy: LendingPolicy) -> Harness {
    let contributions = Arc::new(FakeContributions::default());
    let members = Arc::new(FakeMembers::default());
    let activities = Arc::new(FakeActivities::default());
    let service = ContributionService::new(
        contributions.clone(),
        members.clone(),
        activities.clone(),
        policy,
    );

    Harness {
        contributions,
        members,
        activities,
        service,
        identity: UserIdentity::new("auth0|reviewer", "Reviewer", None, TenantId::new()),
    }
}

async fn seed_member(harness: &Harness) -> MemberId {
    let member = match Member::new(
        harness.identity.tenant_id(),
        "Ada Obi",
        "ada@example.com",
        "+2348012345678",
        MemberRole::Member,
        100.0,
        Utc::now(),
    ) {
        Ok(member) => member,
        Err(error) => panic!("member should be valid: {error}"),
    };
    let member_id = member.id;
    harness.members.seed(member).await;
    member_id
}

fn submit_input(member_id: MemberId, amount: f64) -> SubmitContributionInput {
    SubmitContributionInput {
        member_id,
        amount,
        payment_method: PaymentMethod::MobileMoney,
        date: Utc::now(),
    }
}

#[tokio::test]
async fn submission_creates_a_pending_contribution_and_logs_it() {
    let harness = harness(LendingPolicy::default());
    let member_id = seed_member(&harness).await;

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(member_id, 250.0))
        .await;
    assert!(submitted.is_ok());
    if let Ok(contribution) = submitted {
        assert_eq!(contribution.status, ContributionStatus::Pending);
    }

    let entries = harness.activities.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ActivityKind::Contribution);
    assert_eq!(entries[0].description, "Contribution of $250 submitted");
    assert_eq!(entries[0].status.as_deref(), Some("pending"));
}

#[tokio::test]
async fn submission_for_an_unknown_member_is_rejected() {
    let harness = harness(LendingPolicy::default());

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(MemberId::new(), 250.0))
        .await;
    assert!(matches!(submitted, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn approval_credits_the_member_ledger() {
    let harness = harness(LendingPolicy::default());
    let member_id = seed_member(&harness).await;

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(member_id, 250.0))
        .await;
    assert!(submitted.is_ok());

    if let Ok(contribution) = submitted {
        let reviewed = harness
            .service
            .review(
                &harness.identity,
                contribution.id,
                ContributionDecision::Approved,
            )
            .await;
        assert!(reviewed.is_ok());
        if let Ok(reviewed) = reviewed {
            assert_eq!(reviewed.status, ContributionStatus::Approved);
            assert_eq!(reviewed.reviewed_by.as_deref(), Some("auth0|reviewer"));
        }

        let member = harness
            .members
            .find(harness.identity.tenant_id(), member_id)
            .await;
        assert_eq!(
            member.ok().flatten().map(|m| m.total_contributions),
            Some(250.0)
        );
    }
}

#[tokio::test]
async fn rejection_leaves_the_ledger_untouched() {
    let harness = harness(LendingPolicy::default());
    let member_id = seed_member(&harness).await;

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(member_id, 250.0))
        .await;
    assert!(submitted.is_ok());

    if let Ok(contribution) = submitted {
        let reviewed = harness
            .service
            .review(
                &harness.identity,
                contribution.id,
                ContributionDecision::Rejected,
            )
            .await;
        assert!(reviewed.is_ok());

        let member = harness
            .members
            .find(harness.identity.tenant_id(), member_id)
            .await;
        assert_eq!(
            member.ok().flatten().map(|m| m.total_contributions),
            Some(0.0)
        );
    }
}

#[tokio::test]
async fn double_review_is_permitted_by_default_and_double_credits() {
    let harness = harness(LendingPolicy::default());
    let member_id = seed_member(&harness).await;

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(member_id, 250.0))
        .await;
    assert!(submitted.is_ok());

    if let Ok(contribution) = submitted {
        for _ in 0..2 {
            let reviewed = harness
                .service
                .review(
                    &harness.identity,
                    contribution.id,
                    ContributionDecision::Approved,
                )
                .await;
            assert!(reviewed.is_ok());
        }

        let member = harness
            .members
            .find(harness.identity.tenant_id(), member_id)
            .await;
        assert_eq!(
            member.ok().flatten().map(|m| m.total_contributions),
            Some(500.0)
        );
    }
}

#[tokio::test]
async fn double_review_is_a_conflict_under_the_strict_policy() {
    let harness = harness(LendingPolicy {
        reject_double_review: true,
        ..LendingPolicy::default()
    });
    let member_id = seed_member(&harness).await;

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(member_id, 250.0))
        .await;
    assert!(submitted.is_ok());

    if let Ok(contribution) = submitted {
        let first = harness
            .service
            .review(
                &harness.identity,
                contribution.id,
                ContributionDecision::Approved,
            )
            .await;
        assert!(first.is_ok());

        let second = harness
            .service
            .review(
                &harness.identity,
                contribution.id,
                ContributionDecision::Approved,
            )
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }
}

#[tokio::test]
async fn review_cannot_see_another_cooperatives_contribution() {
    let harness = harness(LendingPolicy::default());
    let member_id = seed_member(&harness).await;

    let submitted = harness
        .service
        .submit(&harness.identity, submit_input(member_id, 250.0))
        .await;
    assert!(submitted.is_ok());

    if let Ok(contribution) = submitted {
        let outsider = UserIdentity::new("auth0|other", "Other", None, TenantId::new());
        let reviewed = harness
            .service
            .review(&outsider, contribution.id, ContributionDecision::Approved)
            .await;
        assert!(matches!(reviewed, Err(AppError::NotFound(_))));
    }
}

#[tokio::test]
async fn review_of_an_unknown_contribution_is_not_found() {
    let harness = harness(LendingPolicy::default());

    let reviewed = harness
        .service
        .review(
            &harness.identity,
            ContributionId::new(),
            ContributionDecision::Approved,
        )
        .await;
    assert!(matches!(reviewed, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn listing_filters_by_status() {
    let harness = harness(LendingPolicy::default());
    let member_id = seed_member(&harness).await;

    for amount in [100.0, 200.0] {
        let submitted = harness
            .service
            .submit(&harness.identity, submit_input(member_id, amount))
            .await;
        assert!(submitted.is_ok());
    }

    let pending = harness
        .contributions
        .rows
        .lock()
        .await
        .keys()
        .copied()
        .collect::<Vec<_>>();
    if let Some(first) = pending.first() {
        let reviewed = harness
            .service
            .review(&harness.identity, *first, ContributionDecision::Approved)
            .await;
        assert!(reviewed.is_ok());
    }

    let approved = harness
        .service
        .list(&harness.identity, Some(ContributionStatus::Approved))
        .await;
    assert_eq!(approved.map(|rows| rows.len()).ok(), Some(1));

    let all = harness.service.list(&harness.identity, None).await;
    assert_eq!(all.map(|rows| rows.len()).ok(), Some(2));
}

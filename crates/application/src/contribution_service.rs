//! Contribution workflow: submission, review and listing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, UserIdentity};
use coopra_domain::{
    Activity, ActivityKind, Contribution, ContributionDecision, ContributionId,
    ContributionStatus, LendingPolicy, MemberId, PaymentMethod,
};

use crate::ledger_ports::{ActivityRepository, ContributionRepository, MemberRepository};

/// Fields required to submit a contribution.
#[derive(Debug, Clone)]
pub struct SubmitContributionInput {
    /// Contributing member.
    pub member_id: MemberId,
    /// Contributed amount, strictly positive.
    pub amount: f64,
    /// How the contribution was paid.
    pub payment_method: PaymentMethod,
    /// Date the contribution was made.
    pub date: DateTime<Utc>,
}

/// Application service for the contribution workflow.
#[derive(Clone)]
pub struct ContributionService {
    contributions: Arc<dyn ContributionRepository>,
    members: Arc<dyn MemberRepository>,
    activities: Arc<dyn ActivityRepository>,
    policy: LendingPolicy,
}

impl ContributionService {
    /// Creates a contribution service from its repositories and policy.
    #[must_use]
    pub fn new(
        contributions: Arc<dyn ContributionRepository>,
        members: Arc<dyn MemberRepository>,
        activities: Arc<dyn ActivityRepository>,
        policy: LendingPolicy,
    ) -> Self {
        Self {
            contributions,
            members,
            activities,
            policy,
        }
    }

    /// Submits a pending contribution for a member and logs the activity.
    pub async fn submit(
        &self,
        identity: &UserIdentity,
        input: SubmitContributionInput,
    ) -> AppResult<Contribution> {
        let tenant_id = identity.tenant_id();

        if self.members.find(tenant_id, input.member_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "member '{}' not found",
                input.member_id
            )));
        }

        let contribution = Contribution::new(
            tenant_id,
            input.member_id,
            input.amount,
            input.payment_method,
            input.date,
            Utc::now(),
        )?;

        self.contributions
            .insert(tenant_id, contribution.clone())
            .await?;

        self.activities
            .append(
                tenant_id,
                Activity::new(
                    tenant_id,
                    ActivityKind::Contribution,
                    contribution.member_id,
                    Some(contribution.amount),
                    format!("Contribution of ${} submitted", contribution.amount),
                    Some(ContributionStatus::Pending.as_str().to_owned()),
                    Utc::now(),
                ),
            )
            .await?;

        Ok(contribution)
    }

    /// Reviews a pending contribution.
    ///
    /// Approval atomically credits the member ledger at the store; the
    /// activity entry carries the decision either way. Re-reviewing an
    /// already-decided contribution is permitted unless the
    /// `reject_double_review` policy switch is on.
    pub async fn review(
        &self,
        identity: &UserIdentity,
        contribution_id: ContributionId,
        decision: ContributionDecision,
    ) -> AppResult<Contribution> {
        let tenant_id = identity.tenant_id();

        let existing = self
            .contributions
            .find(tenant_id, contribution_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("contribution '{contribution_id}' not found"))
            })?;

        if self.policy.reject_double_review && existing.status.is_decided() {
            return Err(AppError::Conflict(format!(
                "contribution '{contribution_id}' was already reviewed"
            )));
        }

        let contribution = self
            .contributions
            .record_decision(
                tenant_id,
                contribution_id,
                decision.as_status(),
                identity.subject(),
            )
            .await?;

        if decision == ContributionDecision::Approved {
            self.members
                .credit_contribution(tenant_id, contribution.member_id, contribution.amount)
                .await?;
        }

        self.activities
            .append(
                tenant_id,
                Activity::new(
                    tenant_id,
                    ActivityKind::Contribution,
                    contribution.member_id,
                    Some(contribution.amount),
                    format!(
                        "Contribution of ${} {}",
                        contribution.amount,
                        contribution.status.as_str()
                    ),
                    Some(contribution.status.as_str().to_owned()),
                    Utc::now(),
                ),
            )
            .await?;

        Ok(contribution)
    }

    /// Lists contributions, optionally filtered by status.
    pub async fn list(
        &self,
        identity: &UserIdentity,
        status: Option<ContributionStatus>,
    ) -> AppResult<Vec<Contribution>> {
        self.contributions.list(identity.tenant_id(), status).await
    }
}

#[cfg(test)]
mod tests;

//! Loan lifecycle: application, decision, repayment and manual default.

use std::sync::Arc;

use chrono::Utc;
use coopra_core::{AppError, AppResult, UserIdentity};
use coopra_domain::{
    Activity, ActivityKind, LendingPolicy, Loan, LoanDecision, LoanId, LoanStatus, MemberId,
};

use crate::ledger_ports::{ActivityRepository, LoanRepository, MemberRepository};

/// Fields required to apply for a loan.
#[derive(Debug, Clone)]
pub struct LoanApplicationInput {
    /// Borrowing member.
    pub member_id: MemberId,
    /// Requested amount, strictly positive.
    pub requested_amount: f64,
    /// Stated purpose of the loan.
    pub reason: String,
}

/// Fields of a review decision on a pending loan.
#[derive(Debug, Clone)]
pub struct LoanDecisionInput {
    /// Approve or reject.
    pub decision: LoanDecision,
    /// Granted amount; defaults to the requested amount when absent.
    pub approved_amount: Option<f64>,
    /// Interest rate override; keeps the application rate when absent.
    pub interest_rate: Option<f64>,
}

/// Application service for the loan lifecycle.
#[derive(Clone)]
pub struct LoanService {
    loans: Arc<dyn LoanRepository>,
    members: Arc<dyn MemberRepository>,
    activities: Arc<dyn ActivityRepository>,
    policy: LendingPolicy,
}

impl LoanService {
    /// Creates a loan service from its repositories and policy.
    #[must_use]
    pub fn new(
        loans: Arc<dyn LoanRepository>,
        members: Arc<dyn MemberRepository>,
        activities: Arc<dyn ActivityRepository>,
        policy: LendingPolicy,
    ) -> Self {
        Self {
            loans,
            members,
            activities,
            policy,
        }
    }

    /// Files a pending application at the default interest rate and logs it.
    pub async fn apply(
        &self,
        identity: &UserIdentity,
        input: LoanApplicationInput,
    ) -> AppResult<Loan> {
        let tenant_id = identity.tenant_id();

        if self.members.find(tenant_id, input.member_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "member '{}' not found",
                input.member_id
            )));
        }

        let loan = Loan::new_application(
            tenant_id,
            input.member_id,
            input.requested_amount,
            input.reason,
            Utc::now(),
        )?;

        self.loans.insert(tenant_id, loan.clone()).await?;

        self.activities
            .append(
                tenant_id,
                Activity::new(
                    tenant_id,
                    ActivityKind::LoanApplication,
                    loan.member_id,
                    Some(loan.requested_amount),
                    format!("Loan application for ${}", loan.requested_amount),
                    Some(LoanStatus::Pending.as_str().to_owned()),
                    Utc::now(),
                ),
            )
            .await?;

        Ok(loan)
    }

    /// Reviews a pending application.
    ///
    /// Approval sets the repayment terms: start date now, due date one loan
    /// term later, the supplied amount and rate overriding the application
    /// values. The approved amount is capped at the requested amount only
    /// when the `cap_approved_amount` policy switch is on; double decisions
    /// are rejected only under `reject_double_review`.
    pub async fn decide(
        &self,
        identity: &UserIdentity,
        loan_id: LoanId,
        input: LoanDecisionInput,
    ) -> AppResult<Loan> {
        let tenant_id = identity.tenant_id();

        let mut loan = self
            .loans
            .find(tenant_id, loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;

        if self.policy.reject_double_review && loan.status.is_decided() {
            return Err(AppError::Conflict(format!(
                "loan '{loan_id}' was already decided"
            )));
        }

        if let Some(approved_amount) = input.approved_amount {
            if approved_amount <= 0.0 {
                return Err(AppError::Validation(
                    "approved amount must be positive".to_owned(),
                ));
            }
            if self.policy.cap_approved_amount && approved_amount > loan.requested_amount {
                return Err(AppError::Validation(
                    "approved amount must not exceed the requested amount".to_owned(),
                ));
            }
        }

        loan.status = input.decision.as_status();
        loan.decided_by = Some(identity.subject().to_owned());
        if let Some(interest_rate) = input.interest_rate {
            loan.interest_rate = interest_rate;
        }

        if input.decision == LoanDecision::Approved {
            let start = Utc::now();
            loan.approved_amount = Some(input.approved_amount.unwrap_or(loan.requested_amount));
            loan.start_date = Some(start);
            loan.due_date = Some(Loan::due_date_for(start));
        }

        self.loans.record_decision(tenant_id, loan.clone()).await?;

        let kind = match input.decision {
            LoanDecision::Approved => ActivityKind::LoanApproval,
            LoanDecision::Rejected => ActivityKind::LoanApplication,
        };
        self.activities
            .append(
                tenant_id,
                Activity::new(
                    tenant_id,
                    kind,
                    loan.member_id,
                    Some(loan.principal()),
                    format!("Loan {} for ${}", loan.status.as_str(), loan.principal()),
                    Some(loan.status.as_str().to_owned()),
                    Utc::now(),
                ),
            )
            .await?;

        Ok(loan)
    }

    /// Posts a repayment against a loan.
    ///
    /// The increment and the completion check run as one conditional update
    /// at the store, so concurrent postings cannot lose amounts. Overpayment
    /// is accepted unless the `cap_repayment` policy switch is on.
    pub async fn record_repayment(
        &self,
        identity: &UserIdentity,
        loan_id: LoanId,
        amount: f64,
    ) -> AppResult<Loan> {
        let tenant_id = identity.tenant_id();

        if amount <= 0.0 {
            return Err(AppError::Validation(
                "repayment amount must be positive".to_owned(),
            ));
        }

        if self.policy.cap_repayment {
            let loan = self
                .loans
                .find(tenant_id, loan_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;
            if amount > loan.outstanding() {
                return Err(AppError::Validation(format!(
                    "repayment of ${amount} exceeds the outstanding balance of ${}",
                    loan.outstanding()
                )));
            }
        }

        let loan = self.loans.add_repayment(tenant_id, loan_id, amount).await?;

        self.activities
            .append(
                tenant_id,
                Activity::new(
                    tenant_id,
                    ActivityKind::LoanRepayment,
                    loan.member_id,
                    Some(amount),
                    format!("Loan repayment of ${amount}"),
                    None,
                    Utc::now(),
                ),
            )
            .await?;

        Ok(loan)
    }

    /// Manually marks a loan as defaulted.
    ///
    /// This is the only path to the `defaulted` status; there is no
    /// scheduled sweep over overdue loans. Terminal loans cannot be
    /// defaulted.
    pub async fn mark_defaulted(
        &self,
        identity: &UserIdentity,
        loan_id: LoanId,
    ) -> AppResult<Loan> {
        let tenant_id = identity.tenant_id();

        let loan = self
            .loans
            .find(tenant_id, loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;

        if loan.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "loan '{loan_id}' is already {}",
                loan.status.as_str()
            )));
        }

        self.loans
            .set_status(tenant_id, loan_id, LoanStatus::Defaulted)
            .await
    }

    /// Lists loans, optionally filtered by status.
    pub async fn list(
        &self,
        identity: &UserIdentity,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<Loan>> {
        self.loans.list(identity.tenant_id(), status).await
    }
}

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use coopra_application::{LoanApplicationInput, LoanDecisionInput};
use coopra_core::UserIdentity;
use coopra_domain::{LoanDecision, LoanId, LoanStatus};
use serde::Deserialize;

use crate::dto::{LoanApplicationRequest, LoanDecisionRequest, LoanResponse, RepaymentRequest};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoanListQuery {
    pub status: Option<String>,
}

pub async fn list_loans_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<LoanListQuery>,
) -> ApiResult<Json<Vec<LoanResponse>>> {
    let status = query
        .status
        .map(|value| value.parse::<LoanStatus>())
        .transpose()?;

    let loans = state
        .loan_service
        .list(&identity, status)
        .await?
        .into_iter()
        .map(LoanResponse::from)
        .collect();

    Ok(Json(loans))
}

pub async fn apply_loan_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<LoanApplicationRequest>,
) -> ApiResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state
        .loan_service
        .apply(
            &identity,
            LoanApplicationInput {
                member_id: payload.member_id,
                requested_amount: payload.requested_amount,
                reason: payload.reason,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

pub async fn decide_loan_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(loan_id): Path<uuid::Uuid>,
    Json(payload): Json<LoanDecisionRequest>,
) -> ApiResult<Json<LoanResponse>> {
    let decision = payload.decision.parse::<LoanDecision>()?;
    let loan = state
        .loan_service
        .decide(
            &identity,
            LoanId::from_uuid(loan_id),
            LoanDecisionInput {
                decision,
                approved_amount: payload.approved_amount,
                interest_rate: payload.interest_rate,
            },
        )
        .await?;

    Ok(Json(LoanResponse::from(loan)))
}

pub async fn record_repayment_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(loan_id): Path<uuid::Uuid>,
    Json(payload): Json<RepaymentRequest>,
) -> ApiResult<Json<LoanResponse>> {
    let loan = state
        .loan_service
        .record_repayment(&identity, LoanId::from_uuid(loan_id), payload.amount)
        .await?;

    Ok(Json(LoanResponse::from(loan)))
}

pub async fn mark_defaulted_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(loan_id): Path<uuid::Uuid>,
) -> ApiResult<Json<LoanResponse>> {
    let loan = state
        .loan_service
        .mark_defaulted(&identity, LoanId::from_uuid(loan_id))
        .await?;

    Ok(Json(LoanResponse::from(loan)))
}

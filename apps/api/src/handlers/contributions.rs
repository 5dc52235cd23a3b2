use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use coopra_application::SubmitContributionInput;
use coopra_core::UserIdentity;
use coopra_domain::{ContributionDecision, ContributionId, ContributionStatus, PaymentMethod};
use serde::Deserialize;

use crate::dto::{ContributionResponse, ReviewContributionRequest, SubmitContributionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContributionListQuery {
    pub status: Option<String>,
}

pub async fn list_contributions_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<ContributionListQuery>,
) -> ApiResult<Json<Vec<ContributionResponse>>> {
    let status = query
        .status
        .map(|value| value.parse::<ContributionStatus>())
        .transpose()?;

    let contributions = state
        .contribution_service
        .list(&identity, status)
        .await?
        .into_iter()
        .map(ContributionResponse::from)
        .collect();

    Ok(Json(contributions))
}

pub async fn submit_contribution_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<SubmitContributionRequest>,
) -> ApiResult<(StatusCode, Json<ContributionResponse>)> {
    let payment_method = payload.payment_method.parse::<PaymentMethod>()?;
    let contribution = state
        .contribution_service
        .submit(
            &identity,
            SubmitContributionInput {
                member_id: payload.member_id,
                amount: payload.amount,
                payment_method,
                date: payload.date.unwrap_or_else(Utc::now),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContributionResponse::from(contribution)),
    ))
}

pub async fn review_contribution_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(contribution_id): Path<uuid::Uuid>,
    Json(payload): Json<ReviewContributionRequest>,
) -> ApiResult<Json<ContributionResponse>> {
    let decision = payload.decision.parse::<ContributionDecision>()?;
    let contribution = state
        .contribution_service
        .review(&identity, ContributionId::from_uuid(contribution_id), decision)
        .await?;

    Ok(Json(ContributionResponse::from(contribution)))
}

#[cfg(test)]
mod tests;

use axum::Json;
use axum::extract::{Extension, State};
use coopra_core::UserIdentity;

use crate::dto::{FinancialSummaryResponse, MemberActivityReportResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn financial_report_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<FinancialSummaryResponse>> {
    let summary = state.reporting_service.financial_summary(&identity).await?;

    Ok(Json(FinancialSummaryResponse::from(summary)))
}

pub async fn member_report_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<MemberActivityReportResponse>> {
    let report = state
        .reporting_service
        .member_activity_report(&identity)
        .await?;

    Ok(Json(MemberActivityReportResponse::from(report)))
}

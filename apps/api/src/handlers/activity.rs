use axum::Json;
use axum::extract::{Extension, Query, State};
use coopra_core::UserIdentity;
use serde::Deserialize;

use crate::dto::ActivityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

pub async fn recent_activity_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityResponse>>> {
    let entries = state
        .reporting_service
        .recent_activity(&identity, query.limit)
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();

    Ok(Json(entries))
}

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use coopra_application::CreateCooperativeInput;
use coopra_core::{AppError, Principal, TenantId};
use tower_sessions::Session;

use crate::auth::SESSION_PRINCIPAL_KEY;
use crate::dto::{CooperativeResponse, CreateCooperativeRequest, JoinCooperativeRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_cooperative_handler(
    State(state): State<AppState>,
    session: Session,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateCooperativeRequest>,
) -> ApiResult<(StatusCode, Json<CooperativeResponse>)> {
    let cooperative = state
        .enrollment_service
        .create_cooperative(
            &principal,
            CreateCooperativeInput {
                name: payload.name,
                description: payload.description,
                location: payload.location,
                contact_email: payload.contact_email,
                contact_phone: payload.contact_phone,
            },
        )
        .await?;

    attach_session_tenant(&session, &principal, cooperative.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CooperativeResponse::from(cooperative)),
    ))
}

pub async fn join_cooperative_handler(
    State(state): State<AppState>,
    session: Session,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<JoinCooperativeRequest>,
) -> ApiResult<Json<CooperativeResponse>> {
    let cooperative = state
        .enrollment_service
        .join_cooperative(&principal, &payload.join_code)
        .await?;

    attach_session_tenant(&session, &principal, cooperative.id).await?;

    Ok(Json(CooperativeResponse::from(cooperative)))
}

/// Rewrites the session principal with its new cooperative scope, so the
/// caller is tenant-scoped from the next request onward.
async fn attach_session_tenant(
    session: &Session,
    principal: &Principal,
    tenant_id: TenantId,
) -> Result<(), AppError> {
    session
        .insert(SESSION_PRINCIPAL_KEY, &principal.with_tenant(tenant_id))
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session principal: {error}"))
        })
}

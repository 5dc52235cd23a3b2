use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use coopra_core::{AppError, Principal};
use tower_sessions::Session;

use crate::dto::{CooperativeResponse, PrincipalResponse, SessionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_PRINCIPAL_KEY: &str = "principal";

/// Establishes a session for a subject holding the bootstrap token.
///
/// The identity provider integration lives outside this service; callers
/// present the shared bootstrap token together with the provider's subject
/// claim. Any cooperative already attached to the subject is resolved here so
/// the session starts tenant-scoped.
pub async fn session_login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SessionRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let subject = payload.subject.trim().to_owned();
    if subject.is_empty() {
        return Err(AppError::Validation("subject is required".to_owned()).into());
    }

    let tenant_id = state.enrollment_service.tenant_for_subject(&subject).await?;

    let display_name = payload
        .display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| subject.clone());
    let principal = Principal::new(subject, display_name, payload.email, tenant_id);

    // A fresh id on login prevents session fixation.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_PRINCIPAL_KEY, &principal)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session principal: {error}"))
        })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<PrincipalResponse>> {
    let cooperative = if principal.tenant_id().is_some() {
        let cooperative = state.enrollment_service.cooperative_for(&principal).await?;
        Some(CooperativeResponse::from(cooperative))
    } else {
        None
    };

    Ok(Json(PrincipalResponse::from_principal(
        &principal,
        cooperative,
    )))
}

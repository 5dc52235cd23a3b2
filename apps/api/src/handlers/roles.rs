use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use coopra_core::UserIdentity;
use coopra_domain::RoleId;

use crate::dto::{RoleResponse, SaveRoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_admin_service
        .list_roles(&identity)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_admin_service
        .create_role(&identity, payload.name, payload.permissions)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(role_id): Path<uuid::Uuid>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .update_role(
            &identity,
            RoleId::from_uuid(role_id),
            payload.name,
            payload.permissions,
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(role_id): Path<uuid::Uuid>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_role(&identity, RoleId::from_uuid(role_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

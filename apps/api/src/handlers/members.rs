use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use coopra_application::{AddMemberInput, UpdateMemberInput};
use coopra_core::UserIdentity;
use coopra_domain::{MemberId, MemberRole, MemberStatus};

use crate::dto::{CreateMemberRequest, MemberResponse, UpdateMemberRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_members_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let members = state
        .member_service
        .list_members(&identity)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn create_member_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let role = payload.role.parse::<MemberRole>()?;
    let member = state
        .member_service
        .add_member(
            &identity,
            AddMemberInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                role,
                contribution_plan: payload.contribution_plan,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

pub async fn get_member_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(member_id): Path<uuid::Uuid>,
) -> ApiResult<Json<MemberResponse>> {
    let member = state
        .member_service
        .get_member(&identity, MemberId::from_uuid(member_id))
        .await?;

    Ok(Json(MemberResponse::from(member)))
}

pub async fn update_member_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(member_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let role = payload.role.parse::<MemberRole>()?;
    let status = payload.status.parse::<MemberStatus>()?;
    let member = state
        .member_service
        .update_member(
            &identity,
            MemberId::from_uuid(member_id),
            UpdateMemberInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                role,
                status,
                contribution_plan: payload.contribution_plan,
            },
        )
        .await?;

    Ok(Json(MemberResponse::from(member)))
}

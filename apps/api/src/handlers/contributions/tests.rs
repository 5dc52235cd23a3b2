use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use coopra_core::{AppError, UserIdentity};

use crate::dto::{
    ContributionResponse, CreateMemberRequest, ReviewContributionRequest,
    SubmitContributionRequest,
};
use crate::handlers::members::{create_member_handler, get_member_handler};
use crate::state::AppState;
use crate::test_support::{app_state, identity};

use super::{
    ContributionListQuery, list_contributions_handler, review_contribution_handler,
    submit_contribution_handler,
};

async fn seed_member(state: &AppState, identity: &UserIdentity) -> uuid::Uuid {
    let result = create_member_handler(
        State(state.clone()),
        Extension(identity.clone()),
        Json(CreateMemberRequest {
            name: "Ada Obi".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "+2348012345678".to_owned(),
            role: "member".to_owned(),
            contribution_plan: 100.0,
        }),
    )
    .await;

    match result {
        Ok((_, Json(member))) => member.id.as_uuid(),
        Err(error) => panic!("member should be created: {}", error.0),
    }
}

async fn submit(
    state: &AppState,
    identity: &UserIdentity,
    member_id: uuid::Uuid,
    amount: f64,
) -> ContributionResponse {
    let result = submit_contribution_handler(
        State(state.clone()),
        Extension(identity.clone()),
        Json(SubmitContributionRequest {
            member_id: coopra_domain::MemberId::from_uuid(member_id),
            amount,
            payment_method: "cash".to_owned(),
            date: None,
        }),
    )
    .await;

    match result {
        Ok((status, Json(contribution))) => {
            assert_eq!(status, StatusCode::CREATED);
            contribution
        }
        Err(error) => panic!("contribution should be submitted: {}", error.0),
    }
}

#[tokio::test]
async fn approved_contribution_credits_the_member_ledger() {
    let state = app_state();
    let identity = identity();
    let member_id = seed_member(&state, &identity).await;

    let contribution = submit(&state, &identity, member_id, 250.0).await;
    assert_eq!(contribution.status, "pending");

    let reviewed = review_contribution_handler(
        State(state.clone()),
        Extension(identity.clone()),
        Path(contribution.id.as_uuid()),
        Json(ReviewContributionRequest {
            decision: "approved".to_owned(),
        }),
    )
    .await;
    assert_eq!(
        reviewed.map(|Json(contribution)| contribution.status).ok(),
        Some("approved".to_owned())
    );

    let member = get_member_handler(State(state), Extension(identity), Path(member_id)).await;
    assert_eq!(
        member.map(|Json(member)| member.total_contributions).ok(),
        Some(250.0)
    );
}

#[tokio::test]
async fn unknown_payment_method_is_a_validation_error() {
    let state = app_state();
    let identity = identity();
    let member_id = seed_member(&state, &identity).await;

    let result = submit_contribution_handler(
        State(state),
        Extension(identity),
        Json(SubmitContributionRequest {
            member_id: coopra_domain::MemberId::from_uuid(member_id),
            amount: 250.0,
            payment_method: "barter".to_owned(),
            date: None,
        }),
    )
    .await;
    assert!(matches!(
        result.map(|_| ()),
        Err(error) if matches!(error.0, AppError::Validation(_))
    ));
}

#[tokio::test]
async fn status_filter_narrows_the_list() {
    let state = app_state();
    let identity = identity();
    let member_id = seed_member(&state, &identity).await;

    let first = submit(&state, &identity, member_id, 100.0).await;
    submit(&state, &identity, member_id, 200.0).await;

    let reviewed = review_contribution_handler(
        State(state.clone()),
        Extension(identity.clone()),
        Path(first.id.as_uuid()),
        Json(ReviewContributionRequest {
            decision: "rejected".to_owned(),
        }),
    )
    .await;
    assert!(reviewed.is_ok());

    let pending = list_contributions_handler(
        State(state),
        Extension(identity),
        Query(ContributionListQuery {
            status: Some("pending".to_owned()),
        }),
    )
    .await;
    assert_eq!(
        pending.map(|Json(contributions)| contributions.len()).ok(),
        Some(1)
    );
}

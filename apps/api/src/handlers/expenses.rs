use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use chrono::Utc;
use coopra_application::RecordExpenseInput;
use coopra_core::UserIdentity;
use coopra_domain::ExpenseCategory;

use crate::dto::{ExpenseResponse, RecordExpenseRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_expenses_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ExpenseResponse>>> {
    let expenses = state
        .expense_service
        .list(&identity)
        .await?
        .into_iter()
        .map(ExpenseResponse::from)
        .collect();

    Ok(Json(expenses))
}

pub async fn record_expense_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<RecordExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseResponse>)> {
    let category = payload.category.parse::<ExpenseCategory>()?;
    let expense = state
        .expense_service
        .record(
            &identity,
            RecordExpenseInput {
                category,
                amount: payload.amount,
                date: payload.date.unwrap_or_else(Utc::now),
                description: payload.description,
                created_by: payload.created_by,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(expense))))
}

//! Coopra API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post, put};
use coopra_application::{
    ContributionService, EnrollmentService, ExpenseService, LoanService, MemberService,
    ReportingService, RoleAdminService,
};
use coopra_core::AppError;
use coopra_infrastructure::{
    PostgresActivityRepository, PostgresContributionRepository, PostgresCooperativeRepository,
    PostgresExpenseRepository, PostgresLoanRepository, PostgresMemberRepository,
    PostgresRoleRepository, PostgresSubjectDirectory,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let cooperatives = Arc::new(PostgresCooperativeRepository::new(pool.clone()));
    let subjects = Arc::new(PostgresSubjectDirectory::new(pool.clone()));
    let members = Arc::new(PostgresMemberRepository::new(pool.clone()));
    let contributions = Arc::new(PostgresContributionRepository::new(pool.clone()));
    let loans = Arc::new(PostgresLoanRepository::new(pool.clone()));
    let expenses = Arc::new(PostgresExpenseRepository::new(pool.clone()));
    let activities = Arc::new(PostgresActivityRepository::new(pool.clone()));
    let roles = Arc::new(PostgresRoleRepository::new(pool));

    let policy = config.lending_policy;
    let app_state = AppState {
        enrollment_service: EnrollmentService::new(cooperatives, subjects),
        member_service: MemberService::new(members.clone()),
        contribution_service: ContributionService::new(
            contributions.clone(),
            members.clone(),
            activities.clone(),
            policy,
        ),
        loan_service: LoanService::new(loans.clone(), members.clone(), activities.clone(), policy),
        expense_service: ExpenseService::new(expenses.clone(), members.clone(), activities.clone()),
        role_admin_service: RoleAdminService::new(roles, members.clone()),
        reporting_service: ReportingService::new(
            contributions,
            expenses,
            loans,
            members,
            activities,
        ),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    };

    let tenant_routes = Router::new()
        .route(
            "/api/members",
            get(handlers::members::list_members_handler)
                .post(handlers::members::create_member_handler),
        )
        .route(
            "/api/members/{member_id}",
            get(handlers::members::get_member_handler)
                .put(handlers::members::update_member_handler),
        )
        .route(
            "/api/contributions",
            get(handlers::contributions::list_contributions_handler)
                .post(handlers::contributions::submit_contribution_handler),
        )
        .route(
            "/api/contributions/{contribution_id}",
            patch(handlers::contributions::review_contribution_handler),
        )
        .route(
            "/api/loans",
            get(handlers::loans::list_loans_handler).post(handlers::loans::apply_loan_handler),
        )
        .route(
            "/api/loans/{loan_id}",
            patch(handlers::loans::decide_loan_handler),
        )
        .route(
            "/api/loans/{loan_id}/repayment",
            post(handlers::loans::record_repayment_handler),
        )
        .route(
            "/api/loans/{loan_id}/default",
            post(handlers::loans::mark_defaulted_handler),
        )
        .route(
            "/api/expenses",
            get(handlers::expenses::list_expenses_handler)
                .post(handlers::expenses::record_expense_handler),
        )
        .route(
            "/api/activity/recent",
            get(handlers::activity::recent_activity_handler),
        )
        .route(
            "/api/reports/financial",
            get(handlers::reports::financial_report_handler),
        )
        .route(
            "/api/reports/members",
            get(handlers::reports::member_report_handler),
        )
        .route(
            "/api/settings/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/settings/roles/{role_id}",
            put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route_layer(from_fn(middleware::require_tenant));

    let authenticated_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/cooperatives",
            post(handlers::cooperatives::create_cooperative_handler),
        )
        .route(
            "/api/cooperatives/join",
            post(handlers::cooperatives::join_cooperative_handler),
        )
        .merge(tenant_routes)
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::session_login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(authenticated_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "coopra-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

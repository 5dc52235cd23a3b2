//! Shared fixtures for handler tests: a full [`AppState`] wired to a single
//! in-memory store, so handlers exercise the same service graph as the
//! composition root.

use std::sync::Arc;

use coopra_application::{
    ContributionService, EnrollmentService, ExpenseService, LoanService, MemberService,
    ReportingService, RoleAdminService,
};
use coopra_core::{TenantId, UserIdentity};
use coopra_domain::LendingPolicy;
use coopra_infrastructure::InMemoryStore;

use crate::state::AppState;

pub fn app_state() -> AppState {
    let store = Arc::new(InMemoryStore::new());
    let policy = LendingPolicy::default();

    AppState {
        enrollment_service: EnrollmentService::new(store.clone(), store.clone()),
        member_service: MemberService::new(store.clone()),
        contribution_service: ContributionService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            policy,
        ),
        loan_service: LoanService::new(store.clone(), store.clone(), store.clone(), policy),
        expense_service: ExpenseService::new(store.clone(), store.clone(), store.clone()),
        role_admin_service: RoleAdminService::new(store.clone(), store.clone()),
        reporting_service: ReportingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        ),
        frontend_url: "http://localhost:3000".to_owned(),
        bootstrap_token: "an-integration-test-bootstrap-token".to_owned(),
    }
}

pub fn identity() -> UserIdentity {
    UserIdentity::new("auth0|ada", "Ada Obi", None, TenantId::new())
}

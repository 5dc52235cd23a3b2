use coopra_application::{
    ContributionService, EnrollmentService, ExpenseService, LoanService, MemberService,
    ReportingService, RoleAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub enrollment_service: EnrollmentService,
    pub member_service: MemberService,
    pub contribution_service: ContributionService,
    pub loan_service: LoanService,
    pub expense_service: ExpenseService,
    pub role_admin_service: RoleAdminService,
    pub reporting_service: ReportingService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}

//! Application services and ports for the cooperative management backend.
//!
//! Services hold their dependencies as `Arc<dyn Trait>` ports and carry no
//! storage logic of their own; every port method is scoped by the caller's
//! tenant, resolved once at the HTTP boundary.

#![forbid(unsafe_code)]

mod contribution_service;
mod enrollment_service;
mod expense_service;
mod ledger_ports;
mod loan_service;
mod member_service;
mod reporting_service;
mod role_admin_service;
mod role_ports;
mod tenancy_ports;

#[cfg(test)]
mod test_support;

pub use contribution_service::{ContributionService, SubmitContributionInput};
pub use enrollment_service::{CreateCooperativeInput, EnrollmentService, JOIN_CODE_ATTEMPTS};
pub use expense_service::{ExpenseService, RecordExpenseInput};
pub use ledger_ports::{
    ActivityRepository, CategoryTotal, ContributionRepository, ExpenseRepository, LoanRepository,
    MemberActivityStats, MemberLoanStats, MemberRepository, MonthlyTotal,
};
pub use loan_service::{LoanApplicationInput, LoanDecisionInput, LoanService};
pub use member_service::{AddMemberInput, MemberService, UpdateMemberInput};
pub use reporting_service::{
    CategoryBreakdown, DEFAULT_ACTIVITY_LIMIT, FinancialSummary, MemberActivityReport,
    MemberRepaymentRate, MemberReportRow, MemberReportSummary, MonthlyBreakdown,
    REPORT_WINDOW_MONTHS, ReportingService,
};
pub use role_admin_service::{RoleAdminService, RoleWithUsage};
pub use role_ports::RoleRepository;
pub use tenancy_ports::{CooperativeRepository, SubjectDirectory};

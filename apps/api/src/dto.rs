mod common;
mod enrollment;
mod ledger;
mod reports;

pub use common::{HealthResponse, PrincipalResponse, SessionRequest};
pub use enrollment::{CooperativeResponse, CreateCooperativeRequest, JoinCooperativeRequest};
pub use ledger::{
    ActivityResponse, ContributionResponse, CreateMemberRequest, ExpenseResponse,
    LoanApplicationRequest, LoanDecisionRequest, LoanResponse, MemberResponse,
    RecordExpenseRequest, RepaymentRequest, ReviewContributionRequest, RoleResponse,
    SaveRoleRequest, SubmitContributionRequest, UpdateMemberRequest,
};
pub use reports::{
    CategoryBreakdownResponse, FinancialSummaryResponse, MemberActivityReportResponse,
    MemberRepaymentRateResponse, MemberReportRowResponse, MemberReportSummaryResponse,
    MonthlyBreakdownResponse,
};

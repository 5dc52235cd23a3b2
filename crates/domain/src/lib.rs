//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod activity;
mod contribution;
mod email;
mod expense;
mod loan;
mod member;
mod policy;
mod role;
mod tenant;

pub use activity::{Activity, ActivityId, ActivityKind};
pub use contribution::{
    Contribution, ContributionDecision, ContributionId, ContributionStatus, PaymentMethod,
};
pub use email::EmailAddress;
pub use expense::{Expense, ExpenseCategory, ExpenseId};
pub use loan::{
    DEFAULT_INTEREST_RATE, LOAN_TERM_MONTHS, Loan, LoanDecision, LoanId, LoanStatus,
};
pub use member::{Member, MemberId, MemberRole, MemberStatus};
pub use policy::LendingPolicy;
pub use role::{Role, RoleId};
pub use tenant::{Cooperative, JOIN_CODE_SUFFIX_LENGTH, JoinCode};

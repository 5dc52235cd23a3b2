use serde::{Deserialize, Serialize};

/// Configurable guards around the review workflows.
///
/// The observed production behavior is permissive on all three counts, so
/// every switch defaults to off; deployments that want stricter semantics
/// opt in per guard rather than changing the workflow code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingPolicy {
    /// Reject a second review of an already-decided contribution or loan.
    /// Off by default: re-reviewing an approved contribution double-credits
    /// the member ledger.
    pub reject_double_review: bool,
    /// Require the approved amount to not exceed the requested amount.
    pub cap_approved_amount: bool,
    /// Require repayments to not exceed the outstanding balance.
    pub cap_repayment: bool,
}

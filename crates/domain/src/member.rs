//! Member entity and the denormalized contribution ledger total.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::email::EmailAddress;

/// Unique identifier for a member record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Creates a new random member identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a member identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MemberId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role assigned to a member within its cooperative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Regular contributing member.
    Member,
    /// Administrator with review and settings access.
    Admin,
}

impl MemberRole {
    /// Returns the storage string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for MemberRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "unknown member role '{value}'"
            ))),
        }
    }
}

/// Membership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Member participates in workflows.
    Active,
    /// Member is retained for history but inactive.
    Inactive,
}

impl MemberStatus {
    /// Returns the storage string for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown member status '{value}'"
            ))),
        }
    }
}

/// A cooperative member.
///
/// `total_contributions` is denormalized: it must equal the sum of all
/// approved contribution amounts for the member and is only ever changed by
/// an atomic store-level increment during contribution approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Member identifier.
    pub id: MemberId,
    /// Owning cooperative.
    pub tenant_id: TenantId,
    /// Full name.
    pub name: String,
    /// Globally unique email.
    pub email: EmailAddress,
    /// Contact phone.
    pub phone: String,
    /// Assigned role.
    pub role: MemberRole,
    /// Membership status.
    pub status: MemberStatus,
    /// Date the member joined.
    pub join_date: DateTime<Utc>,
    /// Expected periodic contribution amount.
    pub contribution_plan: f64,
    /// Running total of approved contributions.
    pub total_contributions: f64,
}

impl Member {
    /// Creates an active member with a zeroed ledger total.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        role: MemberRole,
        contribution_plan: f64,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = name.into().trim().to_owned();
        let phone = phone.into().trim().to_owned();

        if name.is_empty() || phone.is_empty() {
            return Err(AppError::Validation(
                "member name and phone are required".to_owned(),
            ));
        }

        if contribution_plan < 0.0 {
            return Err(AppError::Validation(
                "contribution plan must not be negative".to_owned(),
            ));
        }

        Ok(Self {
            id: MemberId::new(),
            tenant_id,
            name,
            email: EmailAddress::new(email)?,
            phone,
            role,
            status: MemberStatus::Active,
            join_date: now,
            contribution_plan,
            total_contributions: 0.0,
        })
    }
}

//! Member registry: registration, listing and profile updates.

use std::sync::Arc;

use chrono::Utc;
use coopra_core::{AppError, AppResult, UserIdentity};
use coopra_domain::{EmailAddress, Member, MemberId, MemberRole, MemberStatus};

use crate::ledger_ports::MemberRepository;

/// Fields required to register a member.
#[derive(Debug, Clone)]
pub struct AddMemberInput {
    /// Full name.
    pub name: String,
    /// Contact email, unique per cooperative.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Assigned role.
    pub role: MemberRole,
    /// Expected periodic contribution amount.
    pub contribution_plan: f64,
}

/// Profile fields that may be changed after registration.
///
/// The ledger total is deliberately absent; it only moves through the atomic
/// credit during contribution approval.
#[derive(Debug, Clone)]
pub struct UpdateMemberInput {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Assigned role.
    pub role: MemberRole,
    /// Membership status.
    pub status: MemberStatus,
    /// Expected periodic contribution amount.
    pub contribution_plan: f64,
}

/// Application service for the member registry.
#[derive(Clone)]
pub struct MemberService {
    members: Arc<dyn MemberRepository>,
}

impl MemberService {
    /// Creates a member service from its repository.
    #[must_use]
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    /// Registers a new active member.
    pub async fn add_member(
        &self,
        identity: &UserIdentity,
        input: AddMemberInput,
    ) -> AppResult<Member> {
        let member = Member::new(
            identity.tenant_id(),
            input.name,
            input.email,
            input.phone,
            input.role,
            input.contribution_plan,
            Utc::now(),
        )?;

        self.members
            .insert(identity.tenant_id(), member.clone())
            .await?;

        Ok(member)
    }

    /// Lists the cooperative's members.
    pub async fn list_members(&self, identity: &UserIdentity) -> AppResult<Vec<Member>> {
        self.members.list(identity.tenant_id()).await
    }

    /// Returns one member of the cooperative.
    pub async fn get_member(
        &self,
        identity: &UserIdentity,
        member_id: MemberId,
    ) -> AppResult<Member> {
        self.members
            .find(identity.tenant_id(), member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' not found")))
    }

    /// Replaces a member's profile fields.
    pub async fn update_member(
        &self,
        identity: &UserIdentity,
        member_id: MemberId,
        input: UpdateMemberInput,
    ) -> AppResult<Member> {
        let mut member = self.get_member(identity, member_id).await?;

        let name = input.name.trim().to_owned();
        let phone = input.phone.trim().to_owned();
        if name.is_empty() || phone.is_empty() {
            return Err(AppError::Validation(
                "member name and phone are required".to_owned(),
            ));
        }

        if input.contribution_plan < 0.0 {
            return Err(AppError::Validation(
                "contribution plan must not be negative".to_owned(),
            ));
        }

        member.name = name;
        member.email = EmailAddress::new(input.email)?;
        member.phone = phone;
        member.role = input.role;
        member.status = input.status;
        member.contribution_plan = input.contribution_plan;

        self.members
            .update(identity.tenant_id(), member.clone())
            .await?;

        Ok(member)
    }
}

#[cfg(test)]
mod tests;

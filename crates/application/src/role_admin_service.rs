//! Role administration: named permission sets per cooperative.

use std::sync::Arc;

use chrono::Utc;
use coopra_core::{AppError, AppResult, UserIdentity};
use coopra_domain::{Role, RoleId};

use crate::ledger_ports::MemberRepository;
use crate::role_ports::RoleRepository;

/// A role together with the number of members carrying its name.
#[derive(Debug, Clone)]
pub struct RoleWithUsage {
    /// The role record.
    pub role: Role,
    /// Members whose role field equals this role's name.
    pub member_count: i64,
}

/// Application service for role administration.
#[derive(Clone)]
pub struct RoleAdminService {
    roles: Arc<dyn RoleRepository>,
    members: Arc<dyn MemberRepository>,
}

impl RoleAdminService {
    /// Creates a role administration service from its repositories.
    #[must_use]
    pub fn new(roles: Arc<dyn RoleRepository>, members: Arc<dyn MemberRepository>) -> Self {
        Self { roles, members }
    }

    /// Lists roles with the number of members carrying each.
    pub async fn list_roles(&self, identity: &UserIdentity) -> AppResult<Vec<RoleWithUsage>> {
        let tenant_id = identity.tenant_id();
        let roles = self.roles.list(tenant_id).await?;

        let mut listed = Vec::with_capacity(roles.len());
        for role in roles {
            let member_count = self.members.count_with_role(tenant_id, &role.name).await?;
            listed.push(RoleWithUsage { role, member_count });
        }

        Ok(listed)
    }

    /// Creates a role. Duplicate names within the cooperative are a conflict.
    pub async fn create_role(
        &self,
        identity: &UserIdentity,
        name: String,
        permissions: Vec<String>,
    ) -> AppResult<Role> {
        let role = Role::new(identity.tenant_id(), name, permissions, Utc::now())?;
        self.roles.insert(identity.tenant_id(), role.clone()).await?;
        Ok(role)
    }

    /// Replaces a role's name and permission tags.
    pub async fn update_role(
        &self,
        identity: &UserIdentity,
        role_id: RoleId,
        name: String,
        permissions: Vec<String>,
    ) -> AppResult<Role> {
        let tenant_id = identity.tenant_id();

        let mut role = self
            .roles
            .find(tenant_id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))?;

        role.rename(name, permissions)?;
        self.roles.update(tenant_id, role.clone()).await?;

        Ok(role)
    }

    /// Deletes a role, unless members still carry its name.
    pub async fn delete_role(&self, identity: &UserIdentity, role_id: RoleId) -> AppResult<()> {
        let tenant_id = identity.tenant_id();

        let role = self
            .roles
            .find(tenant_id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))?;

        if self.members.count_with_role(tenant_id, &role.name).await? > 0 {
            return Err(AppError::Conflict(
                "cannot delete a role that is assigned to members".to_owned(),
            ));
        }

        self.roles.delete(tenant_id, role_id).await
    }
}

//! Port for tenant-scoped role records.

use async_trait::async_trait;
use coopra_core::{AppResult, TenantId};
use coopra_domain::{Role, RoleId};

/// Port for capability-tag roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Persists a new role. Duplicate names within the cooperative surface
    /// as `Conflict`.
    async fn insert(&self, tenant_id: TenantId, role: Role) -> AppResult<()>;

    /// Finds a role within the cooperative.
    async fn find(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists the cooperative's roles, newest first.
    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Role>>;

    /// Replaces a role's name and permission tags.
    async fn update(&self, tenant_id: TenantId, role: Role) -> AppResult<()>;

    /// Deletes a role.
    async fn delete(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()>;
}

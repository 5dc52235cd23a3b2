//! Tenant-scoped roles carrying capability tags.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
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

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A named permission set. Permissions are free-form capability tags;
/// deletion is blocked while any member still carries the role name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub id: RoleId,
    /// Owning cooperative.
    pub tenant_id: TenantId,
    /// Role name, unique within the cooperative.
    pub name: String,
    /// Capability tags granted by the role.
    pub permissions: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Creates a role after validating its name and tags.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        permissions: Vec<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        let permissions = normalize_permissions(permissions)?;

        Ok(Self {
            id: RoleId::new(),
            tenant_id,
            name,
            permissions,
            created_at: now,
        })
    }

    /// Replaces the role's name and capability tags.
    pub fn rename(&mut self, name: impl Into<String>, permissions: Vec<String>) -> AppResult<()> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        self.name = name;
        self.permissions = normalize_permissions(permissions)?;
        Ok(())
    }
}

/// Trims capability tags and rejects blank entries.
pub(crate) fn normalize_permissions(permissions: Vec<String>) -> AppResult<Vec<String>> {
    let mut normalized = Vec::with_capacity(permissions.len());
    for tag in permissions {
        let tag = tag.trim().to_owned();
        if tag.is_empty() {
            return Err(AppError::Validation(
                "permission tags must not be empty".to_owned(),
            ));
        }
        normalized.push(tag);
    }

    Ok(normalized)
}

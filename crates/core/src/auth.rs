use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, TenantId};

/// Authenticated caller persisted in the session.
///
/// A principal may exist before it is attached to a cooperative; callers that
/// need a cooperative scope must go through [`Principal::require_tenant`],
/// which is the only path from a principal to a [`UserIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
    display_name: String,
    email: Option<String>,
    tenant_id: Option<TenantId>,
}

impl Principal {
    /// Creates a principal from authentication data and an optional tenant.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        tenant_id: Option<TenantId>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            tenant_id,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the attached cooperative, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Returns a copy of this principal attached to the given cooperative.
    #[must_use]
    pub fn with_tenant(&self, tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ..self.clone()
        }
    }

    /// Resolves the cooperative scope or fails with [`AppError::NoTenant`].
    pub fn require_tenant(&self) -> AppResult<UserIdentity> {
        let tenant_id = self.tenant_id.ok_or(AppError::NoTenant)?;

        Ok(UserIdentity {
            subject: self.subject.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            tenant_id,
        })
    }
}

/// Caller identity with a resolved cooperative scope.
///
/// Every tenant-scoped service operation takes this type, so an unscoped
/// caller cannot reach them by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
    tenant_id: TenantId,
}

impl UserIdentity {
    /// Creates a user identity from authentication and tenancy data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        tenant_id: TenantId,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            tenant_id,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the cooperative linked to the identity.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

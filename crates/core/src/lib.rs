//! Shared primitives for all Rust crates in Coopra.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::{Principal, UserIdentity};

/// Result type used across Coopra crates.
pub type AppResult<T> = Result<T, AppError>;

/// Cooperative identifier used as the partition key for every persisted
/// resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Creates a random tenant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a tenant identifier from an existing UUID value.
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

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TenantId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist within the caller's cooperative.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Caller is authenticated but not attached to any cooperative yet.
    #[error("no cooperative: join or create a cooperative first")]
    NoTenant,

    /// Caller already manages a cooperative and cannot create another.
    #[error("conflict: account already manages a cooperative")]
    AlreadyManages,

    /// Caller already belongs to a cooperative and cannot join another.
    #[error("conflict: account already belongs to a cooperative")]
    AlreadyMember,

    /// Bounded join-code generation exhausted every attempt.
    #[error("failed to generate a unique join code, please retry")]
    JoinCodeExhausted,

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

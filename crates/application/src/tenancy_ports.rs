//! Ports for cooperative enrollment and subject-to-tenant mapping.

use async_trait::async_trait;
use coopra_core::{AppResult, TenantId};
use coopra_domain::{Cooperative, JoinCode};

/// Port for cooperative records.
///
/// Implementations must enforce the uniqueness invariants at the write
/// boundary: cooperative name, join code, and manager subject are each
/// globally unique. Violations surface as the conflict taxonomy, with the
/// manager constraint mapped to [`coopra_core::AppError::AlreadyManages`].
#[async_trait]
pub trait CooperativeRepository: Send + Sync {
    /// Persists a new cooperative.
    async fn insert(&self, cooperative: Cooperative) -> AppResult<()>;

    /// Finds a cooperative by tenant identifier.
    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<Cooperative>>;

    /// Finds a cooperative by its canonical join code.
    async fn find_by_join_code(&self, join_code: &JoinCode) -> AppResult<Option<Cooperative>>;

    /// Finds the cooperative managed by a subject, if any.
    async fn find_by_manager(&self, subject: &str) -> AppResult<Option<Cooperative>>;

    /// Returns whether a join code is already taken.
    async fn join_code_exists(&self, join_code: &JoinCode) -> AppResult<bool>;
}

/// Port mapping authenticated subjects to their single cooperative.
#[async_trait]
pub trait SubjectDirectory: Send + Sync {
    /// Returns the cooperative a subject belongs to, if any.
    async fn tenant_for_subject(&self, subject: &str) -> AppResult<Option<TenantId>>;

    /// Attaches a subject to a cooperative.
    ///
    /// Fails with [`coopra_core::AppError::AlreadyMember`] when the subject
    /// is already attached somewhere.
    async fn attach_subject(&self, tenant_id: TenantId, subject: &str) -> AppResult<()>;
}

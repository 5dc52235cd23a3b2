//! PostgreSQL-backed subject-to-cooperative directory.

use async_trait::async_trait;
use sqlx::PgPool;

use coopra_application::SubjectDirectory;
use coopra_core::{AppError, AppResult, TenantId};

/// PostgreSQL implementation of the subject directory port.
#[derive(Clone)]
pub struct PostgresSubjectDirectory {
    pool: PgPool,
}

impl PostgresSubjectDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectDirectory for PostgresSubjectDirectory {
    async fn tenant_for_subject(&self, subject: &str) -> AppResult<Option<TenantId>> {
        let tenant_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT tenant_id
            FROM subject_memberships
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve subject membership: {error}"))
        })?;

        Ok(tenant_id.map(TenantId::from_uuid))
    }

    async fn attach_subject(&self, tenant_id: TenantId, subject: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subject_memberships (subject, tenant_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(subject)
        .bind(tenant_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_membership_conflict)?;

        Ok(())
    }
}

fn map_membership_conflict(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::AlreadyMember;
    }

    AppError::Internal(format!("failed to attach subject: {error}"))
}

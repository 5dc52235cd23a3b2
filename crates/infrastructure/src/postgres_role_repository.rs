//! PostgreSQL-backed role repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coopra_application::RoleRepository;
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{Role, RoleId};

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    name: String,
    permissions: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let permissions: Vec<String> =
            serde_json::from_value(row.permissions).map_err(|error| {
                AppError::Internal(format!("malformed stored permission tags: {error}"))
            })?;

        Ok(Self {
            id: RoleId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            name: row.name,
            permissions,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn insert(&self, tenant_id: TenantId, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, tenant_id, name, permissions, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&role.name)
        .bind(serde_json::Value::from(role.permissions.clone()))
        .bind(role.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, &role.name))?;

        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, tenant_id, name, permissions, created_at
            FROM roles
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, tenant_id, name, permissions, created_at
            FROM roles
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn update(&self, tenant_id: TenantId, role: Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $3, permissions = $4
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role.id.as_uuid())
        .bind(&role.name)
        .bind(serde_json::Value::from(role.permissions.clone()))
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, &role.name))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{}' not found", role.id)));
        }

        Ok(())
    }

    async fn delete(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' not found")));
        }

        Ok(())
    }
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("a role named '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to persist role: {error}"))
}

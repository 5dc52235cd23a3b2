//! PostgreSQL-backed cooperative repository.

use async_trait::async_trait;
use sqlx::PgPool;

use coopra_application::CooperativeRepository;
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{Cooperative, EmailAddress, JoinCode};

/// PostgreSQL implementation of the cooperative repository port.
#[derive(Clone)]
pub struct PostgresCooperativeRepository {
    pool: PgPool,
}

impl PostgresCooperativeRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CooperativeRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    location: String,
    contact_email: String,
    contact_phone: String,
    manager_subject: String,
    join_code: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<CooperativeRow> for Cooperative {
    type Error = AppError;

    fn try_from(row: CooperativeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TenantId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            location: row.location,
            contact_email: EmailAddress::new(row.contact_email)?,
            contact_phone: row.contact_phone,
            manager_subject: row.manager_subject,
            join_code: JoinCode::parse(&row.join_code)?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const COOPERATIVE_COLUMNS: &str = "id, name, description, location, contact_email, \
     contact_phone, manager_subject, join_code, is_active, created_at";

#[async_trait]
impl CooperativeRepository for PostgresCooperativeRepository {
    async fn insert(&self, cooperative: Cooperative) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cooperatives (
                id, name, description, location, contact_email,
                contact_phone, manager_subject, join_code, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(cooperative.id.as_uuid())
        .bind(&cooperative.name)
        .bind(&cooperative.description)
        .bind(&cooperative.location)
        .bind(cooperative.contact_email.as_str())
        .bind(&cooperative.contact_phone)
        .bind(&cooperative.manager_subject)
        .bind(cooperative.join_code.as_str())
        .bind(cooperative.is_active)
        .bind(cooperative.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| map_cooperative_conflict(error, &cooperative.name))?;

        Ok(())
    }

    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<Cooperative>> {
        let row = sqlx::query_as::<_, CooperativeRow>(&format!(
            "SELECT {COOPERATIVE_COLUMNS} FROM cooperatives WHERE id = $1"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load cooperative: {error}")))?;

        row.map(Cooperative::try_from).transpose()
    }

    async fn find_by_join_code(&self, join_code: &JoinCode) -> AppResult<Option<Cooperative>> {
        let row = sqlx::query_as::<_, CooperativeRow>(&format!(
            "SELECT {COOPERATIVE_COLUMNS} FROM cooperatives WHERE join_code = $1"
        ))
        .bind(join_code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to look up join code: {error}"))
        })?;

        row.map(Cooperative::try_from).transpose()
    }

    async fn find_by_manager(&self, subject: &str) -> AppResult<Option<Cooperative>> {
        let row = sqlx::query_as::<_, CooperativeRow>(&format!(
            "SELECT {COOPERATIVE_COLUMNS} FROM cooperatives WHERE manager_subject = $1"
        ))
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to look up managed cooperative: {error}"))
        })?;

        row.map(Cooperative::try_from).transpose()
    }

    async fn join_code_exists(&self, join_code: &JoinCode) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM cooperatives WHERE join_code = $1)",
        )
        .bind(join_code.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check join code uniqueness: {error}"))
        })?;

        Ok(exists)
    }
}

fn map_cooperative_conflict(error: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        if database_error.constraint() == Some("cooperatives_manager_subject_key") {
            return AppError::AlreadyManages;
        }
        return AppError::Conflict(format!("a cooperative named '{name}' already exists"));
    }

    AppError::Internal(format!("failed to create cooperative: {error}"))
}

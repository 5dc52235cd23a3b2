//! PostgreSQL-backed member repository.

use async_trait::async_trait;
use sqlx::PgPool;

use coopra_application::MemberRepository;
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{EmailAddress, Member, MemberId, MemberRole, MemberStatus};

/// PostgreSQL implementation of the member repository port.
#[derive(Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    name: String,
    email: String,
    phone: String,
    role: String,
    status: String,
    join_date: chrono::DateTime<chrono::Utc>,
    contribution_plan: f64,
    total_contributions: f64,
}

impl TryFrom<MemberRow> for Member {
    type Error = AppError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MemberId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            name: row.name,
            email: EmailAddress::new(row.email)?,
            phone: row.phone,
            role: row.role.parse::<MemberRole>()?,
            status: row.status.parse::<MemberStatus>()?,
            join_date: row.join_date,
            contribution_plan: row.contribution_plan,
            total_contributions: row.total_contributions,
        })
    }
}

const MEMBER_COLUMNS: &str = "id, tenant_id, name, email, phone, role, status, \
     join_date, contribution_plan, total_contributions";

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn insert(&self, tenant_id: TenantId, member: Member) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, tenant_id, name, email, phone, role, status,
                join_date, contribution_plan, total_contributions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(member.id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&member.name)
        .bind(member.email.as_str())
        .bind(&member.phone)
        .bind(member.role.as_str())
        .bind(member.status.as_str())
        .bind(member.join_date)
        .bind(member.contribution_plan)
        .bind(member.total_contributions)
        .execute(&self.pool)
        .await
        .map_err(|error| map_email_conflict(error, member.email.as_str()))?;

        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, member_id: MemberId) -> AppResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load member: {error}")))?;

        row.map(Member::try_from).transpose()
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE tenant_id = $1 ORDER BY join_date DESC"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list members: {error}")))?;

        rows.into_iter().map(Member::try_from).collect()
    }

    async fn update(&self, tenant_id: TenantId, member: Member) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET name = $3, email = $4, phone = $5, role = $6, status = $7,
                contribution_plan = $8
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(member.id.as_uuid())
        .bind(&member.name)
        .bind(member.email.as_str())
        .bind(&member.phone)
        .bind(member.role.as_str())
        .bind(member.status.as_str())
        .bind(member.contribution_plan)
        .execute(&self.pool)
        .await
        .map_err(|error| map_email_conflict(error, member.email.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "member '{}' not found",
                member.id
            )));
        }

        Ok(())
    }

    async fn credit_contribution(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        amount: f64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET total_contributions = total_contributions + $3
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(member_id.as_uuid())
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to credit member ledger: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "member '{member_id}' not found"
            )));
        }

        Ok(())
    }

    async fn count_with_role(&self, tenant_id: TenantId, role_name: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM members WHERE tenant_id = $1 AND role = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(role_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count members by role: {error}"))
        })?;

        Ok(count)
    }
}

fn map_email_conflict(error: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("a member with email '{email}' already exists"));
    }

    AppError::Internal(format!("failed to persist member: {error}"))
}

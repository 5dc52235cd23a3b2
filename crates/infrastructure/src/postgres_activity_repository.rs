//! PostgreSQL-backed activity log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coopra_application::{ActivityRepository, MemberActivityStats};
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{Activity, ActivityId, ActivityKind, MemberId};

/// PostgreSQL implementation of the activity log port.
#[derive(Clone)]
pub struct PostgresActivityRepository {
    pool: PgPool,
}

impl PostgresActivityRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    kind: String,
    member_id: uuid::Uuid,
    amount: Option<f64>,
    description: String,
    date: DateTime<Utc>,
    status: Option<String>,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActivityId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            kind: row.kind.parse::<ActivityKind>()?,
            member_id: MemberId::from_uuid(row.member_id),
            amount: row.amount,
            description: row.description,
            date: row.date,
            status: row.status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityStatsRow {
    member_id: uuid::Uuid,
    last_activity: DateTime<Utc>,
    activity_count: i64,
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn append(&self, tenant_id: TenantId, activity: Activity) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activities (
                id, tenant_id, kind, member_id, amount, description, date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(activity.id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(activity.kind.as_str())
        .bind(activity.member_id.as_uuid())
        .bind(activity.amount)
        .bind(&activity.description)
        .bind(activity.date)
        .bind(activity.status.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append activity: {error}")))?;

        Ok(())
    }

    async fn recent(&self, tenant_id: TenantId, limit: usize) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, tenant_id, kind, member_id, amount, description, date, status
            FROM activities
            WHERE tenant_id = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list activities: {error}")))?;

        rows.into_iter().map(Activity::try_from).collect()
    }

    async fn stats_by_member(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<MemberActivityStats>> {
        let rows = sqlx::query_as::<_, ActivityStatsRow>(
            r#"
            SELECT member_id, MAX(date) AS last_activity, COUNT(*) AS activity_count
            FROM activities
            WHERE tenant_id = $1
            GROUP BY member_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to aggregate activity stats: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| MemberActivityStats {
                member_id: MemberId::from_uuid(row.member_id),
                last_activity: row.last_activity,
                activity_count: row.activity_count,
            })
            .collect())
    }
}

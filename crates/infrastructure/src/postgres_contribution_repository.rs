//! PostgreSQL-backed contribution repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coopra_application::{ContributionRepository, MonthlyTotal};
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{
    Contribution, ContributionId, ContributionStatus, MemberId, PaymentMethod,
};

use crate::monthly_rows::MonthlyTotalRow;

/// PostgreSQL implementation of the contribution repository port.
#[derive(Clone)]
pub struct PostgresContributionRepository {
    pool: PgPool,
}

impl PostgresContributionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContributionRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    member_id: uuid::Uuid,
    amount: f64,
    date: DateTime<Utc>,
    payment_method: String,
    status: String,
    reviewed_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContributionRow> for Contribution {
    type Error = AppError;

    fn try_from(row: ContributionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContributionId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            member_id: MemberId::from_uuid(row.member_id),
            amount: row.amount,
            date: row.date,
            payment_method: row.payment_method.parse::<PaymentMethod>()?,
            status: row.status.parse::<ContributionStatus>()?,
            reviewed_by: row.reviewed_by,
            created_at: row.created_at,
        })
    }
}

const CONTRIBUTION_COLUMNS: &str =
    "id, tenant_id, member_id, amount, date, payment_method, status, reviewed_by, created_at";

#[async_trait]
impl ContributionRepository for PostgresContributionRepository {
    async fn insert(&self, tenant_id: TenantId, contribution: Contribution) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contributions (
                id, tenant_id, member_id, amount, date,
                payment_method, status, reviewed_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(contribution.id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(contribution.member_id.as_uuid())
        .bind(contribution.amount)
        .bind(contribution.date)
        .bind(contribution.payment_method.as_str())
        .bind(contribution.status.as_str())
        .bind(contribution.reviewed_by.as_deref())
        .bind(contribution.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create contribution: {error}"))
        })?;

        Ok(())
    }

    async fn find(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
    ) -> AppResult<Option<Contribution>> {
        let row = sqlx::query_as::<_, ContributionRow>(&format!(
            "SELECT {CONTRIBUTION_COLUMNS} FROM contributions WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(contribution_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load contribution: {error}")))?;

        row.map(Contribution::try_from).transpose()
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<ContributionStatus>,
    ) -> AppResult<Vec<Contribution>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ContributionRow>(&format!(
                    "SELECT {CONTRIBUTION_COLUMNS} FROM contributions \
                     WHERE tenant_id = $1 AND status = $2 ORDER BY created_at DESC"
                ))
                .bind(tenant_id.as_uuid())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ContributionRow>(&format!(
                    "SELECT {CONTRIBUTION_COLUMNS} FROM contributions \
                     WHERE tenant_id = $1 ORDER BY created_at DESC"
                ))
                .bind(tenant_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to list contributions: {error}")))?;

        rows.into_iter().map(Contribution::try_from).collect()
    }

    async fn record_decision(
        &self,
        tenant_id: TenantId,
        contribution_id: ContributionId,
        status: ContributionStatus,
        reviewer: &str,
    ) -> AppResult<Contribution> {
        let row = sqlx::query_as::<_, ContributionRow>(&format!(
            r#"
            UPDATE contributions
            SET status = $3, reviewed_by = $4
            WHERE tenant_id = $1 AND id = $2
            RETURNING {CONTRIBUTION_COLUMNS}
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(contribution_id.as_uuid())
        .bind(status.as_str())
        .bind(reviewer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record contribution decision: {error}"))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("contribution '{contribution_id}' not found"))
        })?;

        Contribution::try_from(row)
    }

    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = sqlx::query_as::<_, MonthlyTotalRow>(
            r#"
            SELECT CAST(date_part('year', date) AS INT) AS year,
                   CAST(date_part('month', date) AS INT) AS month,
                   SUM(amount) AS total
            FROM contributions
            WHERE tenant_id = $1 AND status = 'approved' AND date >= $2
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to sum monthly contributions: {error}"))
        })?;

        Ok(rows.into_iter().map(MonthlyTotal::from).collect())
    }
}

//! PostgreSQL-backed loan repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coopra_application::{LoanRepository, MemberLoanStats, MonthlyTotal};
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{Loan, LoanId, LoanStatus, MemberId};

use crate::monthly_rows::MonthlyTotalRow;

/// PostgreSQL implementation of the loan repository port.
#[derive(Clone)]
pub struct PostgresLoanRepository {
    pool: PgPool,
}

impl PostgresLoanRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoanRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    member_id: uuid::Uuid,
    requested_amount: f64,
    approved_amount: Option<f64>,
    reason: String,
    status: String,
    interest_rate: f64,
    start_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    amount_repaid: f64,
    decided_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LoanRow> for Loan {
    type Error = AppError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LoanId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            member_id: MemberId::from_uuid(row.member_id),
            requested_amount: row.requested_amount,
            approved_amount: row.approved_amount,
            reason: row.reason,
            status: row.status.parse::<LoanStatus>()?,
            interest_rate: row.interest_rate,
            start_date: row.start_date,
            due_date: row.due_date,
            amount_repaid: row.amount_repaid,
            decided_by: row.decided_by,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoanStatsRow {
    member_id: uuid::Uuid,
    active_loans: i64,
    repaid_loans: i64,
    total_loans: i64,
}

const LOAN_COLUMNS: &str = "id, tenant_id, member_id, requested_amount, approved_amount, \
     reason, status, interest_rate, start_date, due_date, amount_repaid, decided_by, created_at";

#[async_trait]
impl LoanRepository for PostgresLoanRepository {
    async fn insert(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                id, tenant_id, member_id, requested_amount, approved_amount,
                reason, status, interest_rate, start_date, due_date,
                amount_repaid, decided_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(loan.id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(loan.member_id.as_uuid())
        .bind(loan.requested_amount)
        .bind(loan.approved_amount)
        .bind(&loan.reason)
        .bind(loan.status.as_str())
        .bind(loan.interest_rate)
        .bind(loan.start_date)
        .bind(loan.due_date)
        .bind(loan.amount_repaid)
        .bind(loan.decided_by.as_deref())
        .bind(loan.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create loan: {error}")))?;

        Ok(())
    }

    async fn find(&self, tenant_id: TenantId, loan_id: LoanId) -> AppResult<Option<Loan>> {
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(loan_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load loan: {error}")))?;

        row.map(Loan::try_from).transpose()
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<Loan>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, LoanRow>(&format!(
                    "SELECT {LOAN_COLUMNS} FROM loans \
                     WHERE tenant_id = $1 AND status = $2 ORDER BY created_at DESC"
                ))
                .bind(tenant_id.as_uuid())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, LoanRow>(&format!(
                    "SELECT {LOAN_COLUMNS} FROM loans \
                     WHERE tenant_id = $1 ORDER BY created_at DESC"
                ))
                .bind(tenant_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to list loans: {error}")))?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    async fn record_decision(&self, tenant_id: TenantId, loan: Loan) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET status = $3, approved_amount = $4, interest_rate = $5,
                start_date = $6, due_date = $7, decided_by = $8
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(loan.id.as_uuid())
        .bind(loan.status.as_str())
        .bind(loan.approved_amount)
        .bind(loan.interest_rate)
        .bind(loan.start_date)
        .bind(loan.due_date)
        .bind(loan.decided_by.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record loan decision: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("loan '{}' not found", loan.id)));
        }

        Ok(())
    }

    async fn add_repayment(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        amount: f64,
    ) -> AppResult<Loan> {
        // One conditional UPDATE: the increment and the completion check must
        // not be split into a read followed by a write.
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            r#"
            UPDATE loans
            SET amount_repaid = amount_repaid + $3,
                status = CASE
                    WHEN amount_repaid + $3 >= COALESCE(approved_amount, requested_amount)
                        THEN 'completed'
                    ELSE status
                END
            WHERE tenant_id = $1 AND id = $2
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(loan_id.as_uuid())
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record repayment: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;

        Loan::try_from(row)
    }

    async fn set_status(
        &self,
        tenant_id: TenantId,
        loan_id: LoanId,
        status: LoanStatus,
    ) -> AppResult<Loan> {
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            r#"
            UPDATE loans
            SET status = $3
            WHERE tenant_id = $1 AND id = $2
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(loan_id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update loan status: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("loan '{loan_id}' not found")))?;

        Loan::try_from(row)
    }

    async fn monthly_approved_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = sqlx::query_as::<_, MonthlyTotalRow>(
            r#"
            SELECT CAST(date_part('year', created_at) AS INT) AS year,
                   CAST(date_part('month', created_at) AS INT) AS month,
                   SUM(COALESCE(approved_amount, requested_amount)) AS total
            FROM loans
            WHERE tenant_id = $1
              AND status NOT IN ('pending', 'rejected')
              AND created_at >= $2
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to sum monthly loan approvals: {error}"))
        })?;

        Ok(rows.into_iter().map(MonthlyTotal::from).collect())
    }

    async fn stats_by_member(&self, tenant_id: TenantId) -> AppResult<Vec<MemberLoanStats>> {
        let rows = sqlx::query_as::<_, LoanStatsRow>(
            r#"
            SELECT member_id,
                   COUNT(*) FILTER (WHERE status IN ('approved', 'active')) AS active_loans,
                   COUNT(*) FILTER (WHERE status = 'completed') AS repaid_loans,
                   COUNT(*) AS total_loans
            FROM loans
            WHERE tenant_id = $1
            GROUP BY member_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to aggregate loan stats: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| MemberLoanStats {
                member_id: MemberId::from_uuid(row.member_id),
                active_loans: row.active_loans,
                repaid_loans: row.repaid_loans,
                total_loans: row.total_loans,
            })
            .collect())
    }
}

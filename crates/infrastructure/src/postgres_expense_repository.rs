//! PostgreSQL-backed expense repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coopra_application::{CategoryTotal, ExpenseRepository, MonthlyTotal};
use coopra_core::{AppError, AppResult, TenantId};
use coopra_domain::{Expense, ExpenseCategory, ExpenseId, MemberId};

use crate::monthly_rows::MonthlyTotalRow;

/// PostgreSQL implementation of the expense repository port.
#[derive(Clone)]
pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    category: String,
    amount: f64,
    date: DateTime<Utc>,
    description: Option<String>,
    created_by: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = AppError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ExpenseId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            category: row.category.parse::<ExpenseCategory>()?,
            amount: row.amount,
            date: row.date,
            description: row.description,
            created_by: MemberId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryTotalRow {
    category: String,
    total: f64,
}

const EXPENSE_COLUMNS: &str =
    "id, tenant_id, category, amount, date, description, created_by, created_at";

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn insert(&self, tenant_id: TenantId, expense: Expense) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, tenant_id, category, amount, date, description, created_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(expense.id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(expense.category.as_str())
        .bind(expense.amount)
        .bind(expense.date)
        .bind(expense.description.as_deref())
        .bind(expense.created_by.as_uuid())
        .bind(expense.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create expense: {error}")))?;

        Ok(())
    }

    async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Expense>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE tenant_id = $1 ORDER BY date DESC"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list expenses: {error}")))?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    async fn monthly_totals(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<MonthlyTotal>> {
        let rows = sqlx::query_as::<_, MonthlyTotalRow>(
            r#"
            SELECT CAST(date_part('year', date) AS INT) AS year,
                   CAST(date_part('month', date) AS INT) AS month,
                   SUM(amount) AS total
            FROM expenses
            WHERE tenant_id = $1 AND date >= $2
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to sum monthly expenses: {error}"))
        })?;

        Ok(rows.into_iter().map(MonthlyTotal::from).collect())
    }

    async fn category_totals(&self, tenant_id: TenantId) -> AppResult<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, CategoryTotalRow>(
            r#"
            SELECT category, SUM(amount) AS total
            FROM expenses
            WHERE tenant_id = $1
            GROUP BY category
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to sum expenses by category: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(CategoryTotal {
                    category: row.category.parse::<ExpenseCategory>()?,
                    total: row.total,
                })
            })
            .collect()
    }
}

//! Shared row shape for per-month aggregation queries.

use coopra_application::MonthlyTotal;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MonthlyTotalRow {
    pub(crate) year: i32,
    pub(crate) month: i32,
    pub(crate) total: f64,
}

impl From<MonthlyTotalRow> for MonthlyTotal {
    fn from(row: MonthlyTotalRow) -> Self {
        Self {
            year: row.year,
            month: row.month.unsigned_abs(),
            total: row.total,
        }
    }
}

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::salary::{NewSalaryReport, ReportStatus, SalaryReport};
use crate::normalize::normalize;

#[derive(Debug, Clone)]
pub struct SalaryReportRepository {
    pool: PgPool,
}

impl SalaryReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a validated report as `pending`. Normalized columns are
    /// derived here, same as for records.
    pub async fn insert(&self, rep: &NewSalaryReport) -> Result<i64> {
        let company_normalized = normalize(&rep.company);
        let title_normalized = normalize(&rep.title);

        let id = sqlx::query_scalar(
            r#"
            INSERT INTO salary_reports
                (user_id, company, company_normalized, title, title_normalized,
                 years_experience, location, base_salary, total_comp, currency,
                 verified, status, ip_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(rep.user_id)
        .bind(&rep.company)
        .bind(&company_normalized)
        .bind(&rep.title)
        .bind(&title_normalized)
        .bind(rep.years_experience)
        .bind(&rep.location)
        .bind(rep.base_salary)
        .bind(rep.total_comp)
        .bind(&rep.currency)
        .bind(rep.verified)
        .bind(ReportStatus::Pending.as_str())
        .bind(&rep.ip_hash)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert salary report")?;

        Ok(id)
    }

    /// Move a pending report to a terminal state. Returns false when the id
    /// does not name a pending report, so terminal states never transition.
    pub async fn set_status(&self, id: i64, status: ReportStatus) -> Result<bool> {
        let rows = sqlx::query(
            "UPDATE salary_reports SET status = $1 WHERE id = $2 AND status = $3",
        )
        .bind(status.as_str())
        .bind(id)
        .bind(ReportStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to update report status")?
        .rows_affected();

        Ok(rows > 0)
    }

    pub async fn approved(&self) -> Result<Vec<SalaryReport>> {
        sqlx::query_as::<_, SalaryReport>(
            "SELECT * FROM salary_reports WHERE status = $1 ORDER BY created_at ASC",
        )
        .bind(ReportStatus::Approved.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch approved reports")
    }

    pub async fn pending_count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM salary_reports WHERE status = $1")
            .bind(ReportStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count pending reports")
    }

    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM salary_reports GROUP BY status ORDER BY status ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to count reports by status")
    }
}

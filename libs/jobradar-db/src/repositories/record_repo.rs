use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::salary::{NewSalaryRecord, SalaryRecord};
use crate::normalize::normalize;

#[derive(Debug, Clone)]
pub struct SalaryRecordRepository {
    pool: PgPool,
}

impl SalaryRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or fully replace the record under its
    /// (company_normalized, title_normalized, location) key. The normalized
    /// key columns are derived here from the raw values; `fetched_at` is
    /// refreshed on every write.
    pub async fn upsert(&self, rec: &NewSalaryRecord) -> Result<()> {
        let company_normalized = normalize(&rec.company);
        let title_normalized = rec.title.as_deref().map(normalize);

        sqlx::query(
            r#"
            INSERT INTO salary_records
                (company, company_normalized, title, title_normalized, location,
                 min_salary, max_salary, median_salary, currency, period,
                 sample_count, source, source_url, confidence, fetched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW())
            ON CONFLICT (company_normalized, (COALESCE(title_normalized, '')), location)
            DO UPDATE SET
                company = EXCLUDED.company,
                title = EXCLUDED.title,
                min_salary = EXCLUDED.min_salary,
                max_salary = EXCLUDED.max_salary,
                median_salary = EXCLUDED.median_salary,
                currency = EXCLUDED.currency,
                period = EXCLUDED.period,
                sample_count = EXCLUDED.sample_count,
                source = EXCLUDED.source,
                source_url = EXCLUDED.source_url,
                confidence = EXCLUDED.confidence,
                fetched_at = NOW()
            "#,
        )
        .bind(&rec.company)
        .bind(&company_normalized)
        .bind(&rec.title)
        .bind(&title_normalized)
        .bind(&rec.location)
        .bind(rec.min_salary)
        .bind(rec.max_salary)
        .bind(rec.median_salary)
        .bind(&rec.currency)
        .bind(&rec.period)
        .bind(rec.sample_count)
        .bind(rec.source.as_str())
        .bind(&rec.source_url)
        .bind(rec.confidence.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert salary record for '{}'", rec.company))?;

        Ok(())
    }

    /// Substring match on the normalized company (and title, when given),
    /// best-sampled record first. Both sides are already normalized to
    /// lowercase, so LIKE gives the case-insensitive semantics.
    pub async fn find(
        &self,
        company_normalized: &str,
        title_normalized: Option<&str>,
    ) -> Result<Option<SalaryRecord>> {
        let company_pattern = format!("%{}%", company_normalized);

        match title_normalized {
            Some(title) => {
                let title_pattern = format!("%{}%", title);
                sqlx::query_as::<_, SalaryRecord>(
                    r#"
                    SELECT * FROM salary_records
                    WHERE company_normalized LIKE $1 AND title_normalized LIKE $2
                    ORDER BY sample_count DESC
                    LIMIT 1
                    "#,
                )
                .bind(&company_pattern)
                .bind(&title_pattern)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, SalaryRecord>(
                    r#"
                    SELECT * FROM salary_records
                    WHERE company_normalized LIKE $1
                    ORDER BY sample_count DESC
                    LIMIT 1
                    "#,
                )
                .bind(&company_pattern)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .context("Failed to look up salary record")
    }

    pub async fn find_all_for_company(&self, company_normalized: &str) -> Result<Vec<SalaryRecord>> {
        let pattern = format!("%{}%", company_normalized);
        sqlx::query_as::<_, SalaryRecord>(
            r#"
            SELECT * FROM salary_records
            WHERE company_normalized LIKE $1
            ORDER BY sample_count DESC, title_normalized ASC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch salary records for company")
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM salary_records")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count salary records")
    }

    pub async fn count_by_source(&self) -> Result<Vec<(String, i64)>> {
        sqlx::query_as(
            "SELECT source, COUNT(*) FROM salary_records GROUP BY source ORDER BY source ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to count salary records by source")
    }

    /// How many records a given producer has written; lets startup seeding
    /// run only on an empty table.
    pub async fn count_for_source(&self, source: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM salary_records WHERE source = $1")
            .bind(source)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count salary records for source")
    }
}

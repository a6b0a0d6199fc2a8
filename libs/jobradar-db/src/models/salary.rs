use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Which subsystem produced a salary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    SeedSurvey,
    ExternalApi,
    Scraped,
    AggregatedReports,
    Computed,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::SeedSurvey => "seed-survey",
            RecordSource::ExternalApi => "external-api",
            RecordSource::Scraped => "scraped",
            RecordSource::AggregatedReports => "aggregated-reports",
            RecordSource::Computed => "computed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownValue(String);

impl FromStr for Confidence {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "approved" => Ok(ReportStatus::Approved),
            "rejected" => Ok(ReportStatus::Rejected),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// A resolved, storable compensation data point. Unique per
/// (company_normalized, title_normalized, location); upserts fully replace
/// the non-key fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryRecord {
    pub id: i64,
    pub company: String,
    pub company_normalized: String,
    pub title: Option<String>,
    pub title_normalized: Option<String>,
    pub location: String,
    /// Monthly, in `currency` units. Records with min <= 0 are ignored by
    /// the resolver.
    pub min_salary: i64,
    pub max_salary: i64,
    pub median_salary: Option<i64>,
    pub currency: String,
    pub period: String,
    pub sample_count: i64,
    pub source: String,
    pub source_url: Option<String>,
    pub confidence: String,
    pub fetched_at: DateTime<Utc>,
}

/// Insert/replace payload for a salary record. The repository derives the
/// normalized key columns itself so they can never drift from the raw
/// values.
#[derive(Debug, Clone)]
pub struct NewSalaryRecord {
    pub company: String,
    pub title: Option<String>,
    pub location: String,
    pub min_salary: i64,
    pub max_salary: i64,
    pub median_salary: Option<i64>,
    pub currency: String,
    pub period: String,
    pub sample_count: i64,
    pub source: RecordSource,
    pub source_url: Option<String>,
    pub confidence: Confidence,
}

/// A single crowd-submitted data point, gated by moderation before it can
/// contribute to aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryReport {
    pub id: i64,
    pub user_id: Option<i64>,
    pub company: String,
    pub company_normalized: String,
    pub title: String,
    pub title_normalized: String,
    pub years_experience: Option<i32>,
    pub location: String,
    pub base_salary: i64,
    pub total_comp: Option<i64>,
    pub currency: String,
    pub verified: bool,
    pub status: String,
    /// Salted digest of the submitter IP; the raw address is never stored.
    #[serde(skip_serializing, default)]
    pub ip_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSalaryReport {
    pub user_id: Option<i64>,
    pub company: String,
    pub title: String,
    pub years_experience: Option<i32>,
    pub location: String,
    pub base_salary: i64,
    pub total_comp: Option<i64>,
    pub currency: String,
    pub verified: bool,
    pub ip_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [ReportStatus::Pending, ReportStatus::Approved, ReportStatus::Rejected] {
            assert_eq!(status.as_str().parse::<ReportStatus>().unwrap(), status);
        }
        assert!("banana".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }
}

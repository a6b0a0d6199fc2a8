use std::str::FromStr;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{error, info};

use jobradar_db::models::salary::{NewSalaryReport, ReportStatus};
use jobradar_db::repositories::report_repo::SalaryReportRepository;
use jobradar_shared::api::{SubmitOutcome, SubmitReportRequest};

use crate::services::aggregation_service::AggregationService;

/// Sanity band for a monthly base salary, inclusive on both ends.
pub const MIN_MONTHLY_SALARY: i64 = 5_000;
pub const MAX_MONTHLY_SALARY: i64 = 200_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportValidationError {
    #[error("company is required")]
    MissingCompany,
    #[error("title is required")]
    MissingTitle,
    #[error("base salary must be between {MIN_MONTHLY_SALARY} and {MAX_MONTHLY_SALARY} ILS per month")]
    SalaryOutOfBand,
}

fn validate(req: &SubmitReportRequest) -> Result<(), ReportValidationError> {
    if req.company.trim().is_empty() {
        return Err(ReportValidationError::MissingCompany);
    }
    if req.title.trim().is_empty() {
        return Err(ReportValidationError::MissingTitle);
    }
    if !(MIN_MONTHLY_SALARY..=MAX_MONTHLY_SALARY).contains(&req.base_salary) {
        return Err(ReportValidationError::SalaryOutOfBand);
    }
    Ok(())
}

/// Salted digest of the submitter address; only this ever reaches storage.
fn hash_ip(salt: &str, raw_ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(raw_ip.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl FromStr for ModerationAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(ModerationAction::Approve),
            "reject" => Ok(ModerationAction::Reject),
            _ => Err(()),
        }
    }
}

/// The crowd-report write path: public submission with validation, then the
/// admin-gated pending -> approved/rejected transition. Approval kicks off
/// re-aggregation in the background.
#[derive(Clone)]
pub struct ReportService {
    reports: SalaryReportRepository,
    aggregation: Arc<AggregationService>,
    ip_salt: String,
}

impl ReportService {
    pub fn new(
        reports: SalaryReportRepository,
        aggregation: Arc<AggregationService>,
        ip_salt: String,
    ) -> Self {
        Self { reports, aggregation, ip_salt }
    }

    /// Validation failures come back as a structured outcome; so do store
    /// failures, with the detail kept to the log.
    pub async fn submit(
        &self,
        req: SubmitReportRequest,
        user_id: Option<i64>,
        raw_ip: Option<&str>,
    ) -> SubmitOutcome {
        if let Err(e) = validate(&req) {
            return SubmitOutcome { success: false, error: Some(e.to_string()) };
        }

        let report = NewSalaryReport {
            user_id,
            company: req.company,
            title: req.title,
            years_experience: req.years_experience,
            location: req.location,
            base_salary: req.base_salary,
            total_comp: req.total_comp,
            currency: req.currency,
            verified: user_id.is_some(),
            ip_hash: raw_ip.map(|ip| hash_ip(&self.ip_salt, ip)),
        };

        match self.reports.insert(&report).await {
            Ok(id) => {
                info!("Salary report {} submitted for moderation", id);
                SubmitOutcome { success: true, error: None }
            }
            Err(e) => {
                error!("Failed to store salary report: {:#}", e);
                SubmitOutcome { success: false, error: Some("failed to save report".to_string()) }
            }
        }
    }

    /// Returns false when the transition did not happen: unknown id, report
    /// no longer pending, or a store failure (logged).
    pub async fn moderate(&self, report_id: i64, action: ModerationAction) -> bool {
        let status = match action {
            ModerationAction::Approve => ReportStatus::Approved,
            ModerationAction::Reject => ReportStatus::Rejected,
        };

        match self.reports.set_status(report_id, status).await {
            Ok(true) => {
                info!("Report {} moderated: {}", report_id, status.as_str());
                if action == ModerationAction::Approve {
                    let aggregation = self.aggregation.clone();
                    tokio::spawn(async move {
                        if let Err(e) = aggregation.aggregate_approved_reports().await {
                            error!("Post-approval aggregation failed: {:#}", e);
                        }
                    });
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!("Failed to moderate report {}: {:#}", report_id, e);
                false
            }
        }
    }

    pub async fn pending_count(&self) -> anyhow::Result<i64> {
        self.reports.pending_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(base_salary: i64) -> SubmitReportRequest {
        SubmitReportRequest {
            company: "Wix".to_string(),
            title: "Backend Engineer".to_string(),
            years_experience: Some(4),
            location: "Israel".to_string(),
            base_salary,
            total_comp: None,
            currency: "ILS".to_string(),
        }
    }

    #[test]
    fn salary_band_is_inclusive() {
        assert_eq!(validate(&request(4_999)), Err(ReportValidationError::SalaryOutOfBand));
        assert_eq!(validate(&request(5_000)), Ok(()));
        assert_eq!(validate(&request(200_000)), Ok(()));
        assert_eq!(validate(&request(200_001)), Err(ReportValidationError::SalaryOutOfBand));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut req = request(20_000);
        req.company = "  ".to_string();
        assert_eq!(validate(&req), Err(ReportValidationError::MissingCompany));

        let mut req = request(20_000);
        req.title = String::new();
        assert_eq!(validate(&req), Err(ReportValidationError::MissingTitle));
    }

    #[test]
    fn ip_hash_is_salted_and_opaque() {
        let a = hash_ip("salt-1", "10.0.0.1");
        let b = hash_ip("salt-2", "10.0.0.1");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(!a.contains("10.0.0.1"));
        // Deterministic for the same salt.
        assert_eq!(a, hash_ip("salt-1", "10.0.0.1"));
    }

    #[test]
    fn moderation_actions_parse() {
        assert_eq!("approve".parse::<ModerationAction>(), Ok(ModerationAction::Approve));
        assert_eq!("Reject".parse::<ModerationAction>(), Ok(ModerationAction::Reject));
        assert!("publish".parse::<ModerationAction>().is_err());
    }
}

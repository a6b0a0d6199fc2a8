use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use jobradar_db::models::salary::{Confidence, NewSalaryRecord, RecordSource, SalaryReport};
use jobradar_db::repositories::record_repo::SalaryRecordRepository;
use jobradar_db::repositories::report_repo::SalaryReportRepository;

/// Groups below this size carry too little signal to publish.
pub const MIN_GROUP_SIZE: usize = 2;
const HIGH_CONFIDENCE_GROUP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
    pub min: i64,
    pub median: i64,
    pub max: i64,
}

/// Order statistics over one (company, title) group of base salaries.
/// Returns None for groups under the minimum size. Even-sized groups take
/// the upper median (index n/2 of the sorted list).
pub fn group_stats(salaries: &[i64]) -> Option<GroupStats> {
    if salaries.len() < MIN_GROUP_SIZE {
        return None;
    }
    let mut sorted = salaries.to_vec();
    sorted.sort_unstable();
    Some(GroupStats {
        min: sorted[0],
        median: sorted[sorted.len() / 2],
        max: sorted[sorted.len() - 1],
    })
}

/// Folds approved crowd reports into one `aggregated-reports` record per
/// (company, title) group. A full recompute every time, so reruns are
/// idempotent over the same approved set.
#[derive(Clone)]
pub struct AggregationService {
    reports: SalaryReportRepository,
    records: SalaryRecordRepository,
}

impl AggregationService {
    pub fn new(reports: SalaryReportRepository, records: SalaryRecordRepository) -> Self {
        Self { reports, records }
    }

    pub async fn aggregate_approved_reports(&self) -> Result<usize> {
        let approved = self.reports.approved().await?;

        let mut groups: HashMap<(String, String), Vec<&SalaryReport>> = HashMap::new();
        for report in &approved {
            groups
                .entry((report.company_normalized.clone(), report.title_normalized.clone()))
                .or_default()
                .push(report);
        }

        let mut written = 0usize;
        for group in groups.values() {
            let salaries: Vec<i64> = group.iter().map(|r| r.base_salary).collect();
            let Some(stats) = group_stats(&salaries) else {
                continue;
            };

            let confidence = if group.len() >= HIGH_CONFIDENCE_GROUP {
                Confidence::High
            } else {
                Confidence::Medium
            };

            let rec = NewSalaryRecord {
                company: group[0].company.clone(),
                title: Some(group[0].title.clone()),
                location: "Israel".to_string(),
                min_salary: stats.min,
                max_salary: stats.max,
                median_salary: Some(stats.median),
                currency: "ILS".to_string(),
                period: "monthly".to_string(),
                sample_count: group.len() as i64,
                source: RecordSource::AggregatedReports,
                source_url: None,
                confidence,
            };
            self.records.upsert(&rec).await?;
            written += 1;
        }

        info!(
            "Aggregated {} approved reports into {} salary records",
            approved.len(),
            written
        );
        Ok(written)
    }
}

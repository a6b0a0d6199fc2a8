use std::sync::LazyLock;

use anyhow::Result;
use tracing::info;

use jobradar_db::models::salary::{Confidence, NewSalaryRecord, RecordSource};
use jobradar_db::normalize::normalize;
use jobradar_db::repositories::record_repo::SalaryRecordRepository;

use crate::services::seniority::Seniority;

/// Nominal sample weight given to every survey row, so survey records rank
/// above one-off scrapes but below a well-fed aggregation.
pub const SURVEY_WEIGHT: i64 = 25;

pub const SURVEY_LOCATION: &str = "Israel";

/// One company's per-tier monthly ILS ranges from the static seed survey.
pub struct CompanySurvey {
    pub company: &'static str,
    pub junior: (i64, i64),
    pub mid: (i64, i64),
    pub senior: (i64, i64),
    pub staff: (i64, i64),
    pub manager: (i64, i64),
    pub director: (i64, i64),
}

impl CompanySurvey {
    pub fn range(&self, tier: Seniority) -> (i64, i64) {
        match tier {
            Seniority::Junior => self.junior,
            Seniority::Mid => self.mid,
            Seniority::Senior => self.senior,
            Seniority::Staff => self.staff,
            Seniority::Manager => self.manager,
            Seniority::Director => self.director,
        }
    }
}

// Monthly gross ILS, Israeli market. Rough 2024 survey figures.
pub static SURVEY: &[CompanySurvey] = &[
    CompanySurvey { company: "Google", junior: (28_000, 38_000), mid: (38_000, 55_000), senior: (55_000, 75_000), staff: (72_000, 100_000), manager: (68_000, 95_000), director: (95_000, 130_000) },
    CompanySurvey { company: "Meta", junior: (30_000, 40_000), mid: (40_000, 58_000), senior: (58_000, 78_000), staff: (75_000, 105_000), manager: (70_000, 98_000), director: (98_000, 135_000) },
    CompanySurvey { company: "Apple", junior: (26_000, 35_000), mid: (35_000, 50_000), senior: (50_000, 68_000), staff: (65_000, 88_000), manager: (60_000, 82_000), director: (85_000, 115_000) },
    CompanySurvey { company: "Microsoft", junior: (24_000, 32_000), mid: (32_000, 45_000), senior: (45_000, 62_000), staff: (60_000, 80_000), manager: (55_000, 75_000), director: (80_000, 110_000) },
    CompanySurvey { company: "Amazon", junior: (25_000, 34_000), mid: (34_000, 48_000), senior: (48_000, 65_000), staff: (62_000, 85_000), manager: (58_000, 78_000), director: (85_000, 115_000) },
    CompanySurvey { company: "Nvidia", junior: (26_000, 36_000), mid: (36_000, 52_000), senior: (50_000, 70_000), staff: (68_000, 90_000), manager: (62_000, 85_000), director: (90_000, 120_000) },
    CompanySurvey { company: "Intel", junior: (18_000, 25_000), mid: (25_000, 35_000), senior: (35_000, 48_000), staff: (45_000, 60_000), manager: (42_000, 58_000), director: (60_000, 85_000) },
    CompanySurvey { company: "Mobileye", junior: (19_000, 26_000), mid: (26_000, 37_000), senior: (37_000, 50_000), staff: (47_000, 63_000), manager: (44_000, 60_000), director: (62_000, 88_000) },
    CompanySurvey { company: "Check Point", junior: (18_000, 26_000), mid: (26_000, 38_000), senior: (38_000, 52_000), staff: (48_000, 65_000), manager: (45_000, 62_000), director: (65_000, 90_000) },
    CompanySurvey { company: "Wix", junior: (20_000, 28_000), mid: (28_000, 40_000), senior: (40_000, 55_000), staff: (52_000, 70_000), manager: (48_000, 65_000), director: (70_000, 95_000) },
    CompanySurvey { company: "monday.com", junior: (21_000, 29_000), mid: (29_000, 42_000), senior: (42_000, 57_000), staff: (54_000, 72_000), manager: (50_000, 68_000), director: (72_000, 98_000) },
    CompanySurvey { company: "CyberArk", junior: (18_000, 25_000), mid: (25_000, 36_000), senior: (36_000, 49_000), staff: (46_000, 62_000), manager: (43_000, 59_000), director: (62_000, 86_000) },
    CompanySurvey { company: "JFrog", junior: (18_000, 25_000), mid: (25_000, 36_000), senior: (36_000, 48_000), staff: (45_000, 60_000), manager: (42_000, 58_000), director: (60_000, 84_000) },
    CompanySurvey { company: "Amdocs", junior: (14_000, 19_000), mid: (19_000, 27_000), senior: (27_000, 36_000), staff: (34_000, 45_000), manager: (32_000, 44_000), director: (45_000, 62_000) },
    CompanySurvey { company: "NICE", junior: (15_000, 20_000), mid: (20_000, 28_000), senior: (28_000, 38_000), staff: (36_000, 47_000), manager: (33_000, 45_000), director: (47_000, 65_000) },
];

// Loaded once, keyed by normalized company name.
static SURVEY_INDEX: LazyLock<Vec<(String, &'static CompanySurvey)>> =
    LazyLock::new(|| SURVEY.iter().map(|c| (normalize(c.company), c)).collect());

/// Match a normalized company against the survey table. The match is a
/// bidirectional substring test ("google" matches "google israel" and vice
/// versa) — a documented fuzziness kept from the data this table was built
/// around, not a precision feature.
pub fn survey_lookup(company_normalized: &str, title: Option<&str>) -> Option<(i64, i64, Seniority)> {
    if company_normalized.is_empty() {
        return None;
    }
    let entry = SURVEY_INDEX.iter().find(|(name, _)| {
        name.contains(company_normalized) || company_normalized.contains(name.as_str())
    })?;
    let tier = title.map(Seniority::classify).unwrap_or(Seniority::Mid);
    let (min, max) = entry.1.range(tier);
    Some((min, max, tier))
}

fn tier_title(tier: Seniority) -> &'static str {
    match tier {
        Seniority::Junior => "Junior Software Engineer",
        Seniority::Mid => "Software Engineer",
        Seniority::Senior => "Senior Software Engineer",
        Seniority::Staff => "Staff Software Engineer",
        Seniority::Manager => "Engineering Manager",
        Seniority::Director => "Director of Engineering",
    }
}

/// Writes the static survey into the record store so survey data is visible
/// to plain store lookups, one record per (company, tier).
#[derive(Clone)]
pub struct SurveyService {
    records: SalaryRecordRepository,
}

impl SurveyService {
    pub fn new(records: SalaryRecordRepository) -> Self {
        Self { records }
    }

    pub async fn populate(&self) -> Result<u64> {
        let mut written = 0u64;
        for entry in SURVEY {
            for tier in Seniority::ALL {
                let (min, max) = entry.range(tier);
                let rec = NewSalaryRecord {
                    company: entry.company.to_string(),
                    title: Some(tier_title(tier).to_string()),
                    location: SURVEY_LOCATION.to_string(),
                    min_salary: min,
                    max_salary: max,
                    median_salary: None,
                    currency: "ILS".to_string(),
                    period: "monthly".to_string(),
                    sample_count: SURVEY_WEIGHT,
                    source: RecordSource::SeedSurvey,
                    source_url: None,
                    confidence: Confidence::High,
                };
                self.records.upsert(&rec).await?;
                written += 1;
            }
        }
        info!("Survey populate wrote {} salary records", written);
        Ok(written)
    }

    /// First-boot seeding: populate only when no survey records exist yet.
    pub async fn populate_if_empty(&self) -> Result<()> {
        let existing = self
            .records
            .count_for_source(RecordSource::SeedSurvey.as_str())
            .await?;
        if existing > 0 {
            return Ok(());
        }
        self.populate().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_company_by_normalized_substring() {
        let (min, max, tier) = survey_lookup("google", Some("Senior Software Engineer")).unwrap();
        assert_eq!(tier, Seniority::Senior);
        assert!(min > 0 && max >= min);
    }

    #[test]
    fn substring_match_works_both_directions() {
        // Query longer than the table entry.
        assert!(survey_lookup("google israel", None).is_some());
        // Query shorter than the table entry.
        assert!(survey_lookup("mobil", None).is_some());
    }

    #[test]
    fn missing_title_defaults_to_mid() {
        let (min, max, tier) = survey_lookup("wix", None).unwrap();
        let entry = SURVEY.iter().find(|c| c.company == "Wix").unwrap();
        assert_eq!(tier, Seniority::Mid);
        assert_eq!((min, max), entry.mid);
    }

    #[test]
    fn unknown_company_misses() {
        assert!(survey_lookup("acme widgets", Some("Engineer")).is_none());
        assert!(survey_lookup("", None).is_none());
    }

    #[test]
    fn every_tier_range_is_ordered() {
        for entry in SURVEY {
            for tier in Seniority::ALL {
                let (min, max) = entry.range(tier);
                assert!(min > 0 && min <= max, "bad range for {}", entry.company);
            }
        }
    }
}

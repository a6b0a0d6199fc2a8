use std::sync::LazyLock;

use tracing::warn;

use jobradar_db::models::salary::SalaryRecord;
use jobradar_db::normalize::normalize;
use jobradar_db::repositories::record_repo::SalaryRecordRepository;
use jobradar_shared::api::{ConfidenceTier, Estimate, EstimateRequest, EstimateSource};

use crate::services::survey_service::survey_lookup;

// Base monthly ILS ranges by coarse level; unknown/missing level falls back
// to the engineer band.
const BASE_INTERN: (i64, i64) = (8_000, 14_000);
const BASE_ENGINEER: (i64, i64) = (18_000, 32_000);
const BASE_MANAGER: (i64, i64) = (30_000, 50_000);
const BASE_EXECUTIVE: (i64, i64) = (45_000, 80_000);

const CATEGORY_MULTIPLIERS: &[(&str, f64)] = &[
    ("software", 1.1),
    ("data", 1.15),
    ("security", 1.15),
    ("devops", 1.1),
    ("hardware", 1.05),
    ("product", 1.05),
    ("finance", 0.95),
    ("design", 0.9),
    ("sales", 0.9),
    ("qa", 0.85),
    ("marketing", 0.8),
    ("hr", 0.75),
    ("support", 0.7),
];

const SIZE_MULTIPLIERS: &[(&str, f64)] = &[
    ("xs", 0.8),
    ("s", 0.9),
    ("m", 1.0),
    ("l", 1.1),
    ("xl", 1.2),
];

// First match wins, so the most specific / most senior keywords come first.
const TITLE_FACTORS: &[(&str, f64)] = &[
    ("vice president", 1.8),
    ("vp", 1.8),
    ("chief", 1.8),
    ("director", 1.6),
    ("principal", 1.45),
    ("staff", 1.45),
    ("architect", 1.4),
    ("lead", 1.3),
    ("senior", 1.25),
    ("sr", 1.25),
    ("junior", 0.7),
    ("jr", 0.7),
    ("intern", 0.5),
];

// Curated pay-tier table, five tiers. Substring-matched on the normalized
// name (both directions), first hit wins; unknown companies get 1.0.
const TIER_TOP: f64 = 1.5;
const TIER_STRONG: f64 = 1.35;
const TIER_SOLID: f64 = 1.2;
const TIER_BASE: f64 = 1.05;
const TIER_SERVICES: f64 = 0.9;

const COMPANY_TIERS: &[(&str, f64)] = &[
    // Top global payers
    ("google", TIER_TOP),
    ("meta", TIER_TOP),
    ("facebook", TIER_TOP),
    ("apple", TIER_TOP),
    ("netflix", TIER_TOP),
    ("microsoft", TIER_TOP),
    ("amazon", TIER_TOP),
    ("nvidia", TIER_TOP),
    ("openai", TIER_TOP),
    ("databricks", TIER_TOP),
    ("snowflake", TIER_TOP),
    ("palantir", TIER_TOP),
    ("stripe", TIER_TOP),
    ("uber", TIER_TOP),
    ("airbnb", TIER_TOP),
    ("snap", TIER_TOP),
    // Strong multinationals and top local product companies
    ("mobileye", TIER_STRONG),
    ("wix", TIER_STRONG),
    ("monday", TIER_STRONG),
    ("check point", TIER_STRONG),
    ("palo alto", TIER_STRONG),
    ("salesforce", TIER_STRONG),
    ("oracle", TIER_STRONG),
    ("cisco", TIER_STRONG),
    ("vmware", TIER_STRONG),
    ("sap", TIER_STRONG),
    ("paypal", TIER_STRONG),
    ("ebay", TIER_STRONG),
    ("booking", TIER_STRONG),
    ("intuit", TIER_STRONG),
    ("twilio", TIER_STRONG),
    ("datadog", TIER_STRONG),
    ("cloudflare", TIER_STRONG),
    ("elastic", TIER_STRONG),
    // Established tech, chips, local unicorns
    ("intel", TIER_SOLID),
    ("qualcomm", TIER_SOLID),
    ("broadcom", TIER_SOLID),
    ("marvell", TIER_SOLID),
    ("micron", TIER_SOLID),
    ("applied materials", TIER_SOLID),
    ("kla", TIER_SOLID),
    ("western digital", TIER_SOLID),
    ("cyberark", TIER_SOLID),
    ("jfrog", TIER_SOLID),
    ("gong", TIER_SOLID),
    ("riskified", TIER_SOLID),
    ("lemonade", TIER_SOLID),
    ("fiverr", TIER_SOLID),
    ("lightricks", TIER_SOLID),
    ("taboola", TIER_SOLID),
    ("outbrain", TIER_SOLID),
    ("similarweb", TIER_SOLID),
    ("appsflyer", TIER_SOLID),
    ("ironsource", TIER_SOLID),
    ("playtika", TIER_SOLID),
    ("moon active", TIER_SOLID),
    // Established enterprise, defense, finance
    ("amdocs", TIER_BASE),
    ("nice", TIER_BASE),
    ("verint", TIER_BASE),
    ("cellebrite", TIER_BASE),
    ("radware", TIER_BASE),
    ("allot", TIER_BASE),
    ("ceva", TIER_BASE),
    ("tower semiconductor", TIER_BASE),
    ("elbit", TIER_BASE),
    ("rafael", TIER_BASE),
    ("israel aerospace", TIER_BASE),
    ("sapiens", TIER_BASE),
    ("magic software", TIER_BASE),
    ("priority software", TIER_BASE),
    ("bank hapoalim", TIER_BASE),
    ("bank leumi", TIER_BASE),
    ("isracard", TIER_BASE),
    ("harel", TIER_BASE),
    ("clal", TIER_BASE),
    // Outsourcing and integration houses
    ("matrix", TIER_SERVICES),
    ("ness", TIER_SERVICES),
    ("one1", TIER_SERVICES),
    ("malam", TIER_SERVICES),
    ("sqlink", TIER_SERVICES),
    ("aman group", TIER_SERVICES),
    ("bynet", TIER_SERVICES),
    ("elad software", TIER_SERVICES),
    ("tikal", TIER_SERVICES),
    ("comm it", TIER_SERVICES),
    ("log on", TIER_SERVICES),
];

static COMPANY_TIER_INDEX: LazyLock<Vec<(String, f64)>> = LazyLock::new(|| {
    COMPANY_TIERS
        .iter()
        .map(|(name, mult)| (normalize(name), *mult))
        .collect()
});

fn base_range(level: Option<&str>) -> (i64, i64) {
    match level.map(|l| l.trim().to_lowercase()).as_deref() {
        Some("intern") => BASE_INTERN,
        Some("manager") => BASE_MANAGER,
        Some("executive") => BASE_EXECUTIVE,
        _ => BASE_ENGINEER,
    }
}

fn category_multiplier(category: Option<&str>) -> f64 {
    let Some(category) = category else { return 1.0 };
    let key = category.trim().to_lowercase();
    CATEGORY_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(1.0, |(_, m)| *m)
}

fn size_multiplier(size: Option<&str>) -> f64 {
    let Some(size) = size else { return 1.0 };
    let key = size.trim().to_lowercase();
    SIZE_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(1.0, |(_, m)| *m)
}

fn title_factor(title: Option<&str>) -> f64 {
    let Some(title) = title else { return 1.0 };
    let title = title.to_lowercase();
    TITLE_FACTORS
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map_or(1.0, |(_, f)| *f)
}

/// (multiplier, matched). Unmatched companies are the 1.0 baseline, and
/// "matched" feeds the confidence decision.
fn company_tier(company: Option<&str>) -> (f64, bool) {
    let Some(company) = company else { return (1.0, false) };
    let key = normalize(company);
    if key.is_empty() {
        return (1.0, false);
    }
    COMPANY_TIER_INDEX
        .iter()
        .find(|(name, _)| name.contains(&key) || key.contains(name.as_str()))
        .map_or((1.0, false), |(_, m)| (*m, true))
}

fn round_thousand(v: f64) -> i64 {
    (v / 1000.0).round() as i64 * 1000
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn has_signal(req: &EstimateRequest) -> bool {
    present(&req.company)
        || present(&req.title)
        || present(&req.level)
        || present(&req.category)
        || present(&req.size)
}

/// The last computed rung: base range for the coarse level, scaled by the
/// category, title-seniority, company-size and company-tier multipliers,
/// rounded to the nearest thousand. The 1.0 defaults make this total.
fn compute_heuristic(req: &EstimateRequest) -> Estimate {
    let (base_min, base_max) = base_range(req.level.as_deref());
    let (company_mult, company_matched) = company_tier(req.company.as_deref());
    let mult = category_multiplier(req.category.as_deref())
        * title_factor(req.title.as_deref())
        * size_multiplier(req.size.as_deref())
        * company_mult;

    let confidence = if (present(&req.level) && present(&req.category) && present(&req.size))
        || company_matched
    {
        ConfidenceTier::High
    } else if !present(&req.level) && !present(&req.category) {
        ConfidenceTier::Low
    } else {
        ConfidenceTier::Medium
    };

    Estimate {
        min: round_thousand(base_min as f64 * mult),
        max: round_thousand(base_max as f64 * mult),
        source: EstimateSource::Computed,
        confidence,
    }
}

fn record_confidence(raw: &str) -> ConfidenceTier {
    match raw {
        "high" => ConfidenceTier::High,
        "low" => ConfidenceTier::Low,
        _ => ConfidenceTier::Medium,
    }
}

/// The fallback chain over an already-fetched store result: store record,
/// then the static survey, then the computed heuristic, then the zero
/// "estimated" terminal. Pure, so every rung is testable on its own.
pub fn resolve(store_hit: Option<&SalaryRecord>, req: &EstimateRequest) -> Estimate {
    if let Some(rec) = store_hit {
        if rec.min_salary > 0 {
            return Estimate {
                min: rec.min_salary,
                max: rec.max_salary,
                source: EstimateSource::Database,
                confidence: record_confidence(&rec.confidence),
            };
        }
    }

    if let Some(company) = req.company.as_deref() {
        if let Some((min, max, _tier)) = survey_lookup(&normalize(company), req.title.as_deref()) {
            return Estimate {
                min,
                max,
                source: EstimateSource::IsraeliData,
                confidence: ConfidenceTier::High,
            };
        }
    }

    if has_signal(req) {
        return compute_heuristic(req);
    }

    Estimate {
        min: 0,
        max: 0,
        source: EstimateSource::Estimated,
        confidence: ConfidenceTier::Low,
    }
}

/// Entry point used by the request handlers: one store round-trip, then the
/// pure chain. Store errors are logged and degrade to the next source.
#[derive(Clone)]
pub struct Estimator {
    records: SalaryRecordRepository,
}

impl Estimator {
    pub fn new(records: SalaryRecordRepository) -> Self {
        Self { records }
    }

    pub async fn estimate(&self, req: &EstimateRequest) -> Estimate {
        let store_hit = self.store_lookup(req).await;
        resolve(store_hit.as_ref(), req)
    }

    async fn store_lookup(&self, req: &EstimateRequest) -> Option<SalaryRecord> {
        let company = req.company.as_deref()?;
        let company_normalized = normalize(company);
        if company_normalized.is_empty() {
            return None;
        }
        let title_normalized = req
            .title
            .as_deref()
            .map(normalize)
            .filter(|t| !t.is_empty());

        match self
            .records
            .find(&company_normalized, title_normalized.as_deref())
            .await
        {
            Ok(Some(rec)) => return Some(rec),
            Ok(None) => {}
            Err(e) => {
                warn!("Record store lookup failed, falling through: {:#}", e);
                return None;
            }
        }

        // A title-scoped miss still gets one company-wide attempt before the
        // chain moves on to the survey.
        if title_normalized.is_some() {
            match self.records.find(&company_normalized, None).await {
                Ok(hit) => hit,
                Err(e) => {
                    warn!("Company-wide store lookup failed, falling through: {:#}", e);
                    None
                }
            }
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(company: &str, title: Option<&str>, min: i64, max: i64) -> SalaryRecord {
        SalaryRecord {
            id: 1,
            company: company.to_string(),
            company_normalized: normalize(company),
            title: title.map(String::from),
            title_normalized: title.map(normalize),
            location: "Israel".to_string(),
            min_salary: min,
            max_salary: max,
            median_salary: None,
            currency: "ILS".to_string(),
            period: "monthly".to_string(),
            sample_count: 10,
            source: "aggregated-reports".to_string(),
            source_url: None,
            confidence: "high".to_string(),
            fetched_at: Utc::now(),
        }
    }

    fn request(company: Option<&str>, title: Option<&str>) -> EstimateRequest {
        EstimateRequest {
            company: company.map(String::from),
            title: title.map(String::from),
            level: None,
            category: None,
            size: None,
        }
    }

    #[test]
    fn store_record_wins_over_survey() {
        let rec = record("Google", Some("Senior Software Engineer"), 60_000, 80_000);
        let req = request(Some("Google"), Some("Senior Software Engineer"));
        let est = resolve(Some(&rec), &req);
        assert_eq!(est.source, EstimateSource::Database);
        assert_eq!((est.min, est.max), (60_000, 80_000));
    }

    #[test]
    fn unusable_store_record_falls_through_to_survey() {
        let rec = record("Google", Some("Senior Software Engineer"), 0, 0);
        let req = request(Some("Google"), Some("Senior Software Engineer"));
        let est = resolve(Some(&rec), &req);
        assert_eq!(est.source, EstimateSource::IsraeliData);
    }

    #[test]
    fn google_senior_hits_the_survey_tier() {
        let req = request(Some("Google"), Some("Senior Software Engineer"));
        let est = resolve(None, &req);
        assert_eq!(est.source, EstimateSource::IsraeliData);
        assert_eq!(est.confidence, ConfidenceTier::High);
        assert_eq!((est.min, est.max), (55_000, 75_000));
    }

    #[test]
    fn unknown_company_gets_the_category_scaled_heuristic() {
        let req = EstimateRequest {
            company: Some("Acme Widgets".to_string()),
            title: Some("Mid-Level Engineer".to_string()),
            level: None,
            category: Some("software".to_string()),
            size: Some("m".to_string()),
        };
        let est = resolve(None, &req);
        assert_eq!(est.source, EstimateSource::Computed);
        // Engineer base 18k-32k times the 1.1 software multiplier, rounded.
        assert_eq!((est.min, est.max), (20_000, 35_000));
        assert_eq!(est.confidence, ConfidenceTier::Medium);
    }

    #[test]
    fn tiered_company_raises_range_and_confidence() {
        // Not in the survey, but in the pay-tier table.
        let req = request(Some("Stripe"), None);
        let est = resolve(None, &req);
        assert_eq!(est.source, EstimateSource::Computed);
        assert_eq!((est.min, est.max), (27_000, 48_000));
        assert_eq!(est.confidence, ConfidenceTier::High);
    }

    #[test]
    fn empty_request_is_the_documented_zero_answer() {
        let est = resolve(None, &EstimateRequest::default());
        assert_eq!(est.source, EstimateSource::Estimated);
        assert_eq!((est.min, est.max), (0, 0));
        assert_eq!(est.confidence, ConfidenceTier::Low);
    }

    #[test]
    fn estimates_are_always_well_formed() {
        let requests = [
            EstimateRequest::default(),
            request(Some("Acme"), None),
            request(None, Some("Junior QA Intern")),
            EstimateRequest {
                company: Some("Totally Unknown Ltd".to_string()),
                title: Some("VP Engineering".to_string()),
                level: Some("executive".to_string()),
                category: Some("software".to_string()),
                size: Some("xs".to_string()),
            },
        ];
        for req in requests {
            let est = resolve(None, &req);
            assert!(est.min >= 0);
            assert!(est.max >= est.min);
        }
    }

    #[test]
    fn level_selects_the_base_band() {
        assert_eq!(base_range(Some("intern")), BASE_INTERN);
        assert_eq!(base_range(Some("Executive")), BASE_EXECUTIVE);
        assert_eq!(base_range(Some("something else")), BASE_ENGINEER);
        assert_eq!(base_range(None), BASE_ENGINEER);
    }

    #[test]
    fn title_factor_prefers_the_most_senior_keyword() {
        assert_eq!(title_factor(Some("Senior Staff Engineer")), 1.45);
        assert_eq!(title_factor(Some("VP of Engineering")), 1.8);
        assert_eq!(title_factor(Some("Junior Developer")), 0.7);
        assert_eq!(title_factor(Some("Software Engineer")), 1.0);
        assert_eq!(title_factor(None), 1.0);
    }

    #[test]
    fn rounding_goes_to_the_nearest_thousand() {
        assert_eq!(round_thousand(19_800.0), 20_000);
        assert_eq!(round_thousand(35_200.0), 35_000);
        assert_eq!(round_thousand(500.0), 1_000);
        assert_eq!(round_thousand(0.0), 0);
    }
}

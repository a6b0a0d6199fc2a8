use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use jobradar_db::models::salary::{Confidence, NewSalaryRecord, RecordSource};
use jobradar_db::repositories::record_repo::SalaryRecordRepository;

use crate::services::scrape_service::ScrapeService;

/// Fixed ILS per USD used when the API answers in dollars. Good enough for
/// a salary band; a live FX feed would be precision theater here.
const USD_TO_ILS: f64 = 3.7;

/// Inter-call delay for the sequential batch sweep. The provider
/// rate-limits aggressively; the sweep must never run concurrently.
const FETCH_DELAY: Duration = Duration::from_millis(1500);

const FETCH_TITLES: &[&str] = &[
    "Software Engineer",
    "Senior Software Engineer",
    "Staff Software Engineer",
    "Engineering Manager",
    "Product Manager",
    "Data Scientist",
    "DevOps Engineer",
    "QA Engineer",
];

const FETCH_COMPANIES: &[&str] = &[
    "Google",
    "Meta",
    "Microsoft",
    "Amazon",
    "Nvidia",
    "Intel",
    "Mobileye",
    "Check Point",
    "Wix",
    "monday.com",
];

/// Raw shape of the provider's estimate payload.
#[derive(Debug, Deserialize)]
struct ExternalEstimate {
    min_salary: f64,
    max_salary: f64,
    #[serde(default)]
    sample_count: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    confidence: Option<String>,
}

/// Convert a provider payload to monthly ILS. Annual figures are divided
/// by 12, non-ILS currencies go through the fixed rate, and anything that
/// does not end up strictly positive is discarded.
fn to_monthly_ils(raw: &ExternalEstimate) -> Option<(i64, i64)> {
    let mut min = raw.min_salary;
    let mut max = raw.max_salary;

    if matches!(
        raw.period.as_deref().map(str::to_lowercase).as_deref(),
        Some("yearly" | "annual" | "year")
    ) {
        min /= 12.0;
        max /= 12.0;
    }

    let currency = raw.currency.as_deref().map(str::to_uppercase);
    if currency.is_some() && currency.as_deref() != Some("ILS") {
        min *= USD_TO_ILS;
        max *= USD_TO_ILS;
    }

    let (min, max) = (min.round() as i64, max.round() as i64);
    (min > 0 && max > 0).then_some((min, max))
}

/// Collapse the provider's free-text confidence onto our three tiers.
fn collapse_confidence(raw: Option<&str>) -> Confidence {
    match raw.map(str::to_lowercase).as_deref() {
        Some("high" | "confident" | "many") => Confidence::High,
        Some("low" | "few" | "sparse") => Confidence::Low,
        _ => Confidence::Medium,
    }
}

/// Pulls (company, title) salary bands from the external estimation
/// provider and stores them as `external-api` records. Fully optional: no
/// credentials means every call is a logged no-op.
#[derive(Clone)]
pub struct EstimationApiService {
    http: reqwest::Client,
    records: SalaryRecordRepository,
    scrape: Arc<ScrapeService>,
    api_url: Option<String>,
    api_key: Option<String>,
}

impl EstimationApiService {
    pub fn new(
        http: reqwest::Client,
        records: SalaryRecordRepository,
        scrape: Arc<ScrapeService>,
        api_url: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self { http, records, scrape, api_url, api_key }
    }

    /// Fetch and store one (company, title) estimate. Ok(false) means the
    /// source had nothing usable (unconfigured, or a discarded payload).
    pub async fn fetch_pair(&self, company: &str, title: &str) -> Result<bool> {
        let (Some(url), Some(key)) = (self.api_url.as_deref(), self.api_key.as_deref()) else {
            debug!("Estimation API not configured, skipping fetch");
            return Ok(false);
        };

        let raw: ExternalEstimate = self
            .http
            .get(url)
            .query(&[
                ("title", title),
                ("company", company),
                ("location", "Israel"),
                ("experience", "all"),
            ])
            .bearer_auth(key)
            .send()
            .await
            .context("Estimation API request failed")?
            .error_for_status()
            .context("Estimation API returned an error status")?
            .json()
            .await
            .context("Estimation API returned a malformed payload")?;

        let Some((min, max)) = to_monthly_ils(&raw) else {
            debug!("Discarding non-positive estimate for {} / {}", company, title);
            return Ok(false);
        };

        let rec = NewSalaryRecord {
            company: company.to_string(),
            title: Some(title.to_string()),
            location: "Israel".to_string(),
            min_salary: min,
            max_salary: max,
            median_salary: None,
            currency: "ILS".to_string(),
            period: "monthly".to_string(),
            sample_count: raw.sample_count.unwrap_or(1),
            source: RecordSource::ExternalApi,
            source_url: Some(url.to_string()),
            confidence: collapse_confidence(raw.confidence.as_deref()),
        };
        self.records.upsert(&rec).await?;
        Ok(true)
    }

    /// The admin-triggered sweep: every fixed company x title pair, strictly
    /// sequential with a fixed delay between calls. Per-pair failures are
    /// logged and skipped; companies the API yields nothing for fall back to
    /// the scraper, whose own failures are silent.
    pub async fn fetch_all(&self) {
        if self.api_key.is_none() {
            warn!("Estimation API key not set; sweep will rely on scrape fallback only");
        }

        for company in FETCH_COMPANIES {
            let mut stored_any = false;
            for title in FETCH_TITLES {
                match self.fetch_pair(company, title).await {
                    Ok(true) => stored_any = true,
                    Ok(false) => {}
                    Err(e) => warn!("External fetch failed for {} / {}: {:#}", company, title, e),
                }
                tokio::time::sleep(FETCH_DELAY).await;
            }
            if !stored_any {
                self.scrape.scrape_company(company).await;
            }
        }

        info!("External salary fetch sweep complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(min: f64, max: f64, currency: Option<&str>, period: Option<&str>) -> ExternalEstimate {
        ExternalEstimate {
            min_salary: min,
            max_salary: max,
            sample_count: None,
            currency: currency.map(String::from),
            period: period.map(String::from),
            confidence: None,
        }
    }

    #[test]
    fn annual_usd_converts_to_monthly_ils() {
        let got = to_monthly_ils(&raw(120_000.0, 180_000.0, Some("USD"), Some("yearly")));
        assert_eq!(got, Some((37_000, 55_500)));
    }

    #[test]
    fn monthly_ils_passes_through() {
        let got = to_monthly_ils(&raw(20_000.0, 30_000.0, Some("ILS"), Some("monthly")));
        assert_eq!(got, Some((20_000, 30_000)));
    }

    #[test]
    fn missing_currency_and_period_mean_monthly_ils() {
        assert_eq!(to_monthly_ils(&raw(15_000.0, 25_000.0, None, None)), Some((15_000, 25_000)));
    }

    #[test]
    fn non_positive_bounds_are_discarded() {
        assert_eq!(to_monthly_ils(&raw(0.0, 30_000.0, None, None)), None);
        assert_eq!(to_monthly_ils(&raw(-5.0, 30_000.0, None, None)), None);
        assert_eq!(to_monthly_ils(&raw(20_000.0, 0.0, None, None)), None);
    }

    #[test]
    fn confidence_collapses_to_three_tiers() {
        assert_eq!(collapse_confidence(Some("HIGH")), Confidence::High);
        assert_eq!(collapse_confidence(Some("few")), Confidence::Low);
        assert_eq!(collapse_confidence(Some("whatever")), Confidence::Medium);
        assert_eq!(collapse_confidence(None), Confidence::Medium);
    }
}

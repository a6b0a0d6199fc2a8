use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use jobradar_db::models::salary::{Confidence, NewSalaryRecord, RecordSource};
use jobradar_db::repositories::record_repo::SalaryRecordRepository;

const SCRAPE_BASE: &str = "https://www.jobmaster.co.il/salary/";

// A shekel range somewhere in the page, e.g. "₪12,000 - ₪18,500".
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"₪\s*([\d,]{4,9})\s*[-–]\s*₪?\s*([\d,]{4,9})").expect("valid range regex")
});

/// Parse the first currency range out of scraped HTML. Pure so the pattern
/// can be tested without a network.
fn parse_range(html: &str) -> Option<(i64, i64)> {
    let caps = RANGE_RE.captures(html)?;
    let min: i64 = caps[1].replace(',', "").parse().ok()?;
    let max: i64 = caps[2].replace(',', "").parse().ok()?;
    (min > 0 && max >= min).then_some((min, max))
}

/// Last-resort producer: fetch a public salary page and pattern-match a
/// range. Anti-scraping countermeasures make this fail often; every failure
/// is silent so the batch it runs inside is never interrupted.
#[derive(Clone)]
pub struct ScrapeService {
    http: reqwest::Client,
    records: SalaryRecordRepository,
}

impl ScrapeService {
    pub fn new(http: reqwest::Client, records: SalaryRecordRepository) -> Self {
        Self { http, records }
    }

    pub async fn scrape_company(&self, company: &str) {
        let request = self.http.get(SCRAPE_BASE).query(&[("q", company)]);

        let html = match request.send().await {
            Ok(resp) => match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("Scrape body read failed for '{}': {}", company, e);
                    return;
                }
            },
            Err(e) => {
                debug!("Scrape request failed for '{}': {}", company, e);
                return;
            }
        };

        let Some((min, max)) = parse_range(&html) else {
            debug!("No salary range found in scrape for '{}'", company);
            return;
        };

        let rec = NewSalaryRecord {
            company: company.to_string(),
            title: None,
            location: "Israel".to_string(),
            min_salary: min,
            max_salary: max,
            median_salary: None,
            currency: "ILS".to_string(),
            period: "monthly".to_string(),
            sample_count: 1,
            source: RecordSource::Scraped,
            source_url: Some(format!("{}?q={}", SCRAPE_BASE, company)),
            confidence: Confidence::Low,
        };

        if let Err(e) = self.records.upsert(&rec).await {
            warn!("Failed to store scraped record for '{}': {:#}", company, e);
        } else {
            debug!("Scraped salary range {}-{} for '{}'", min, max, company);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_range;

    #[test]
    fn parses_a_shekel_range() {
        let html = "<div class=\"range\">₪12,000 - ₪18,500 לחודש</div>";
        assert_eq!(parse_range(html), Some((12_000, 18_500)));
    }

    #[test]
    fn accepts_en_dash_and_missing_second_symbol() {
        assert_eq!(parse_range("₪9,500 – 14,000"), Some((9_500, 14_000)));
    }

    #[test]
    fn rejects_pages_without_a_range() {
        assert_eq!(parse_range("<html><body>Access denied</body></html>"), None);
        assert_eq!(parse_range(""), None);
    }

    #[test]
    fn rejects_inverted_ranges() {
        assert_eq!(parse_range("₪20,000 - ₪10,000"), None);
    }
}

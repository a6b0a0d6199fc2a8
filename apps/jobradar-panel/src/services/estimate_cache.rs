use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use jobradar_db::normalize::normalize;
use jobradar_shared::api::Estimate;

pub const ESTIMATE_TTL: Duration = Duration::from_secs(600);

/// Time-boxed memoization in front of the resolver, keyed by normalized
/// (company, title). Entries expire by timestamp comparison only; nothing
/// evicts them actively. Unbounded, but the key space is whatever
/// (company, title) pairs actually get asked about, which stays small.
pub struct EstimateCache {
    ttl: Duration,
    entries: RwLock<HashMap<(String, String), (Estimate, Instant)>>,
}

impl EstimateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn key(company: Option<&str>, title: Option<&str>) -> (String, String) {
        (
            normalize(company.unwrap_or_default()),
            normalize(title.unwrap_or_default()),
        )
    }

    pub fn get(&self, key: &(String, String)) -> Option<Estimate> {
        let entries = self.entries.read().ok()?;
        let (estimate, stored_at) = entries.get(key)?;
        (stored_at.elapsed() < self.ttl).then(|| estimate.clone())
    }

    pub fn insert(&self, key: (String, String), estimate: Estimate) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, (estimate, Instant::now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobradar_shared::api::{ConfidenceTier, EstimateSource};

    fn estimate() -> Estimate {
        Estimate {
            min: 20_000,
            max: 35_000,
            source: EstimateSource::Computed,
            confidence: ConfidenceTier::Medium,
        }
    }

    #[test]
    fn fresh_entries_are_returned() {
        let cache = EstimateCache::new(Duration::from_secs(60));
        let key = EstimateCache::key(Some("Wix"), Some("Backend Engineer"));
        cache.insert(key.clone(), estimate());
        assert_eq!(cache.get(&key), Some(estimate()));
    }

    #[test]
    fn expired_entries_are_ignored() {
        let cache = EstimateCache::new(Duration::ZERO);
        let key = EstimateCache::key(Some("Wix"), Some("Backend Engineer"));
        cache.insert(key.clone(), estimate());
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn keys_are_normalized() {
        assert_eq!(
            EstimateCache::key(Some("  Check-Point "), Some("Sr. Engineer")),
            EstimateCache::key(Some("checkpoint"), Some("sr engineer")),
        );
    }

    #[test]
    fn missing_fields_key_to_empty_strings() {
        assert_eq!(EstimateCache::key(None, None), (String::new(), String::new()));
    }
}

use serde::{Deserialize, Serialize};

pub mod api {
    use super::*;

    /// Where an estimate ultimately came from. `IsraeliData` is the static
    /// salary survey shipped with the panel; `Estimated` is the zero-value
    /// terminal answer when no source had anything to say.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EstimateSource {
        Database,
        IsraeliData,
        Computed,
        Estimated,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ConfidenceTier {
        Low,
        Medium,
        High,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct EstimateRequest {
        #[serde(default)]
        pub company: Option<String>,
        #[serde(default)]
        pub title: Option<String>,
        /// Coarse level: "intern" | "engineer" | "manager" | "executive".
        #[serde(default)]
        pub level: Option<String>,
        /// Job category: "software", "data", "qa", ...
        #[serde(default)]
        pub category: Option<String>,
        /// Company size bucket: "xs" | "s" | "m" | "l" | "xl".
        #[serde(default)]
        pub size: Option<String>,
    }

    /// Monthly ILS range. `min == max == 0` with `source = estimated` is the
    /// documented "nothing matched" answer, not an error.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Estimate {
        pub min: i64,
        pub max: i64,
        pub source: EstimateSource,
        pub confidence: ConfidenceTier,
    }

    fn default_location() -> String {
        "Israel".to_string()
    }

    fn default_currency() -> String {
        "ILS".to_string()
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SubmitReportRequest {
        pub company: String,
        pub title: String,
        #[serde(default)]
        pub years_experience: Option<i32>,
        #[serde(default = "default_location")]
        pub location: String,
        /// Monthly base salary, required.
        pub base_salary: i64,
        #[serde(default)]
        pub total_comp: Option<i64>,
        #[serde(default = "default_currency")]
        pub currency: String,
    }

    /// Validation failures come back here as `error`, never as a 5xx.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SubmitOutcome {
        pub success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModerateRequest {
        /// "approve" or "reject".
        pub action: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SourceCount {
        pub source: String,
        pub count: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StatsSummary {
        pub total_records: i64,
        pub records_by_source: Vec<SourceCount>,
        pub reports_pending: i64,
        pub reports_approved: i64,
        pub reports_rejected: i64,
    }
}

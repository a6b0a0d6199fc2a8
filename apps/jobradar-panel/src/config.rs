use anyhow::{Context, Result};
use std::env;

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Everything the panel reads from the environment, gathered once at
/// startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Unset means the admin surface is disabled entirely.
    pub admin_api_key: Option<String>,
    pub estimation_api_url: Option<String>,
    pub estimation_api_key: Option<String>,
    /// Salt for submitter-IP digests.
    pub report_ip_salt: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = env::var("PANEL_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PANEL_PORT must be a number")?;

        let report_ip_salt = non_empty("REPORT_IP_SALT").unwrap_or_else(|| {
            tracing::warn!("REPORT_IP_SALT not set; using a built-in salt");
            "jobradar-reports".to_string()
        });

        Ok(Self {
            database_url,
            port,
            admin_api_key: non_empty("ADMIN_API_KEY"),
            estimation_api_url: non_empty("ESTIMATION_API_URL"),
            estimation_api_key: non_empty("ESTIMATION_API_KEY"),
            report_ip_salt,
        })
    }
}

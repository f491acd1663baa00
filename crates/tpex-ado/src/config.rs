use crate::error::{AdoError, Result};
use std::env;

pub const PAT_ENV_VAR: &str = "AZURE_DEVOPS_PAT";
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";

#[derive(Debug, Clone)]
pub struct AdoConfig {
    pub pat: String,
    /// API endpoint root, normally Azure DevOps itself. Overridable so
    /// tests can point the client at a local listener.
    pub base_url: String,
    pub organization: String,
    pub project: String,
    pub plan_id: u64,
    pub plan_name: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl AdoConfig {
    /// Load configuration from environment variables.
    ///
    /// Requires `AZURE_DEVOPS_PAT` (a Personal Access Token with Test Plans
    /// read scope); everything else has a default and can be overridden via
    /// `AZDO_*` variables.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file if it exists (ignore if it doesn't)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pat = lookup(PAT_ENV_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AdoError::Config(format!("missing credential: {PAT_ENV_VAR} not set"))
            })?;

        let base_url = lookup("AZDO_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let organization =
            lookup("AZDO_ORGANIZATION").unwrap_or_else(|| "tr-corp-tax".to_string());
        let project = lookup("AZDO_PROJECT").unwrap_or_else(|| "OnesourceGCR".to_string());

        let plan_id = lookup("AZDO_PLAN_ID")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_410_043);
        let plan_name =
            lookup("AZDO_PLAN_NAME").unwrap_or_else(|| "Corporate Tax Test Plan".to_string());

        let timeout_seconds = lookup("AZDO_TIMEOUT_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        let max_attempts = lookup("AZDO_MAX_ATTEMPTS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);
        let retry_delay_seconds = lookup("AZDO_RETRY_DELAY_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        Ok(Self {
            pat,
            base_url,
            organization,
            project,
            plan_id,
            plan_name,
            timeout_seconds,
            max_attempts,
            retry_delay_seconds,
        })
    }
}

//! OpenSSF Scorecard API client
//!
//! Scores change independently of package releases, so responses are never
//! cached.

use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.securityscorecards.dev";

#[derive(Debug, thiserror::Error)]
pub enum ScorecardError {
    #[error("scorecard api returned status {0}")]
    Status(u16),

    #[error("scorecard api request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the scorecard service.
#[derive(Debug, Clone)]
pub struct ScorecardClient {
    http: Client,
    base_url: String,
}

impl ScorecardClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the supply-chain health record for one repository. The record is
    /// returned opaquely; we never interpret individual checks.
    pub async fn project(&self, repository: &str) -> Result<Value, ScorecardError> {
        let url = format!(
            "{}/projects/{}",
            self.base_url.trim_end_matches('/'),
            repository
        );
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScorecardError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

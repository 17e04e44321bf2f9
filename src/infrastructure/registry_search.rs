//! Package-name suggestion search
//!
//! Only the npm registry exposes a search endpoint we use; other ecosystems
//! are rejected at the route layer.

use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";

const SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("registry search returned status {0}")]
    Status(u16),

    #[error("registry search request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One search hit: a package name and its latest version.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PackageSuggestion {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct SearchPackage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    package: SearchPackage,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

/// HTTP client for npm registry search.
#[derive(Debug, Clone)]
pub struct NpmSearchClient {
    http: Client,
    base_url: String,
}

impl NpmSearchClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn suggest(&self, query: &str) -> Result<Vec<PackageSuggestion>, SearchError> {
        let url = format!("{}/-/v1/search", self.base_url.trim_end_matches('/'));
        let size = SUGGESTION_LIMIT.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[("text", query), ("size", size.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let body: SearchResponse = response.json().await?;
        Ok(body
            .objects
            .into_iter()
            .map(|o| PackageSuggestion {
                name: o.package.name,
                version: o.package.version,
            })
            .collect())
    }
}

//! OSV vulnerability feed client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.osv.dev";

/// Error type for vulnerability feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("vulnerability feed returned status {0}")]
    Status(u16),

    #[error("vulnerability feed request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One OSV record. Only the fields the enricher inspects are typed; the rest
/// of the record is carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsvVulnerability {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<OsvReference>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl OsvVulnerability {
    /// Whether the record carries usable severity data (a non-empty array or
    /// object; feeds emit both shapes).
    pub fn has_severity(&self) -> bool {
        match &self.severity {
            Some(Value::Array(entries)) => !entries.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsvReference {
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct QueryPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    package: QueryPackage<'a>,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
}

/// HTTP client for the OSV API.
#[derive(Debug, Clone)]
pub struct OsvClient {
    http: Client,
    base_url: String,
}

impl OsvClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Query known vulnerabilities for one package version.
    pub async fn query(
        &self,
        ecosystem: &str,
        package: &str,
        version: &str,
    ) -> Result<Vec<OsvVulnerability>, FeedError> {
        let url = format!("{}/v1/query", self.base());
        let request = QueryRequest {
            package: QueryPackage {
                name: package,
                ecosystem,
            },
            version,
        };
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body: QueryResponse = response.json().await?;
        Ok(body.vulns)
    }

    /// Fetch a single vulnerability record by OSV or CVE identifier.
    pub async fn vulnerability(&self, id: &str) -> Result<OsvVulnerability, FeedError> {
        let url = format!("{}/v1/vulns/{}", self.base(), urlencoding::encode(id));
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

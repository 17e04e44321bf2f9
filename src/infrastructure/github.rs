//! Repository metadata client
//!
//! Aggregates the GitHub repository record with pull-request counts (issue
//! search) and commit statistics (one-page listing plus Link-header
//! pagination math) into a single descriptive document.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

static LAST_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[?&]page=(\d+)[^>]*>;\s*rel="last""#).unwrap());

#[derive(Debug, thiserror::Error)]
pub enum RepoMetadataError {
    #[error("repository metadata service returned status {0}")]
    Status(u16),

    #[error("repository metadata request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Descriptive metadata for one source repository.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub language: Option<String>,
    pub archived: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub default_branch: String,
    pub watchers: u64,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub pulls_open: u64,
    pub pulls_closed: u64,
    pub commit_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    #[serde(rename = "spdx_id", default)]
    spdx: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    default_branch: String,
    #[serde(rename = "watchers_count", default)]
    watchers: u64,
    #[serde(rename = "subscribers_count", default)]
    subscribers: u64,
    #[serde(rename = "stargazers_count", default)]
    stars: u64,
    #[serde(rename = "forks_count", default)]
    forks: u64,
    #[serde(rename = "open_issues_count", default)]
    open_issues: u64,
    license: Option<LicenseInfo>,
}

#[derive(Debug, Deserialize)]
struct SearchCount {
    #[serde(rename = "total_count", default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

/// HTTP client for the repository metadata service.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    /// Fetch the full metadata document for `owner/repo`. The repository
    /// record itself is required; PR and commit counts are best effort.
    pub async fn repository(&self, repo: &str) -> Result<RepoMetadata, RepoMetadataError> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{}/repos/{}", base, repo);
        let response = self.http.get(&url).headers(self.headers()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoMetadataError::Status(status.as_u16()));
        }
        let info: RepoInfo = response.json().await?;

        let watchers = if info.subscribers != 0 {
            info.subscribers
        } else {
            info.watchers
        };
        let license = info.license.and_then(|l| {
            l.spdx
                .filter(|s| !s.is_empty())
                .or(l.name.filter(|n| !n.is_empty()))
        });

        let pulls_open = self.pull_request_count(repo, "open").await.unwrap_or(0);
        let pulls_closed = self.pull_request_count(repo, "closed").await.unwrap_or(0);
        let (commit_count, last_commit) = self.commit_stats(repo).await.unwrap_or((0, None));

        Ok(RepoMetadata {
            description: info.description,
            language: info.language,
            archived: info.archived,
            created: info.created_at,
            updated: info.updated_at,
            default_branch: info.default_branch,
            watchers,
            stars: info.stars,
            forks: info.forks,
            issues: info.open_issues,
            license,
            pulls_open,
            pulls_closed,
            commit_count,
            last_commit,
        })
    }

    /// Count pull requests in one state via the issue search API.
    async fn pull_request_count(
        &self,
        repo: &str,
        state: &str,
    ) -> Result<u64, RepoMetadataError> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{}/search/issues", base);
        let query = format!("repo:{} is:pr state:{}", repo, state);
        let response = self
            .http
            .get(&url)
            .headers(self.headers())
            .query(&[("q", query.as_str()), ("per_page", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoMetadataError::Status(status.as_u16()));
        }
        let body: SearchCount = response.json().await?;
        Ok(body.total)
    }

    /// Total commit count and last commit timestamp, derived from a one-entry
    /// listing: the `rel="last"` page number equals the commit count.
    async fn commit_stats(
        &self,
        repo: &str,
    ) -> Result<(u64, Option<DateTime<Utc>>), RepoMetadataError> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{}/repos/{}/commits", base, repo);
        let response = self
            .http
            .get(&url)
            .headers(self.headers())
            .query(&[("per_page", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoMetadataError::Status(status.as_u16()));
        }

        let count = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_last_page)
            .unwrap_or(1);

        let entries: Vec<CommitEntry> = response.json().await?;
        let last = entries
            .first()
            .and_then(|e| e.commit.author.as_ref())
            .and_then(|a| a.date);

        if entries.is_empty() {
            debug!("no commits listed for {}", repo);
        }
        Ok((count, last))
    }
}

/// Extract the page number of the `rel="last"` link from a Link header.
fn parse_last_page(link: &str) -> Option<u64> {
    LAST_PAGE_RE
        .captures(link)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::parse_last_page;

    #[test]
    fn last_page_from_link_header() {
        let link = "<https://api.github.com/repositories/1/commits?per_page=1&page=2>; \
                    rel=\"next\", \
                    <https://api.github.com/repositories/1/commits?per_page=1&page=5374>; \
                    rel=\"last\"";
        assert_eq!(parse_last_page(link), Some(5374));
    }

    #[test]
    fn missing_last_relation() {
        assert_eq!(parse_last_page("<https://x>; rel=\"next\""), None);
        assert_eq!(parse_last_page(""), None);
    }
}

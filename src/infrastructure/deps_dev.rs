//! Client for the shared dependency-metadata provider (deps.dev)
//!
//! Every ecosystem adapter delegates here; the provider is keyed by
//! (system, package identifier, version).

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.deps.dev";

/// Error type for metadata provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The package or version does not exist upstream.
    #[error("package not found")]
    NotFound,

    /// Non-success response from the provider.
    #[error("metadata provider returned status {0}")]
    Status(u16),

    /// Transport-level failure (connect, timeout, decode).
    #[error("metadata provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Direct dependencies plus the source repository for one package version.
#[derive(Debug, Clone, Default)]
pub struct PackageVersionInfo {
    /// Direct dependency edges: name -> version as reported by the provider.
    pub dependencies: BTreeMap<String, String>,
    /// Source repository identifier, when the provider knows one.
    pub repository: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionKey {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct DependencyNode {
    #[serde(rename = "versionKey")]
    version_key: VersionKey,
}

#[derive(Debug, Deserialize)]
struct DependencyEdge {
    #[serde(rename = "fromNode", default)]
    from_node: usize,
    #[serde(rename = "toNode", default)]
    to_node: usize,
}

#[derive(Debug, Deserialize)]
struct DependenciesResponse {
    #[serde(default)]
    nodes: Vec<DependencyNode>,
    #[serde(default)]
    edges: Vec<DependencyEdge>,
}

#[derive(Debug, Deserialize)]
struct RelatedProjectKey {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct RelatedProject {
    #[serde(rename = "projectKey", default = "default_project_key")]
    project_key: RelatedProjectKey,
    #[serde(rename = "relationType", default)]
    relation_type: String,
}

fn default_project_key() -> RelatedProjectKey {
    RelatedProjectKey { id: String::new() }
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(rename = "relatedProjects", default)]
    related_projects: Vec<RelatedProject>,
}

/// HTTP client for the deps.dev v3alpha API.
#[derive(Debug, Clone)]
pub struct DepsDevClient {
    http: Client,
    base_url: String,
}

impl DepsDevClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn api_base(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v3alpha") {
            base.to_string()
        } else {
            format!("{}/v3alpha", base)
        }
    }

    /// Fetch direct dependencies and, best effort, the source repository for
    /// one package version.
    pub async fn package_version(
        &self,
        system: &str,
        package: &str,
        version: &str,
    ) -> Result<PackageVersionInfo, ProviderError> {
        let dependencies = self.dependencies(system, package, version).await?;
        let repository = self.source_repository(system, package, version).await;
        Ok(PackageVersionInfo {
            dependencies,
            repository,
        })
    }

    /// GetDependencies: the resolved direct-dependency edges of the root node.
    async fn dependencies(
        &self,
        system: &str,
        package: &str,
        version: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        let url = format!(
            "{}/systems/{}/packages/{}/versions/{}:dependencies",
            self.api_base(),
            urlencoding::encode(system),
            urlencoding::encode(package),
            urlencoding::encode(version),
        );
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        let body: DependenciesResponse = response.json().await?;

        // Keep only edges leaving the root node.
        let mut dependencies = BTreeMap::new();
        for edge in &body.edges {
            if edge.from_node != 0 || edge.to_node >= body.nodes.len() {
                continue;
            }
            let node = &body.nodes[edge.to_node];
            dependencies.insert(
                node.version_key.name.clone(),
                node.version_key.version.clone(),
            );
        }
        Ok(dependencies)
    }

    /// GetVersion, reduced to the SOURCE_REPO related project. Failures are
    /// swallowed: a missing repository never fails a resolution.
    async fn source_repository(
        &self,
        system: &str,
        package: &str,
        version: &str,
    ) -> Option<String> {
        let url = format!(
            "{}/systems/{}/packages/{}/versions/{}",
            self.api_base(),
            urlencoding::encode(system),
            urlencoding::encode(package),
            urlencoding::encode(version),
        );
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("version lookup failed for {}/{}: {}", system, package, e);
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }
        let body: VersionResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                debug!("version decode failed for {}/{}: {}", system, package, e);
                return None;
            }
        };
        body.related_projects
            .iter()
            .find(|p| p.relation_type.eq_ignore_ascii_case("SOURCE_REPO"))
            .map(|p| p.project_key.id.clone())
            .filter(|id| !id.is_empty())
    }
}

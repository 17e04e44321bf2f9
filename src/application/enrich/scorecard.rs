//! Scorecard enrichment
//!
//! Resolves each package to a source repository (resolved index first, then
//! the heuristic guess) and queries the scorecard service per repository.
//! Packages without a resolvable repository are skipped; failures are
//! omitted from the result map.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::{repository_hint, PackageCoordinate};
use crate::infrastructure::scorecard::ScorecardClient;

pub struct ScorecardEnricher {
    client: Arc<ScorecardClient>,
}

impl ScorecardEnricher {
    pub fn new(client: Arc<ScorecardClient>) -> Self {
        Self { client }
    }

    /// Map package identifier -> scorecard record for the root and every
    /// dependency with a resolvable repository.
    pub async fn enrich(
        &self,
        root: &PackageCoordinate,
        dependencies: &BTreeMap<String, String>,
        repositories: &BTreeMap<String, String>,
    ) -> BTreeMap<String, Value> {
        let mut result = BTreeMap::new();

        let root_identifier = root.identifier();
        if let Some(repository) = repositories
            .get(&root_identifier)
            .cloned()
            .or_else(|| repository_hint(root.ecosystem, &root_identifier))
        {
            match self.client.project(&repository).await {
                Ok(record) => {
                    result.insert(root_identifier, record);
                }
                Err(e) => debug!("scorecard lookup failed for {}: {}", repository, e),
            }
        }

        for dependency in dependencies.keys() {
            let repository = repositories
                .get(dependency)
                .cloned()
                .or_else(|| repository_hint(root.ecosystem, dependency));
            let Some(repository) = repository else {
                continue;
            };
            match self.client.project(&repository).await {
                Ok(record) => {
                    result.insert(dependency.clone(), record);
                }
                Err(e) => debug!("scorecard lookup failed for {}: {}", repository, e),
            }
        }

        result
    }
}

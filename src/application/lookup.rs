//! Lookup pipeline
//!
//! Orchestrates one lookup end to end: cache read, resolution, optional
//! enrichment, serialization, cache write. On a cache hit the previously
//! serialized body is returned verbatim without re-running anything.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::PackageCoordinate;
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::osv::OsvVulnerability;

use super::cache_key::LookupFlags;
use super::enrich::{ScorecardEnricher, VulnerabilityEnricher};
use super::errors::LookupError;
use super::export;
use super::resolver::ResolutionService;

/// Whether a response was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// The serialized lookup result document. This exact shape is what gets
/// cached, so cached and freshly computed responses are indistinguishable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LookupDocument {
    /// dependency name -> resolved version.
    pub dependencies: BTreeMap<String, String>,
    /// Provenance, present in recursive mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<BTreeMap<String, Vec<String>>>,
    /// package identifier -> source repository.
    pub repositories: BTreeMap<String, String>,
    /// Subtrees that could not be expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// package identifier -> vulnerability records (vuln flag only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub vulnerabilities: Option<BTreeMap<String, Vec<OsvVulnerability>>>,
    /// package identifier -> scorecard record (scorecard flag only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub scorecards: Option<BTreeMap<String, Value>>,
}

/// Result body plus the cache verdict for the response headers.
#[derive(Debug)]
pub struct LookupOutcome {
    pub body: String,
    pub cache_status: CacheStatus,
}

pub struct LookupService {
    resolver: ResolutionService,
    vulnerabilities: VulnerabilityEnricher,
    scorecards: ScorecardEnricher,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl LookupService {
    pub fn new(
        resolver: ResolutionService,
        vulnerabilities: VulnerabilityEnricher,
        scorecards: ScorecardEnricher,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: Duration,
    ) -> Self {
        Self {
            resolver,
            vulnerabilities,
            scorecards,
            cache,
            ttl,
        }
    }

    /// Run the pipeline for an already validated coordinate under the given
    /// cache key. Graph mode renders dot text instead of JSON and skips
    /// enrichment.
    pub async fn execute(
        &self,
        coordinate: &PackageCoordinate,
        flags: &LookupFlags,
        cache_key: &str,
    ) -> Result<LookupOutcome, LookupError> {
        if let Some(cache) = &self.cache {
            if let Ok(Some(hit)) = cache.get(cache_key).await {
                return Ok(LookupOutcome {
                    body: hit,
                    cache_status: CacheStatus::Hit,
                });
            }
        }

        let graph = self.resolver.resolve(coordinate, flags.recursive).await?;

        let body = if flags.graph {
            export::render_dot(&coordinate.identifier(), &graph.dependencies)
        } else {
            let mut document = LookupDocument {
                dependencies: graph.dependencies,
                parents: flags.recursive.then_some(graph.parents),
                repositories: graph.repositories,
                errors: (!graph.errors.is_empty()).then_some(graph.errors),
                vulnerabilities: None,
                scorecards: None,
            };

            if flags.vuln {
                let vulnerabilities = self
                    .vulnerabilities
                    .enrich(coordinate, &document.dependencies)
                    .await;
                if !vulnerabilities.is_empty() {
                    document.vulnerabilities = Some(vulnerabilities);
                }
            }
            if flags.scorecard {
                let scorecards = self
                    .scorecards
                    .enrich(coordinate, &document.dependencies, &document.repositories)
                    .await;
                if !scorecards.is_empty() {
                    document.scorecards = Some(scorecards);
                }
            }

            serde_json::to_string(&document).map_err(|e| LookupError::Internal(e.to_string()))?
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(cache_key, &body, self.ttl).await {
                warn!("failed to cache lookup result for {}: {}", cache_key, e);
            }
        }

        Ok(LookupOutcome {
            body,
            cache_status: CacheStatus::Miss,
        })
    }
}

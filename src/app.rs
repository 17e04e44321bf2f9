//! Application setup and wiring
//!
//! All collaborators are constructed here and passed down explicitly; there
//! is no process-wide registry.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use reqwest::Client;
use tracing::warn;

use crate::application::{
    LookupService, ResolutionLimits, ResolutionService, ScorecardEnricher, VulnerabilityEnricher,
};
use crate::config::Config;
use crate::infrastructure::adapters::AdapterRegistry;
use crate::infrastructure::cache::{CacheStore, RedisCacheStore};
use crate::infrastructure::github::GitHubClient;
use crate::infrastructure::osv::OsvClient;
use crate::infrastructure::registry_search::NpmSearchClient;
use crate::infrastructure::scorecard::ScorecardClient;
use crate::presentation::{create_router, AppState};

fn http_client(timeout_seconds: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
}

/// Construct the application router with all collaborators wired up.
///
/// An unreachable cache store downgrades to running uncached; resolution
/// correctness never depends on it.
pub async fn create_app(config: Config) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let cache: Option<Arc<dyn CacheStore>> = if config.cache.enabled {
        match RedisCacheStore::connect(&config.cache.url).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("cache store unavailable, continuing uncached: {}", e);
                None
            }
        }
    } else {
        None
    };
    let ttl = Duration::from_secs(config.cache.ttl_seconds);

    let registry = Arc::new(AdapterRegistry::from_config(
        http_client(config.providers.timeout_seconds)?,
        &config.providers,
    ));
    let resolver = ResolutionService::new(
        registry,
        ResolutionLimits {
            max_depth: config.resolver.max_depth,
            max_nodes: config.resolver.max_nodes,
        },
    );

    let osv = Arc::new(OsvClient::new(
        http_client(config.apis.osv.timeout_seconds)?,
        config.apis.osv.base_url.clone(),
    ));
    let vulnerabilities = VulnerabilityEnricher::new(osv, cache.clone(), ttl);

    let scorecard_client = Arc::new(ScorecardClient::new(
        http_client(config.apis.scorecard.timeout_seconds)?,
        config.apis.scorecard.base_url.clone(),
    ));
    let scorecards = ScorecardEnricher::new(scorecard_client);

    let lookup = Arc::new(LookupService::new(
        resolver,
        vulnerabilities,
        scorecards,
        cache.clone(),
        ttl,
    ));
    let github = Arc::new(GitHubClient::new(
        http_client(config.apis.github.timeout_seconds)?,
        config.apis.github.base_url.clone(),
        config.apis.github.token.clone(),
    ));
    let search = Arc::new(NpmSearchClient::new(
        http_client(config.apis.search.timeout_seconds)?,
        config.apis.search.base_url.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        lookup,
        github,
        search,
        cache,
    };
    Ok(create_router(state, &config))
}

//! Ecosystem adapters over the shared metadata provider
//!
//! One adapter per ecosystem; each one only knows how to format its package
//! identifier before delegating to the deps.dev client. The registry is
//! constructed once in `app.rs` and passed down explicitly so resolvers can
//! be tested with a registry of fakes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::PackageManagerConfig;
use crate::domain::Ecosystem;

use super::deps_dev::{DepsDevClient, PackageVersionInfo, ProviderError};

/// Fetches the direct-dependency list and, if known, a source repository for
/// one coordinate in a single ecosystem.
#[async_trait]
pub trait EcosystemAdapter: Send + Sync {
    async fn dependencies(
        &self,
        namespace: Option<&str>,
        name: &str,
        version: &str,
    ) -> Result<PackageVersionInfo, ProviderError>;
}

/// Adapter backed by the deps.dev API.
pub struct DepsDevAdapter {
    ecosystem: Ecosystem,
    client: DepsDevClient,
}

impl DepsDevAdapter {
    pub fn new(ecosystem: Ecosystem, client: DepsDevClient) -> Self {
        Self { ecosystem, client }
    }
}

#[async_trait]
impl EcosystemAdapter for DepsDevAdapter {
    async fn dependencies(
        &self,
        namespace: Option<&str>,
        name: &str,
        version: &str,
    ) -> Result<PackageVersionInfo, ProviderError> {
        let package = self.ecosystem.format_package(namespace, name);
        self.client
            .package_version(self.ecosystem.canonical_name(), &package, version)
            .await
    }
}

/// Explicit ecosystem -> adapter mapping, passed to the resolver.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Ecosystem, Arc<dyn EcosystemAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full registry from the configured provider base URLs.
    pub fn from_config(http: Client, config: &PackageManagerConfig) -> Self {
        let mut registry = Self::new();
        for ecosystem in Ecosystem::ALL {
            let base_url = config.base_url(ecosystem);
            let client = DepsDevClient::new(http.clone(), base_url);
            registry.insert(ecosystem, Arc::new(DepsDevAdapter::new(ecosystem, client)));
        }
        registry
    }

    pub fn insert(&mut self, ecosystem: Ecosystem, adapter: Arc<dyn EcosystemAdapter>) {
        self.adapters.insert(ecosystem, adapter);
    }

    pub fn get(&self, ecosystem: Ecosystem) -> Option<Arc<dyn EcosystemAdapter>> {
        self.adapters.get(&ecosystem).cloned()
    }
}

//! Shared test fixtures: an in-memory ecosystem adapter

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use depscope::domain::Ecosystem;
use depscope::infrastructure::adapters::{AdapterRegistry, EcosystemAdapter};
use depscope::infrastructure::deps_dev::{PackageVersionInfo, ProviderError};

/// Adapter backed by fixed maps, keyed on `namespace:name:version`.
#[derive(Default)]
pub struct FakeAdapter {
    dependencies: HashMap<String, BTreeMap<String, String>>,
    repositories: HashMap<String, String>,
    failures: HashMap<String, u16>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(namespace: Option<&str>, name: &str, version: &str) -> String {
        format!("{}:{}:{}", namespace.unwrap_or(""), name, version)
    }

    pub fn with_dependencies(
        mut self,
        namespace: &str,
        name: &str,
        version: &str,
        edges: &[(&str, &str)],
    ) -> Self {
        let key = Self::key(Some(namespace).filter(|ns| !ns.is_empty()), name, version);
        let edges = edges
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.dependencies.insert(key, edges);
        self
    }

    pub fn with_repository(
        mut self,
        namespace: &str,
        name: &str,
        version: &str,
        repository: &str,
    ) -> Self {
        let key = Self::key(Some(namespace).filter(|ns| !ns.is_empty()), name, version);
        self.repositories.insert(key, repository.to_string());
        self
    }

    pub fn with_failure(mut self, namespace: &str, name: &str, version: &str, status: u16) -> Self {
        let key = Self::key(Some(namespace).filter(|ns| !ns.is_empty()), name, version);
        self.failures.insert(key, status);
        self
    }
}

#[async_trait]
impl EcosystemAdapter for FakeAdapter {
    async fn dependencies(
        &self,
        namespace: Option<&str>,
        name: &str,
        version: &str,
    ) -> Result<PackageVersionInfo, ProviderError> {
        let key = Self::key(namespace, name, version);
        if let Some(status) = self.failures.get(&key) {
            return Err(if *status == 404 {
                ProviderError::NotFound
            } else {
                ProviderError::Status(*status)
            });
        }
        Ok(PackageVersionInfo {
            dependencies: self.dependencies.get(&key).cloned().unwrap_or_default(),
            repository: self.repositories.get(&key).cloned(),
        })
    }
}

/// Registry containing a single fake adapter for one ecosystem.
pub fn registry_with(ecosystem: Ecosystem, adapter: FakeAdapter) -> Arc<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();
    registry.insert(ecosystem, Arc::new(adapter));
    Arc::new(registry)
}

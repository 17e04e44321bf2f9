//! Vulnerability enrichment
//!
//! Best-effort OSV lookups for the root and every resolved dependency.
//! Packages with no vulnerabilities are omitted from the result map; absence
//! signals "clean". Records without severity data get an opportunistic
//! backfill from alias identifiers and reference-URL tails.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::application::cache_key;
use crate::domain::PackageCoordinate;
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::osv::{FeedError, OsvClient, OsvVulnerability};

pub struct VulnerabilityEnricher {
    osv: Arc<OsvClient>,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl VulnerabilityEnricher {
    pub fn new(osv: Arc<OsvClient>, cache: Option<Arc<dyn CacheStore>>, ttl: Duration) -> Self {
        Self { osv, cache, ttl }
    }

    /// Map package identifier -> known vulnerabilities for the root and every
    /// entry of the dependency map. Lookup failures drop the package from the
    /// result, never the whole request.
    pub async fn enrich(
        &self,
        root: &PackageCoordinate,
        dependencies: &BTreeMap<String, String>,
    ) -> BTreeMap<String, Vec<OsvVulnerability>> {
        let ecosystem = root.ecosystem.osv_name();
        let mut result = BTreeMap::new();

        let root_identifier = root.identifier();
        match self.fetch(ecosystem, &root_identifier, &root.version).await {
            Ok(vulns) if !vulns.is_empty() => {
                result.insert(root_identifier, vulns);
            }
            Ok(_) => {}
            Err(e) => debug!("vulnerability lookup failed for {}: {}", root_identifier, e),
        }

        for (dependency, version) in dependencies {
            match self.fetch(ecosystem, dependency, version).await {
                Ok(vulns) if !vulns.is_empty() => {
                    result.insert(dependency.clone(), vulns);
                }
                Ok(_) => {}
                Err(e) => debug!("vulnerability lookup failed for {}: {}", dependency, e),
            }
        }

        result
    }

    /// Feed responses are cached independently of the outer request cache,
    /// keyed by (ecosystem, package, version).
    async fn fetch(
        &self,
        ecosystem: &str,
        package: &str,
        version: &str,
    ) -> Result<Vec<OsvVulnerability>, FeedError> {
        let key = cache_key::vulnerability_feed_key(ecosystem, package, version);
        if let Some(cache) = &self.cache {
            if let Ok(Some(hit)) = cache.get(&key).await {
                if let Ok(cached) = serde_json::from_str::<Vec<OsvVulnerability>>(&hit) {
                    return Ok(cached);
                }
            }
        }

        let mut vulns = self.osv.query(ecosystem, package, version).await?;
        for vuln in &mut vulns {
            if !vuln.has_severity() {
                self.backfill_severity(vuln).await;
            }
        }

        if let Some(cache) = &self.cache {
            if let Ok(serialized) = serde_json::to_string(&vulns) {
                if let Err(e) = cache.set(&key, &serialized, self.ttl).await {
                    debug!("failed to cache feed response for {}: {}", key, e);
                }
            }
        }
        Ok(vulns)
    }

    /// Try candidate identifiers (aliases, then reference-URL tails) until one
    /// yields a non-empty severity list. Every failure is swallowed.
    async fn backfill_severity(&self, vuln: &mut OsvVulnerability) {
        let mut candidates: Vec<String> = vuln.aliases.clone();
        candidates.extend(
            vuln.references
                .iter()
                .filter_map(|r| alias_from_url(&r.url))
                .map(str::to_string),
        );

        for id in candidates {
            match self.osv.vulnerability(&id).await {
                Ok(aliased) => {
                    if let Some(Value::Array(entries)) = &aliased.severity {
                        if !entries.is_empty() {
                            vuln.severity = aliased.severity.clone();
                            return;
                        }
                    }
                }
                Err(e) => debug!("severity backfill via {} failed: {}", id, e),
            }
        }
    }
}

/// A potential OSV or CVE identifier from the trailing path segment of a
/// reference URL.
fn alias_from_url(url: &str) -> Option<&str> {
    let (_, tail) = url.rsplit_once('/')?;
    if tail.is_empty() {
        None
    } else {
        Some(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::alias_from_url;

    #[test]
    fn alias_extraction() {
        assert_eq!(
            alias_from_url("https://nvd.nist.gov/vuln/detail/CVE-2024-1234"),
            Some("CVE-2024-1234")
        );
        assert_eq!(alias_from_url("https://example.com/"), None);
        assert_eq!(alias_from_url("no-slash"), None);
    }
}

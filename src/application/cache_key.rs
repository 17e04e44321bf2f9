//! Deterministic cache key derivation
//!
//! Identical queries with identical flags must hit the same entry, so keys
//! are a pure function of the coordinate (or purl) and the flag set. Flag
//! suffixes are appended in a fixed order: traversal, vulnerability,
//! scorecard, then the graph output variant.
//!
//! Module-path ecosystems fold the namespace with `/` instead of `:` because
//! module paths themselves contain the separator other ecosystems use.

use crate::domain::PackageCoordinate;

/// Boolean switches accepted by every lookup route.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupFlags {
    pub recursive: bool,
    pub vuln: bool,
    pub scorecard: bool,
    pub graph: bool,
}

fn push_flag_suffixes(key: &mut String, flags: &LookupFlags) {
    if flags.recursive {
        key.push_str(":trans");
    }
    if flags.vuln {
        key.push_str(":v");
    }
    if flags.scorecard {
        key.push_str(":sc");
    }
    if flags.graph {
        key.push_str(":dot");
    }
}

/// Key for a coordinate-based lookup.
pub fn coordinate_key(coordinate: &PackageCoordinate, flags: &LookupFlags) -> String {
    let ecosystem = coordinate.ecosystem.canonical_name();
    let mut key = if coordinate.ecosystem.is_module_path() {
        format!(
            "{}:{}:{}",
            ecosystem,
            coordinate.identifier(),
            coordinate.version
        )
    } else {
        format!(
            "{}:{}:{}:{}",
            ecosystem,
            coordinate.namespace.as_deref().unwrap_or(""),
            coordinate.name,
            coordinate.version
        )
    };
    push_flag_suffixes(&mut key, flags);
    key
}

/// Key for a purl-based lookup; the canonical purl string is the identity.
pub fn purl_key(purl: &str, flags: &LookupFlags) -> String {
    let mut key = format!("purl:{}", purl);
    push_flag_suffixes(&mut key, flags);
    key
}

/// Key for a cached vulnerability feed response.
pub fn vulnerability_feed_key(ecosystem: &str, package: &str, version: &str) -> String {
    format!("osv:{}:{}@{}", ecosystem, package, version)
}

/// Key for a cached repository metadata document.
pub fn repo_metadata_key(repository: &str) -> String {
    format!("repometa:{}", repository)
}

/// Key for cached package-name suggestions.
pub fn suggest_key(ecosystem: &str, query: &str) -> String {
    format!("suggest:{}:{}", ecosystem, query)
}

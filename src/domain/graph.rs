//! Resolved dependency graph accumulators
//!
//! The resolver folds every subtree it expands into one `ResolvedGraph` using
//! fixed merge rules: first writer wins for dependency versions and
//! repositories, parents are a duplicate-free union, errors accumulate in
//! discovery order. The rules are order-insensitive so a concurrent resolver
//! only has to serialize the merge step itself.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::coordinate::Ecosystem;

/// Parent marker used for dependencies declared directly by the root.
pub const ROOT_PARENT: &str = "";

/// Cycle-breaking identity for one expanded node:
/// (name, ecosystem, normalized version).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitKey {
    pub name: String,
    pub ecosystem: Ecosystem,
    pub version: String,
}

impl VisitKey {
    pub fn new(name: impl Into<String>, ecosystem: Ecosystem, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ecosystem,
            version: version.into(),
        }
    }
}

/// Set of nodes already expanded within one request. Guarantees termination
/// on cyclic graphs and that no node is fetched twice per request.
#[derive(Debug, Default)]
pub struct VisitedSet(HashSet<VisitKey>);

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node as expanded. Returns false if it was already visited.
    pub fn insert(&mut self, key: VisitKey) -> bool {
        self.0.insert(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The merged result of a resolution: dependency versions, provenance and
/// subtree failures. Ordered maps keep serialized output deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedGraph {
    /// dependency name -> resolved version (first writer wins).
    pub dependencies: BTreeMap<String, String>,
    /// dependency name -> names that declared it (root is the empty string).
    pub parents: BTreeMap<String, Vec<String>>,
    /// formatted package identifier -> source repository.
    pub repositories: BTreeMap<String, String>,
    /// Human-readable subtree failures, `name@version: cause`.
    pub errors: Vec<String>,
}

impl ResolvedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dependency edge. Later discoveries of the same name at a
    /// different version are dropped, never overwritten.
    pub fn insert_dependency(&mut self, name: &str, version: &str) {
        self.dependencies
            .entry(name.to_string())
            .or_insert_with(|| version.to_string());
    }

    /// Record that `parent` declared `child`. Duplicate insertion is a no-op.
    pub fn record_parent(&mut self, child: &str, parent: &str) {
        let parents = self.parents.entry(child.to_string()).or_default();
        if !parents.iter().any(|p| p == parent) {
            parents.push(parent.to_string());
        }
    }

    /// Record the source repository for a package identifier. A node
    /// discovered deeper never overrides a shallower node's repository.
    pub fn insert_repository(&mut self, identifier: &str, repository: &str) {
        self.repositories
            .entry(identifier.to_string())
            .or_insert_with(|| repository.to_string());
    }

    pub fn push_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Fold another partial result into this one using the same
    /// first-write-wins / union rules.
    pub fn merge(&mut self, other: ResolvedGraph) {
        for (name, version) in &other.dependencies {
            self.insert_dependency(name, version);
        }
        for (child, parents) in &other.parents {
            for parent in parents {
                self.record_parent(child, parent);
            }
        }
        for (identifier, repository) in &other.repositories {
            self.insert_repository(identifier, repository);
        }
        self.errors.extend(other.errors);
    }
}

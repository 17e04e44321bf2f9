//! Transitive dependency resolution
//!
//! Queue-based breadth-first expansion of a root coordinate into a merged
//! `ResolvedGraph`. Siblings are fetched one at a time; callers must not
//! assume any ordering across them. A visited set keyed on
//! (name, ecosystem, normalized version) breaks cycles, and explicit depth
//! and node-count guards bound pathological graphs.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    normalize_requirement, repository_hint, split_dependency_key, Ecosystem, PackageCoordinate,
    ResolvedGraph, VisitKey, VisitedSet, ROOT_PARENT,
};
use crate::infrastructure::adapters::{AdapterRegistry, EcosystemAdapter};

use super::errors::ResolveError;

/// Guards against unbounded expansion on malformed upstream data.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for ResolutionLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_nodes: 2000,
        }
    }
}

/// A dependency waiting to be expanded.
struct PendingNode {
    /// Full dependency key as reported by the parent's edge list.
    key: String,
    namespace: Option<String>,
    name: String,
    /// Normalized version.
    version: String,
    depth: usize,
}

/// Expands a root coordinate into its merged dependency graph.
pub struct ResolutionService {
    registry: Arc<AdapterRegistry>,
    limits: ResolutionLimits,
}

impl ResolutionService {
    pub fn new(registry: Arc<AdapterRegistry>, limits: ResolutionLimits) -> Self {
        Self { registry, limits }
    }

    /// Resolve the root's dependencies. Non-recursive mode returns the
    /// adapter's direct edges verbatim plus the root repository; recursive
    /// mode walks the whole graph, tolerating subtree failures.
    pub async fn resolve(
        &self,
        root: &PackageCoordinate,
        recursive: bool,
    ) -> Result<ResolvedGraph, ResolveError> {
        let ecosystem = root.ecosystem;
        let adapter = self
            .registry
            .get(ecosystem)
            .ok_or_else(|| ResolveError::UnsupportedEcosystem(ecosystem.to_string()))?;

        let root_info = adapter
            .dependencies(root.namespace.as_deref(), &root.name, &root.version)
            .await
            .map_err(ResolveError::from_root)?;

        let mut graph = ResolvedGraph::new();
        let root_identifier = root.identifier();
        let root_repository = root_info
            .repository
            .clone()
            .or_else(|| repository_hint(ecosystem, &root_identifier));
        if let Some(repository) = root_repository {
            graph.insert_repository(&root_identifier, &repository);
        }

        if !recursive {
            for (name, version) in &root_info.dependencies {
                graph.insert_dependency(name, version);
            }
            return Ok(graph);
        }

        let mut visited = VisitedSet::new();
        visited.insert(VisitKey::new(
            root_identifier.clone(),
            ecosystem,
            root.version.clone(),
        ));

        let mut queue = VecDeque::new();
        admit_edges(
            &mut graph,
            &mut visited,
            &mut queue,
            ecosystem,
            ROOT_PARENT,
            &root_info.dependencies,
            1,
        );

        let mut depth_exceeded = false;
        let mut nodes_exceeded = false;
        while let Some(node) = queue.pop_front() {
            if node.depth > self.limits.max_depth {
                depth_exceeded = true;
                continue;
            }
            if graph.dependencies.len() >= self.limits.max_nodes {
                nodes_exceeded = true;
                break;
            }

            debug!(
                "expanding {}@{} (depth {})",
                node.key, node.version, node.depth
            );
            match adapter
                .dependencies(node.namespace.as_deref(), &node.name, &node.version)
                .await
            {
                Ok(info) => {
                    let repository = info
                        .repository
                        .or_else(|| repository_hint(ecosystem, &node.key));
                    if let Some(repository) = repository {
                        graph.insert_repository(&node.key, &repository);
                    }
                    admit_edges(
                        &mut graph,
                        &mut visited,
                        &mut queue,
                        ecosystem,
                        &node.key,
                        &info.dependencies,
                        node.depth + 1,
                    );
                }
                Err(e) => {
                    // One failed subtree never aborts the traversal.
                    warn!("subtree fetch failed for {}@{}: {}", node.key, node.version, e);
                    graph.push_error(format!("{}@{}: {}", node.key, node.version, e));
                }
            }
        }

        if depth_exceeded {
            graph.push_error(format!(
                "resolution truncated: maximum depth {} exceeded",
                self.limits.max_depth
            ));
        }
        if nodes_exceeded {
            graph.push_error(format!(
                "resolution truncated: maximum node count {} reached",
                self.limits.max_nodes
            ));
        }

        Ok(graph)
    }
}

/// Record one node's edges and enqueue the children not yet visited. The
/// edge and parent link are recorded even for visited children; only the
/// expansion is skipped.
fn admit_edges(
    graph: &mut ResolvedGraph,
    visited: &mut VisitedSet,
    queue: &mut VecDeque<PendingNode>,
    ecosystem: Ecosystem,
    parent: &str,
    edges: &std::collections::BTreeMap<String, String>,
    depth: usize,
) {
    for (dependency, requirement) in edges {
        let version = normalize_requirement(requirement);
        graph.insert_dependency(dependency, &version);
        graph.record_parent(dependency, parent);

        if visited.insert(VisitKey::new(dependency.clone(), ecosystem, version.clone())) {
            let (namespace, name) = split_dependency_key(dependency);
            queue.push_back(PendingNode {
                key: dependency.clone(),
                namespace: namespace.map(str::to_string),
                name: name.to_string(),
                version,
                depth,
            });
        }
    }
}

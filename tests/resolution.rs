//! Integration tests for transitive dependency resolution

mod common;

use depscope::application::errors::ResolveError;
use depscope::application::{ResolutionLimits, ResolutionService};
use depscope::domain::{Ecosystem, PackageCoordinate};

use common::{registry_with, FakeAdapter};

fn npm_service(adapter: FakeAdapter) -> ResolutionService {
    ResolutionService::new(
        registry_with(Ecosystem::Npm, adapter),
        ResolutionLimits::default(),
    )
}

fn npm_root(name: &str, version: &str) -> PackageCoordinate {
    PackageCoordinate::new(Ecosystem::Npm, None, name, version)
}

/// root -> {dep1, dep2}, dep1 -> {dep3}, dep3 -> {dep1} (cycle). The merged
/// graph holds each name once, parents are a union, and nothing errors.
#[tokio::test]
async fn recursive_merge_with_cycle() {
    let adapter = FakeAdapter::new()
        .with_dependencies("", "root", "1", &[("dep1", "1"), ("dep2", "2")])
        .with_dependencies("", "dep1", "1", &[("dep3", "3")])
        .with_dependencies("", "dep2", "2", &[])
        .with_dependencies("", "dep3", "3", &[("dep1", "1")])
        .with_repository("", "root", "1", "github.com/root/root")
        .with_repository("", "dep1", "1", "github.com/dep1/dep1")
        .with_repository("", "dep3", "3", "github.com/dep3/dep3");

    let graph = npm_service(adapter)
        .resolve(&npm_root("root", "1"), true)
        .await
        .unwrap();

    assert_eq!(graph.dependencies.len(), 3);
    assert_eq!(graph.dependencies["dep1"], "1");
    assert_eq!(graph.dependencies["dep2"], "2");
    assert_eq!(graph.dependencies["dep3"], "3");

    assert_eq!(graph.parents["dep1"], vec!["", "dep3"]);
    assert_eq!(graph.parents["dep2"], vec![""]);
    assert_eq!(graph.parents["dep3"], vec!["dep1"]);

    assert!(graph.errors.is_empty());

    assert_eq!(graph.repositories["root"], "github.com/root/root");
    assert_eq!(graph.repositories["dep1"], "github.com/dep1/dep1");
    assert_eq!(graph.repositories["dep3"], "github.com/dep3/dep3");
    assert!(!graph.repositories.contains_key("dep2"));
}

/// A failed subtree appends exactly one formatted error and never blocks
/// siblings.
#[tokio::test]
async fn subtree_failure_degrades_to_partial_result() {
    let adapter = FakeAdapter::new()
        .with_dependencies("", "root", "1", &[("dep1", "1"), ("dep2", "2")])
        .with_failure("", "dep1", "1", 500)
        .with_dependencies("", "dep2", "2", &[("dep4", "4")])
        .with_dependencies("", "dep4", "4", &[]);

    let graph = npm_service(adapter)
        .resolve(&npm_root("root", "1"), true)
        .await
        .unwrap();

    assert_eq!(
        graph.errors,
        vec!["dep1@1: metadata provider returned status 500"]
    );
    // dep1's edge is still recorded; its subtree is simply missing.
    assert_eq!(graph.dependencies["dep1"], "1");
    assert_eq!(graph.dependencies["dep2"], "2");
    assert_eq!(graph.dependencies["dep4"], "4");
}

/// Requirement strings are normalized before recursion, and the first
/// version seen for a name wins.
#[tokio::test]
async fn version_normalization_and_first_write_wins() {
    let adapter = FakeAdapter::new()
        .with_dependencies("", "root", "1", &[("dep1", "v1.2.3"), ("dep2", "2+build")])
        .with_dependencies("", "dep1", "1.2.3", &[("dep2", "9.9.9")])
        .with_dependencies("", "dep2", "2", &[]);

    let graph = npm_service(adapter)
        .resolve(&npm_root("root", "1"), true)
        .await
        .unwrap();

    assert_eq!(graph.dependencies["dep1"], "1.2.3");
    // dep2 was first seen at 2; the later 9.9.9 discovery is dropped.
    assert_eq!(graph.dependencies["dep2"], "2");
}

/// Non-recursive mode returns the adapter's direct edges verbatim plus the
/// root repository; no graph walk, no parents.
#[tokio::test]
async fn non_recursive_returns_direct_edges() {
    let adapter = FakeAdapter::new()
        .with_dependencies("", "root", "1", &[("dep1", "^1.0.0")])
        .with_repository("", "root", "1", "github.com/root/root");

    let graph = npm_service(adapter)
        .resolve(&npm_root("root", "1"), false)
        .await
        .unwrap();

    assert_eq!(graph.dependencies["dep1"], "^1.0.0");
    assert!(graph.parents.is_empty());
    assert_eq!(graph.repositories["root"], "github.com/root/root");
}

/// Module-path ecosystems fall back to the package identifier as the
/// repository when the provider reports none.
#[tokio::test]
async fn repository_falls_back_to_heuristic_guess() {
    let adapter =
        FakeAdapter::new().with_dependencies("github.com", "pkg/errors", "0.9.1", &[]);
    let service = ResolutionService::new(
        registry_with(Ecosystem::Go, adapter),
        ResolutionLimits::default(),
    );

    let root = PackageCoordinate::new(
        Ecosystem::Go,
        Some("github.com".to_string()),
        "pkg/errors",
        "0.9.1",
    );
    let graph = service.resolve(&root, true).await.unwrap();
    assert_eq!(
        graph.repositories["github.com/pkg/errors"],
        "github.com/pkg/errors"
    );
}

/// A missing root surfaces NotFound; any other root failure surfaces the
/// upstream error.
#[tokio::test]
async fn root_failures_are_fatal() {
    let adapter = FakeAdapter::new().with_failure("", "ghost", "1", 404);
    let err = npm_service(adapter)
        .resolve(&npm_root("ghost", "1"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound));

    let adapter = FakeAdapter::new().with_failure("", "flaky", "1", 502);
    let err = npm_service(adapter)
        .resolve(&npm_root("flaky", "1"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Upstream(_)));
}

#[tokio::test]
async fn unknown_ecosystem_is_rejected() {
    let adapter = FakeAdapter::new();
    let service = npm_service(adapter);
    let root = PackageCoordinate::new(Ecosystem::Cargo, None, "serde", "1.0.0");
    let err = service.resolve(&root, true).await.unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedEcosystem(_)));
}

/// The depth guard stops expansion and records a single truncation error.
#[tokio::test]
async fn depth_guard_truncates_deep_chains() {
    let adapter = FakeAdapter::new()
        .with_dependencies("", "root", "1", &[("a", "1")])
        .with_dependencies("", "a", "1", &[("b", "1")])
        .with_dependencies("", "b", "1", &[("c", "1")])
        .with_dependencies("", "c", "1", &[]);
    let service = ResolutionService::new(
        registry_with(Ecosystem::Npm, adapter),
        ResolutionLimits {
            max_depth: 1,
            max_nodes: 2000,
        },
    );

    let graph = service.resolve(&npm_root("root", "1"), true).await.unwrap();
    assert_eq!(graph.dependencies.len(), 2); // a expanded, b recorded but not expanded
    assert_eq!(graph.errors.len(), 1);
    assert!(graph.errors[0].contains("maximum depth"));
}

/// The node-count guard bounds fan-out instead of exhausting memory.
#[tokio::test]
async fn node_guard_truncates_wide_graphs() {
    let adapter = FakeAdapter::new()
        .with_dependencies(
            "",
            "root",
            "1",
            &[("a", "1"), ("b", "1"), ("c", "1"), ("d", "1")],
        )
        .with_dependencies("", "a", "1", &[])
        .with_dependencies("", "b", "1", &[])
        .with_dependencies("", "c", "1", &[])
        .with_dependencies("", "d", "1", &[]);
    let service = ResolutionService::new(
        registry_with(Ecosystem::Npm, adapter),
        ResolutionLimits {
            max_depth: 32,
            max_nodes: 2,
        },
    );

    let graph = service.resolve(&npm_root("root", "1"), true).await.unwrap();
    assert_eq!(graph.errors.len(), 1);
    assert!(graph.errors[0].contains("maximum node count"));
}

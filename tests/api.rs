//! Router-level integration tests with a fake adapter registry

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use depscope::application::{
    LookupService, ResolutionLimits, ResolutionService, ScorecardEnricher, VulnerabilityEnricher,
};
use depscope::config::Config;
use depscope::domain::Ecosystem;
use depscope::infrastructure::cache::{CacheStore, MemoryCacheStore};
use depscope::infrastructure::github::GitHubClient;
use depscope::infrastructure::osv::OsvClient;
use depscope::infrastructure::registry_search::NpmSearchClient;
use depscope::infrastructure::scorecard::ScorecardClient;
use depscope::presentation::{create_router, AppState};

use common::{registry_with, FakeAdapter};

/// Unroutable base for clients the test never exercises.
const UNUSED: &str = "http://127.0.0.1:1";

fn test_app(
    ecosystem: Ecosystem,
    adapter: FakeAdapter,
    cache: Option<Arc<dyn CacheStore>>,
) -> Router {
    let mut config = Config::default();
    config.server.enable_docs = false;
    let config = Arc::new(config);
    let ttl = Duration::from_secs(60);

    let resolver = ResolutionService::new(
        registry_with(ecosystem, adapter),
        ResolutionLimits::default(),
    );
    let http = reqwest::Client::new();
    let vulnerabilities = VulnerabilityEnricher::new(
        Arc::new(OsvClient::new(http.clone(), UNUSED)),
        cache.clone(),
        ttl,
    );
    let scorecards =
        ScorecardEnricher::new(Arc::new(ScorecardClient::new(http.clone(), UNUSED)));
    let lookup = Arc::new(LookupService::new(
        resolver,
        vulnerabilities,
        scorecards,
        cache.clone(),
        ttl,
    ));

    let state = AppState {
        config: config.clone(),
        lookup,
        github: Arc::new(GitHubClient::new(http.clone(), UNUSED, None)),
        search: Arc::new(NpmSearchClient::new(http, UNUSED)),
        cache,
    };
    create_router(state, &config)
}

fn sample_adapter() -> FakeAdapter {
    FakeAdapter::new()
        .with_dependencies("", "root", "1", &[("dep1", "1"), ("dep2", "2")])
        .with_dependencies("", "dep1", "1", &[])
        .with_dependencies("", "dep2", "2", &[])
        .with_repository("", "root", "1", "github.com/root/root")
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let cache_status = response
        .headers()
        .get("x-cache-status")
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, cache_status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn invalid_names_are_rejected_before_any_lookup() {
    let app = test_app(Ecosystem::Npm, FakeAdapter::new(), None);
    let (status, _, _) = get(&app, "/api/dependencies/npm/bad%20name/1.0.0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_package_manager_is_rejected() {
    let app = test_app(Ecosystem::Npm, FakeAdapter::new(), None);
    let (status, _, _) = get(&app, "/api/dependencies/hex/pkg/1.0.0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_root_returns_not_found() {
    let adapter = FakeAdapter::new().with_failure("", "ghost", "1", 404);
    let app = test_app(Ecosystem::Npm, adapter, None);
    let (status, _, _) = get(&app, "/api/dependencies/npm/ghost/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recursive_lookup_reports_cache_status() {
    let cache: Arc<dyn CacheStore> =
        Arc::new(MemoryCacheStore::new(64, Duration::from_secs(60)));
    let app = test_app(Ecosystem::Npm, sample_adapter(), Some(cache));

    let uri = "/api/dependencies/npm/root/1?recursive=true";
    let (status, cache_status, body) = get(&app, uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_status.as_deref(), Some("MISS"));

    let document: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(document["dependencies"]["dep1"], "1");
    assert_eq!(document["dependencies"]["dep2"], "2");
    assert_eq!(document["parents"]["dep1"][0], "");
    assert_eq!(document["repositories"]["root"], "github.com/root/root");
    assert!(document.get("errors").is_none());

    // The second identical request is served verbatim from the cache.
    let (status, cache_status, cached_body) = get(&app, uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_status.as_deref(), Some("HIT"));
    assert_eq!(cached_body, body);
}

#[tokio::test]
async fn non_recursive_lookup_has_no_parents() {
    let app = test_app(Ecosystem::Npm, sample_adapter(), None);
    let (status, _, body) = get(&app, "/api/dependencies/npm/root/1").await;
    assert_eq!(status, StatusCode::OK);

    let document: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(document["dependencies"]["dep1"], "1");
    assert!(document.get("parents").is_none());
}

#[tokio::test]
async fn generic_lookup_endpoint_accepts_query_parameters() {
    let app = test_app(Ecosystem::Npm, sample_adapter(), None);
    let (status, _, body) = get(
        &app,
        "/api/lookup?ecosystem=npm&name=root&version=1&recursive=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let document: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(document["parents"]["dep2"][0], "");

    let (status, _, _) = get(&app, "/api/lookup?ecosystem=npm&name=root").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purl_graph_mode_renders_dot_output() {
    let app = test_app(Ecosystem::Npm, sample_adapter(), None);
    let uri = "/api/purl/pkg:npm/root@1?recursive=true&graph=true";
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/vnd.graphviz"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("digraph deps {"));
    assert!(text.contains("\"root\" -> \"dep1\""));
    assert!(text.contains("\"root\" -> \"dep2\""));
}

#[tokio::test]
async fn go_module_route_splits_path_and_version() {
    let adapter = FakeAdapter::new()
        .with_dependencies("github.com", "pkg/errors", "0.9.1", &[("golang.org/x/sys", "v0.1.0")])
        .with_dependencies("golang.org", "x/sys", "0.1.0", &[]);
    let app = test_app(Ecosystem::Go, adapter, None);

    let (status, _, body) = get(
        &app,
        "/api/dependencies/go/github.com/pkg/errors/0.9.1?recursive=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let document: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(document["dependencies"]["golang.org/x/sys"], "0.1.0");
    // Module-path identifiers double as repository guesses.
    assert_eq!(
        document["repositories"]["github.com/pkg/errors"],
        "github.com/pkg/errors"
    );
}

#[tokio::test]
async fn config_endpoint_lists_provider_urls() {
    let app = test_app(Ecosystem::Npm, FakeAdapter::new(), None);
    let (status, _, body) = get(&app, "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    let document: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(document["npm"], "https://api.deps.dev");
}

#[tokio::test]
async fn suggest_rejects_unsupported_ecosystems() {
    let app = test_app(Ecosystem::Npm, FakeAdapter::new(), None);
    let (status, _, _) = get(&app, "/api/suggest/pypi/requests").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

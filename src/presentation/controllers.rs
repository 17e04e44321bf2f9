//! API controllers
//!
//! Thin handlers: validate inputs, derive the cache key, delegate to the
//! lookup pipeline, and map outcomes onto HTTP responses. Every lookup-style
//! response carries an `X-Cache-Status` header.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use crate::application::cache_key::{self, LookupFlags};
use crate::application::errors::LookupError;
use crate::application::lookup::{CacheStatus, LookupService};
use crate::config::{Config, PackageManagerConfig};
use crate::domain::{Ecosystem, PackageCoordinate};
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::github::GitHubClient;
use crate::infrastructure::registry_search::NpmSearchClient;

use super::models::{parse_flag, ErrorResponse, FlagParams, LookupQueryParams};

const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");
const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_GRAPHVIZ: &str = "text/vnd.graphviz";

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lookup: Arc<LookupService>,
    pub github: Arc<GitHubClient>,
    pub search: Arc<NpmSearchClient>,
    pub cache: Option<Arc<dyn CacheStore>>,
}

fn cached_response(content_type: &'static str, status: CacheStatus, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_str())),
        ],
        body,
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

fn parse_ecosystem(raw: &str) -> Result<Ecosystem, Response> {
    Ecosystem::from_str(raw).map_err(|_| bad_request("unsupported package manager"))
}

fn flags_from(params: &FlagParams) -> LookupFlags {
    LookupFlags {
        recursive: parse_flag(params.recursive.as_deref(), false),
        vuln: parse_flag(params.vuln.as_deref(), false),
        scorecard: parse_flag(params.scorecard.as_deref(), false),
        graph: parse_flag(params.graph.as_deref(), false),
    }
}

async fn run_lookup(
    state: &AppState,
    coordinate: &PackageCoordinate,
    flags: &LookupFlags,
    key: &str,
) -> Result<Response, LookupError> {
    let outcome = state.lookup.execute(coordinate, flags, key).await?;
    let content_type = if flags.graph {
        CONTENT_TYPE_GRAPHVIZ
    } else {
        CONTENT_TYPE_JSON
    };
    Ok(cached_response(content_type, outcome.cache_status, outcome.body))
}

/// GET /api/config - configured package-manager base URLs
#[utoipa::path(
    get,
    path = "/api/config",
    responses((status = 200, description = "Provider configuration")),
    tag = "config"
)]
pub async fn get_config(State(state): State<AppState>) -> Json<PackageManagerConfig> {
    Json(state.config.providers.clone())
}

/// GET /api/suggest/{ecosystem}/{query} - package name suggestions
#[utoipa::path(
    get,
    path = "/api/suggest/{ecosystem}/{query}",
    responses(
        (status = 200, description = "Suggestions", body = Vec<super::models::PackageSuggestion>),
        (status = 400, description = "Unsupported package manager", body = ErrorResponse)
    ),
    tag = "lookup"
)]
pub async fn suggest(
    State(state): State<AppState>,
    Path((ecosystem, query)): Path<(String, String)>,
) -> Response {
    // Only npm exposes a search endpoint we support.
    if ecosystem != "npm" {
        return bad_request("unsupported package manager");
    }
    if query.is_empty() {
        return bad_request("query required");
    }

    let key = cache_key::suggest_key(&ecosystem, &query);
    if let Some(cache) = &state.cache {
        if let Ok(Some(hit)) = cache.get(&key).await {
            return cached_response(CONTENT_TYPE_JSON, CacheStatus::Hit, hit);
        }
    }

    let results = match state.search.suggest(&query).await {
        Ok(results) => results,
        Err(e) => return internal_error(e.to_string()),
    };
    let body = match serde_json::to_string(&results) {
        Ok(body) => body,
        Err(e) => return internal_error(e.to_string()),
    };
    if let Some(cache) = &state.cache {
        let ttl = Duration::from_secs(state.config.cache.ttl_seconds);
        if let Err(e) = cache.set(&key, &body, ttl).await {
            warn!("failed to cache suggestions for {}: {}", key, e);
        }
    }
    cached_response(CONTENT_TYPE_JSON, CacheStatus::Miss, body)
}

/// GET /api/repo/{repo} - repository metadata
#[utoipa::path(
    get,
    path = "/api/repo/{repo}",
    responses(
        (status = 200, description = "Repository metadata", body = super::models::RepoMetadata),
        (status = 500, description = "Metadata service failure", body = ErrorResponse)
    ),
    tag = "repositories"
)]
pub async fn repo_metadata(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> Response {
    let repo = repo.trim_start_matches("github.com/").to_string();

    let key = cache_key::repo_metadata_key(&repo);
    if let Some(cache) = &state.cache {
        if let Ok(Some(hit)) = cache.get(&key).await {
            return cached_response(CONTENT_TYPE_JSON, CacheStatus::Hit, hit);
        }
    }

    let metadata = match state.github.repository(&repo).await {
        Ok(metadata) => metadata,
        Err(e) => return internal_error(e.to_string()),
    };
    let body = match serde_json::to_string(&metadata) {
        Ok(body) => body,
        Err(e) => return internal_error(e.to_string()),
    };
    if let Some(cache) = &state.cache {
        let ttl = Duration::from_secs(state.config.cache.ttl_seconds);
        if let Err(e) = cache.set(&key, &body, ttl).await {
            warn!("failed to cache repository metadata for {}: {}", key, e);
        }
    }
    cached_response(CONTENT_TYPE_JSON, CacheStatus::Miss, body)
}

/// GET /api/lookup - generic lookup via query parameters
#[utoipa::path(
    get,
    path = "/api/lookup",
    responses(
        (status = 200, description = "Resolved dependencies", body = super::models::LookupDocument),
        (status = 400, description = "Invalid coordinate", body = ErrorResponse),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "lookup"
)]
pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupQueryParams>,
) -> Result<Response, LookupError> {
    let (Some(ecosystem), Some(name), Some(version)) =
        (&params.ecosystem, &params.name, &params.version)
    else {
        return Ok(bad_request("ecosystem, name and version required"));
    };
    let ecosystem = match parse_ecosystem(ecosystem) {
        Ok(ecosystem) => ecosystem,
        Err(response) => return Ok(response),
    };

    let coordinate =
        PackageCoordinate::new(ecosystem, params.namespace.clone(), name.clone(), version.clone());
    coordinate.validate().map_err(LookupError::Coordinate)?;

    let flags = LookupFlags {
        recursive: parse_flag(params.recursive.as_deref(), false),
        vuln: parse_flag(params.vuln.as_deref(), false),
        scorecard: parse_flag(params.scorecard.as_deref(), false),
        graph: parse_flag(params.graph.as_deref(), false),
    };
    let key = cache_key::coordinate_key(&coordinate, &flags);
    run_lookup(&state, &coordinate, &flags, &key).await
}

/// GET /api/dependencies/{ecosystem}/{name}/{version}
#[utoipa::path(
    get,
    path = "/api/dependencies/{ecosystem}/{name}/{version}",
    responses(
        (status = 200, description = "Resolved dependencies", body = super::models::LookupDocument),
        (status = 400, description = "Invalid coordinate", body = ErrorResponse),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "lookup"
)]
pub async fn dependencies(
    State(state): State<AppState>,
    Path((ecosystem, name, version)): Path<(String, String, String)>,
    Query(params): Query<FlagParams>,
) -> Result<Response, LookupError> {
    let ecosystem = match parse_ecosystem(&ecosystem) {
        Ok(ecosystem) => ecosystem,
        Err(response) => return Ok(response),
    };
    let coordinate = PackageCoordinate::new(ecosystem, None, name, version);
    coordinate.validate().map_err(LookupError::Coordinate)?;

    let flags = flags_from(&params);
    let key = cache_key::coordinate_key(&coordinate, &flags);
    run_lookup(&state, &coordinate, &flags, &key).await
}

/// GET /api/dependencies/{ecosystem}/{namespace}/{name}/{version}
#[utoipa::path(
    get,
    path = "/api/dependencies/{ecosystem}/{namespace}/{name}/{version}",
    responses(
        (status = 200, description = "Resolved dependencies", body = super::models::LookupDocument),
        (status = 400, description = "Invalid coordinate", body = ErrorResponse),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "lookup"
)]
pub async fn dependencies_with_namespace(
    State(state): State<AppState>,
    Path((ecosystem, namespace, name, version)): Path<(String, String, String, String)>,
    Query(params): Query<FlagParams>,
) -> Result<Response, LookupError> {
    let ecosystem = match parse_ecosystem(&ecosystem) {
        Ok(ecosystem) => ecosystem,
        Err(response) => return Ok(response),
    };
    let coordinate = PackageCoordinate::new(ecosystem, Some(namespace), name, version);
    coordinate.validate().map_err(LookupError::Coordinate)?;

    let flags = flags_from(&params);
    let key = cache_key::coordinate_key(&coordinate, &flags);
    run_lookup(&state, &coordinate, &flags, &key).await
}

/// GET /api/dependencies/go/{module...}/{version} - module paths contain
/// slashes, so the whole tail is captured and the version split off the end.
#[utoipa::path(
    get,
    path = "/api/dependencies/go/{module}/{version}",
    responses(
        (status = 200, description = "Resolved dependencies", body = super::models::LookupDocument),
        (status = 400, description = "Invalid module path", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    tag = "lookup"
)]
pub async fn go_dependencies(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    Query(params): Query<FlagParams>,
) -> Result<Response, LookupError> {
    let Some((module, version)) = rest.rsplit_once('/') else {
        return Ok(bad_request("module and version required"));
    };

    // The first path segment is the namespace, the remainder the module name.
    let (namespace, name) = match module.split_once('/') {
        Some((ns, name)) => (Some(ns.to_string()), name.to_string()),
        None => (None, module.to_string()),
    };

    let coordinate = PackageCoordinate::new(Ecosystem::Go, namespace, name, version);
    coordinate.validate().map_err(LookupError::Coordinate)?;

    let flags = flags_from(&params);
    let key = cache_key::coordinate_key(&coordinate, &flags);
    run_lookup(&state, &coordinate, &flags, &key).await
}

/// GET /api/purl/{purl} - lookup via canonical package URL. With graph=true
/// the response is a Graphviz dot document instead of JSON.
#[utoipa::path(
    get,
    path = "/api/purl/{purl}",
    responses(
        (status = 200, description = "Resolved dependencies", body = super::models::LookupDocument),
        (status = 400, description = "Invalid purl", body = ErrorResponse),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "lookup"
)]
pub async fn purl_lookup(
    State(state): State<AppState>,
    Path(purl): Path<String>,
    Query(params): Query<FlagParams>,
) -> Result<Response, LookupError> {
    let coordinate = PackageCoordinate::from_purl(&purl).map_err(LookupError::Coordinate)?;

    let flags = flags_from(&params);
    let key = cache_key::purl_key(&purl, &flags);
    run_lookup(&state, &coordinate, &flags, &key).await
}

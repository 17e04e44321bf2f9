//! Route definitions and middleware stack

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;

use super::controllers::{
    dependencies, dependencies_with_namespace, get_config, go_dependencies, lookup, purl_lookup,
    repo_metadata, suggest, AppState,
};
use super::models::{ErrorResponse, LookupDocument, PackageSuggestion, RepoMetadata};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::get_config,
        crate::presentation::controllers::suggest,
        crate::presentation::controllers::repo_metadata,
        crate::presentation::controllers::lookup,
        crate::presentation::controllers::dependencies,
        crate::presentation::controllers::dependencies_with_namespace,
        crate::presentation::controllers::go_dependencies,
        crate::presentation::controllers::purl_lookup,
    ),
    components(schemas(LookupDocument, ErrorResponse, PackageSuggestion, RepoMetadata)),
    tags(
        (name = "lookup", description = "Dependency resolution endpoints"),
        (name = "repositories", description = "Source repository metadata"),
        (name = "config", description = "Service configuration")
    )
)]
struct ApiDoc;

/// Build the application router. The static UI is the fallback for anything
/// outside /api.
pub fn create_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let mut router = Router::new()
        .route("/api/config", get(get_config))
        .route("/api/suggest/{ecosystem}/{query}", get(suggest))
        .route("/api/repo/{*repo}", get(repo_metadata))
        .route("/api/lookup", get(lookup))
        .route("/api/purl/{*purl}", get(purl_lookup))
        .route("/api/dependencies/go/{*module}", get(go_dependencies))
        .route("/api/dependencies/{ecosystem}/{name}/{version}", get(dependencies))
        .route(
            "/api/dependencies/{ecosystem}/{namespace}/{name}/{version}",
            get(dependencies_with_namespace),
        );

    if config.server.enable_docs {
        router = router
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .fallback_service(ServeDir::new(&config.ui.directory))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_seconds,
                )))
                .layer(cors),
        )
        .with_state(state)
}

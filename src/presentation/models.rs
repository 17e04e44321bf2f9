//! Request/response models and error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::errors::{LookupError, ResolveError};

pub use crate::application::lookup::LookupDocument;
pub use crate::infrastructure::github::RepoMetadata;
pub use crate::infrastructure::registry_search::PackageSuggestion;

/// Standard error body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters of the generic lookup endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LookupQueryParams {
    pub ecosystem: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub recursive: Option<String>,
    pub vuln: Option<String>,
    pub scorecard: Option<String>,
    pub graph: Option<String>,
}

/// Boolean flags accepted by every dependency route.
#[derive(Debug, Default, Deserialize)]
pub struct FlagParams {
    pub recursive: Option<String>,
    pub vuln: Option<String>,
    pub scorecard: Option<String>,
    pub graph: Option<String>,
}

/// Parse a boolean query value; anything unparsable falls back to the
/// default rather than failing the request.
pub fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        None => default,
        Some(value) => value.parse().unwrap_or(default),
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LookupError::Coordinate(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            LookupError::Resolve(ResolveError::UnsupportedEcosystem(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            LookupError::Resolve(ResolveError::NotFound) => {
                (StatusCode::NOT_FOUND, "package not found".to_string())
            }
            LookupError::Resolve(ResolveError::Upstream(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            LookupError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.clone()),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

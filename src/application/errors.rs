//! Application error taxonomy
//!
//! Validation failures are rejected before any network call. Root fetch
//! failures abort the lookup and distinguish not-found from generic upstream
//! failure. Non-root subtree failures degrade to the graph's error log and
//! enrichment failures are dropped entirely, so neither appears here.

use crate::domain::CoordinateError;
use crate::infrastructure::deps_dev::ProviderError;

/// Errors that abort a resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unsupported package manager: {0}")]
    UnsupportedEcosystem(String),

    /// The root package or version does not exist upstream.
    #[error("package not found")]
    NotFound,

    /// The root fetch failed for any other reason.
    #[error("{0}")]
    Upstream(ProviderError),
}

impl ResolveError {
    /// Classify a root-level provider failure.
    pub fn from_root(error: ProviderError) -> Self {
        match error {
            ProviderError::NotFound => ResolveError::NotFound,
            other => ResolveError::Upstream(other),
        }
    }
}

/// Errors surfaced by the full lookup pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("internal error: {0}")]
    Internal(String),
}

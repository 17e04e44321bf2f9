//! Infrastructure layer - external collaborators and the cache store

pub mod adapters;
pub mod cache;
pub mod deps_dev;
pub mod github;
pub mod osv;
pub mod registry_search;
pub mod scorecard;

pub use adapters::{AdapterRegistry, DepsDevAdapter, EcosystemAdapter};
pub use cache::{CacheError, CacheStore, MemoryCacheStore, RedisCacheStore};
pub use deps_dev::{DepsDevClient, PackageVersionInfo, ProviderError};
pub use github::{GitHubClient, RepoMetadata, RepoMetadataError};
pub use osv::{FeedError, OsvClient, OsvReference, OsvVulnerability};
pub use registry_search::{NpmSearchClient, PackageSuggestion, SearchError};
pub use scorecard::{ScorecardClient, ScorecardError};

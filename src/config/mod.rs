//! Configuration management
//!
//! Layered loading via the `config` crate: `config/default`, then an
//! environment-specific file, then `config/local`, then `DEPSCOPE__`-prefixed
//! environment variables. Every section has working defaults so the service
//! starts with no config files at all.

use serde::{Deserialize, Serialize};

use crate::domain::Ecosystem;
use crate::infrastructure::{deps_dev, github, osv, registry_search, scorecard};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub providers: PackageManagerConfig,
    pub apis: ApiConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether to expose interactive API docs (Swagger UI).
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_docs: true,
            request_timeout_seconds: 60,
        }
    }
}

/// Cache configuration. The cache is a pure optimization: with `enabled`
/// false, or the store unreachable at startup, every request runs the full
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub url: String,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "redis://127.0.0.1:6379".to_string(),
            ttl_seconds: 3600,
        }
    }
}

/// Resolver guard rails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_nodes: 2000,
        }
    }
}

/// Metadata provider base URL per ecosystem. All default to deps.dev; the
/// split exists so individual ecosystems can be pointed at mirrors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    pub npm: String,
    pub pypi: String,
    pub go: String,
    pub maven: String,
    pub cargo: String,
    pub rubygems: String,
    pub nuget: String,
    pub composer: String,
    pub timeout_seconds: u64,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        let base = deps_dev::DEFAULT_BASE_URL.to_string();
        Self {
            npm: base.clone(),
            pypi: base.clone(),
            go: base.clone(),
            maven: base.clone(),
            cargo: base.clone(),
            rubygems: base.clone(),
            nuget: base.clone(),
            composer: base,
            timeout_seconds: 30,
        }
    }
}

impl PackageManagerConfig {
    pub fn base_url(&self, ecosystem: Ecosystem) -> &str {
        match ecosystem {
            Ecosystem::Npm => &self.npm,
            Ecosystem::PyPi => &self.pypi,
            Ecosystem::Go => &self.go,
            Ecosystem::Maven => &self.maven,
            Ecosystem::Cargo => &self.cargo,
            Ecosystem::RubyGems => &self.rubygems,
            Ecosystem::NuGet => &self.nuget,
            Ecosystem::Composer => &self.composer,
        }
    }
}

/// External API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub osv: OsvConfig,
    pub scorecard: ScorecardConfig,
    pub github: GitHubConfig,
    pub search: SearchConfig,
}

/// OSV vulnerability feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsvConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for OsvConfig {
    fn default() -> Self {
        Self {
            base_url: osv::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// OpenSSF Scorecard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ScorecardConfig {
    fn default() -> Self {
        Self {
            base_url: scorecard::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Repository metadata service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: github::DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_seconds: 30,
        }
    }
}

/// Package-name suggestion search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: registry_search::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Static UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub directory: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            directory: "ui".to_string(),
        }
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("configuration validation error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("DEPSCOPE").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::Validation("server.port must not be 0".into()));
        }
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(ConfigLoadError::Validation(
                "cache.ttl_seconds must be positive when the cache is enabled".into(),
            ));
        }
        if self.resolver.max_depth == 0 || self.resolver.max_nodes == 0 {
            return Err(ConfigLoadError::Validation(
                "resolver limits must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = Config::default();
        config.resolver.max_depth = 0;
        assert!(config.validate().is_err());
    }
}

//! depscope - transitive dependency exploration service
//!
//! Answers "what does package P@V depend on, transitively, and how risky are
//! those dependencies?" by expanding a coordinate against a shared
//! dependency-metadata provider and enriching the result with OSV
//! vulnerability data and OpenSSF Scorecard scores.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

mod app;

pub use app::create_app;
pub use config::Config;

use config::LoggingConfig;

/// Initialize the tracing subscriber from the logging configuration. The
/// `RUST_LOG` environment variable overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}

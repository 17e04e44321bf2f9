//! repometa - print repository metadata as pretty JSON
//!
//! Small companion CLI for the /api/repo endpoint's data source.

use std::time::Duration;

use clap::Parser;

use depscope::config::GitHubConfig;
use depscope::infrastructure::github::GitHubClient;

#[derive(Parser)]
#[command(name = "repometa", about = "Fetch source-repository metadata as JSON")]
struct Args {
    /// Repository in owner/repo form (a leading github.com/ is stripped)
    repo: String,

    /// API token for authenticated requests
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let defaults = GitHubConfig::default();

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(defaults.timeout_seconds))
        .build()?;
    let client = GitHubClient::new(http, defaults.base_url, args.token);

    let repo = args.repo.trim_start_matches("github.com/");
    let metadata = client.repository(repo).await?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

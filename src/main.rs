mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod report;
mod services;
#[cfg(test)]
mod test_support;
mod workflow;

use std::io;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, DEFAULT_API_BASE};
use crate::context::AppContext;
use crate::domain::repository::RepositorySlug;
use crate::error::{AppError, AppResult};
use crate::infra::http::ReqwestTransport;

const AFTER_HELP: &str = "\
Examples:
  gittrack torvalds/linux
  gittrack facebook/react --token YOUR_GITHUB_TOKEN
  gittrack --demo

Environment Variables:
  GITHUB_TOKEN       GitHub personal access token for authenticated requests
  GITTRACK_API_BASE  API base URL (GitHub Enterprise)
  RUST_LOG           Log filter, e.g. `gittrack=debug`";

#[derive(Parser)]
#[command(
    name = "gittrack",
    author,
    version,
    about = "Track GitHub repository activity and display key metrics",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Repository in format 'owner/repo' (e.g., 'torvalds/linux').
    #[arg(required_unless_present = "demo")]
    repository: Option<String>,

    /// GitHub personal access token (optional, for higher rate limits).
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GITTRACK_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Show simulated output without calling the API.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    match run().await {
        Ok(()) => {}
        // Already reported on stdout and through the log.
        Err(AppError::RepositoryUnavailable(_)) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let now = Local::now().naive_local();
    let mut stdout = io::stdout();

    if cli.demo {
        return cmd::demo::run(now, &mut stdout);
    }

    let repository = cli.repository.unwrap_or_default();
    let slug = RepositorySlug::parse(&repository)?;

    let config = AppConfig::load(cli.token, &cli.api_base)?;

    let transport = Arc::new(ReqwestTransport::from_config(&config)?);
    let context = AppContext::new(config, transport);

    cmd::track::run(&context, &slug, now, &mut stdout).await
}

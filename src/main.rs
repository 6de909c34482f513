//! Faultline CLI
//!
//! Two modes: `serve` runs the HTTP analysis service; `analyze` runs the
//! pipeline once for a message given on the command line and prints the
//! JSON report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use faultline::{AppConfig, OfflineRepository};
use faultline_api::{ApiServer, LlmAnalyzer};
use faultline_core::{AnalysisEngine, RepositoryReader};
use faultline_github::GithubClient;
use faultline_servicenow::IncidentClient;

#[derive(Parser)]
#[command(name = "faultline", version, about = "Error-to-diagnosis analysis service")]
struct Cli {
    /// Path to a TOML config file; defaults to the platform config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP analysis service
    Serve,
    /// Analyze one error message and print the JSON report
    Analyze {
        /// Raw error message text
        message: String,
        /// Skip repository resolution even when GitHub is configured
        #[arg(long)]
        no_repo: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Analyze { message, no_repo } => analyze_once(config, &message, no_repo).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let engine = Arc::new(AnalysisEngine::new(repository(&config, false)));
    let incidents = config
        .servicenow
        .clone()
        .map(|snow| Arc::new(IncidentClient::new(snow)));
    let llm = config.llm.clone().map(|llm| Arc::new(LlmAnalyzer::new(llm)));

    ApiServer::new(config.api.clone(), engine, incidents, llm)
        .start()
        .await
}

async fn analyze_once(config: AppConfig, message: &str, no_repo: bool) -> Result<()> {
    let engine = AnalysisEngine::new(repository(&config, no_repo));
    let outcome = engine.analyze(message).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn repository(config: &AppConfig, no_repo: bool) -> Arc<dyn RepositoryReader> {
    match (&config.github, no_repo) {
        (Some(github), false) => Arc::new(GithubClient::new(github.clone())),
        _ => Arc::new(OfflineRepository),
    }
}

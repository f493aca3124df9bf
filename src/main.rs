//! career-predictor server and one-shot CLI.
//!
//! Usage:
//!   career-predictor                      # serve HTTP (default)
//!   career-predictor serve
//!   career-predictor predict --profile ava.json

use anyhow::{Context, Result};
use career_predictor::{
    Profile, RecommendationProxy,
    config::Config,
    http::start_http_server,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "career-predictor")]
#[command(about = "Career recommendation proxy for a chat-completion model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Run a single prediction for a profile JSON file and print the result
    Predict {
        /// Path to a profile (or `{"assessmentData": ...}`) JSON file
        #[arg(long)]
        profile: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(
                "Starting career-predictor (model={}, upstream={})",
                config.upstream.model, config.upstream.base_url
            );
            start_http_server(&config).await
        }
        Commands::Predict { profile } => predict_once(&config, &profile).await,
    }
}

async fn predict_once(config: &Config, path: &Path) -> Result<()> {
    let body = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let profile = Profile::from_request_body(&body)
        .with_context(|| format!("parse profile from {}", path.display()))?;
    if let Err(issues) = profile.validate() {
        anyhow::bail!("Invalid profile: {}", issues.join(", "));
    }

    let proxy = RecommendationProxy::from_config(&config.upstream)?;
    let result = proxy.predict(&profile).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

mod agent;
mod bot;
mod cli;
mod config;
mod cover_letter;
mod errors;
mod llm_client;
mod menu;
mod models;
mod portals;
mod profile;
mod rate_limit;
mod scoring;
mod state;
mod tracking;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging. Stdout is reserved for reports and helper
    // command output read by the browser agent.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting jobbot v{}", env!("CARGO_PKG_VERSION"));

    // Build app state (profile, scorer, cover letters, browser agent, portals)
    let state = AppState::from_config(config)?;
    info!("Data directory: {}", state.config.data_dir.display());

    cli::run(cli, state).await
}

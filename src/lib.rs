pub mod analysis;
pub mod config;
pub mod curves;
pub mod dashboard;
pub mod dates;
pub mod log_parser;
pub mod markdown;
pub mod models;
pub mod plan;
pub mod sources;
pub mod weather;

#[cfg(test)]
mod test_utils;

use std::process::ExitCode;

use chrono::Local;
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{ConfigError, DashboardConfig};
use dashboard::{load_sources, render, DashboardState};
use sources::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error("Failed to start runtime: {0}")]
  Runtime(#[from] std::io::Error),

  #[error("Failed to serialize dashboard: {0}")]
  Serialize(#[from] serde_json::Error),
}

pub fn run() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  init_logger();

  match try_run() {
    Ok(json) => {
      println!("{}", json);
      ExitCode::SUCCESS
    }
    Err(e) => {
      error!("{}", e);
      ExitCode::FAILURE
    }
  }
}

fn try_run() -> Result<String, RunError> {
  let config = DashboardConfig::from_env()?;
  let today = Local::now().date_naive();

  let runtime = tokio::runtime::Runtime::new()?;
  let state = runtime.block_on(load_state(&config))?;

  let dashboard = render(&state, today);
  info!("Rendered dashboard for {}", today);
  Ok(serde_json::to_string_pretty(&dashboard)?)
}

/// Fetch all sources and apply the configured selections
pub async fn load_state(config: &DashboardConfig) -> Result<DashboardState, FetchError> {
  let client = Client::new();
  let sources = load_sources(config, &client).await?;

  Ok(
    DashboardState::from_sources(sources)
      .with_filter(config.filter)
      .with_mode(config.mode)
      .with_range(config.range),
  )
}

/// Logs go to stderr so stdout stays pure JSON. `RUST_LOG` overrides the default.
fn init_logger() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}


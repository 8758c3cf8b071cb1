//! Fetch everything the dashboard reads, concurrently

use reqwest::Client;
use tracing::{info, warn};

use crate::config::{DashboardConfig, WeatherConfig};
use crate::curves::CurvePoint;
use crate::sources::{fetch_json, fetch_text, FetchError};
use crate::weather::{load_weather, WeatherSummary};

/// Raw inputs; only the plan is required
#[derive(Debug, Clone, Default)]
pub struct Sources {
  pub plan: String,
  pub gear: Option<String>,
  pub archive: Option<String>,
  pub weather: Option<WeatherSummary>,
  pub power_curve: Option<Vec<CurvePoint>>,
  pub pace_curve: Option<Vec<CurvePoint>>,
}

/// Load the plan and every optional source.
///
/// Fails only if the plan cannot be fetched; other failures are logged and
/// leave their field empty.
pub async fn load_sources(
  config: &DashboardConfig,
  client: &Client,
) -> Result<Sources, FetchError> {
  let (plan, gear, archive, weather, power_curve, pace_curve) = tokio::join!(
    fetch_text(client, &config.plan_source),
    optional_text(client, config.gear_source.as_deref(), "gear guide"),
    optional_text(client, config.archive_source.as_deref(), "history archive"),
    optional_weather(client, &config.weather),
    optional_curve(client, config.power_curve_source.as_deref(), "power curve"),
    optional_curve(client, config.pace_curve_source.as_deref(), "pace curve"),
  );

  let plan = plan?;
  info!("Loaded plan from {} ({} bytes)", config.plan_source, plan.len());

  Ok(Sources {
    plan,
    gear,
    archive,
    weather,
    power_curve,
    pace_curve,
  })
}

fn degrade<T>(what: &str, result: Result<T, FetchError>) -> Option<T> {
  match result {
    Ok(value) => Some(value),
    Err(e) => {
      warn!("Skipping {}: {}", what, e);
      None
    }
  }
}

async fn optional_text(client: &Client, source: Option<&str>, what: &str) -> Option<String> {
  let source = source?;
  degrade(what, fetch_text(client, source).await)
}

async fn optional_curve(
  client: &Client,
  source: Option<&str>,
  what: &str,
) -> Option<Vec<CurvePoint>> {
  let source = source?;
  degrade(what, fetch_json(client, source).await)
}

async fn optional_weather(client: &Client, config: &WeatherConfig) -> Option<WeatherSummary> {
  if !config.enabled {
    return None;
  }
  let result = load_weather(
    client,
    &config.geolocation_url,
    &config.api_url,
    config.location.clone(),
  )
  .await;
  degrade("weather", result)
}

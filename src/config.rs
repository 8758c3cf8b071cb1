//! Dashboard configuration from the environment (and `.env`)

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::analysis::{AdherenceMode, DisplayRange};
use crate::models::SportFilter;
use crate::weather::{Location, DEFAULT_GEOLOCATION_URL, DEFAULT_WEATHER_API_URL};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Invalid value for {key}: {message}")]
  Invalid { key: String, message: String },
}

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
  pub enabled: bool,
  /// Fixed coordinates; geolocation is skipped when set
  pub location: Option<Location>,
  pub geolocation_url: String,
  pub api_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
  pub plan_source: String,
  pub gear_source: Option<String>,
  pub archive_source: Option<String>,
  pub power_curve_source: Option<String>,
  pub pace_curve_source: Option<String>,
  pub weather: WeatherConfig,
  pub filter: SportFilter,
  pub range: DisplayRange,
  pub mode: AdherenceMode,
}

impl DashboardConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let plan_source =
      optional("PLAN_SOURCE").ok_or_else(|| ConfigError::MissingConfig("PLAN_SOURCE".into()))?;

    let location = match (
      parse_var::<f64>("WEATHER_LATITUDE")?,
      parse_var::<f64>("WEATHER_LONGITUDE")?,
    ) {
      (Some(latitude), Some(longitude)) => Some(Location {
        latitude,
        longitude,
        city: None,
      }),
      (None, None) => None,
      (Some(_), None) => return Err(ConfigError::MissingConfig("WEATHER_LONGITUDE".into())),
      (None, Some(_)) => return Err(ConfigError::MissingConfig("WEATHER_LATITUDE".into())),
    };

    Ok(Self {
      plan_source,
      gear_source: optional("GEAR_SOURCE"),
      archive_source: optional("ARCHIVE_SOURCE"),
      power_curve_source: optional("POWER_CURVE_SOURCE"),
      pace_curve_source: optional("PACE_CURVE_SOURCE"),
      weather: WeatherConfig {
        enabled: parse_flag("WEATHER_ENABLED")?.unwrap_or(true),
        location,
        geolocation_url: optional("GEOLOCATION_URL")
          .unwrap_or_else(|| DEFAULT_GEOLOCATION_URL.to_string()),
        api_url: optional("WEATHER_API_URL").unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string()),
      },
      filter: parse_var("DASHBOARD_SPORT")?.unwrap_or_default(),
      range: parse_var("DASHBOARD_RANGE")?.unwrap_or_default(),
      mode: parse_var("DASHBOARD_MODE")?.unwrap_or_default(),
    })
  }
}

/// Set and non-blank
fn optional(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
  T: FromStr,
  T::Err: Display,
{
  optional(key)
    .map(|raw| {
      raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
      })
    })
    .transpose()
}

fn parse_flag(key: &str) -> Result<Option<bool>, ConfigError> {
  optional(key)
    .map(|raw| match raw.to_lowercase().as_str() {
      "1" | "true" | "yes" | "on" => Ok(true),
      "0" | "false" | "no" | "off" => Ok(false),
      other => Err(ConfigError::Invalid {
        key: key.to_string(),
        message: format!("expected a boolean, got {}", other),
      }),
    })
    .transpose()
}

//! Weather badge data
//!
//! Location comes from an IP geolocation lookup unless coordinates are
//! configured; the forecast is an open-meteo style response. Both calls are
//! optional for the dashboard, so callers treat any error as "no weather".

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sources::{fetch_json, FetchError};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_POINTS: usize = 12;

/// ---------------------------------------------------------------------------
/// API Data Structures
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub latitude: f64,
  pub longitude: f64,
  #[serde(default)]
  pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
  pub current_weather: CurrentWeather,
  #[serde(default)]
  pub hourly: Option<HourlyForecast>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
  pub temperature: f64,
  pub weathercode: u16,
  #[serde(default)]
  pub windspeed: Option<f64>,
  #[serde(default)]
  pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HourlyForecast {
  pub time: Vec<String>,
  pub temperature_2m: Vec<f64>,
}

/// ---------------------------------------------------------------------------
/// Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTemp {
  pub time: String,
  pub temperature_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub city: Option<String>,
  pub temperature_c: f64,
  pub code: u16,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub wind_kmh: Option<f64>,
  pub hourly: Vec<HourlyTemp>,
}

impl WeatherSummary {
  pub fn from_forecast(forecast: ForecastResponse, city: Option<String>) -> Self {
    let current = forecast.current_weather;

    // Hourly series starts at midnight; begin at the current hour when we know it
    let hourly = forecast
      .hourly
      .map(|h| {
        let start = current
          .time
          .as_ref()
          .and_then(|now| h.time.iter().position(|t| t >= now))
          .unwrap_or(0);
        h.time
          .into_iter()
          .zip(h.temperature_2m)
          .skip(start)
          .take(HOURLY_POINTS)
          .map(|(time, temperature_c)| HourlyTemp { time, temperature_c })
          .collect()
      })
      .unwrap_or_default();

    Self {
      city,
      temperature_c: current.temperature,
      code: current.weathercode,
      description: describe_weather_code(current.weathercode).to_string(),
      wind_kmh: current.windspeed,
      hourly,
    }
  }
}

/// WMO weather interpretation codes
pub fn describe_weather_code(code: u16) -> &'static str {
  match code {
    0 => "Clear",
    1 => "Mostly clear",
    2 => "Partly cloudy",
    3 => "Overcast",
    45 | 48 => "Fog",
    51 | 53 | 55 => "Drizzle",
    56 | 57 => "Freezing drizzle",
    61 | 63 | 65 => "Rain",
    66 | 67 => "Freezing rain",
    71 | 73 | 75 | 77 => "Snow",
    80..=82 => "Rain showers",
    85 | 86 => "Snow showers",
    95 => "Thunderstorm",
    96 | 99 => "Thunderstorm with hail",
    _ => "Unknown",
  }
}

/// ---------------------------------------------------------------------------
/// Fetching
/// ---------------------------------------------------------------------------

pub async fn fetch_location(
  client: &Client,
  geolocation_url: &str,
) -> Result<Location, FetchError> {
  fetch_json(client, geolocation_url).await
}

pub async fn fetch_forecast(
  client: &Client,
  weather_api_url: &str,
  location: &Location,
) -> Result<ForecastResponse, FetchError> {
  let mut url = url::Url::parse(weather_api_url).map_err(|e| FetchError::Parse {
    origin: weather_api_url.to_string(),
    message: e.to_string(),
  })?;

  url
    .query_pairs_mut()
    .append_pair("latitude", &location.latitude.to_string())
    .append_pair("longitude", &location.longitude.to_string())
    .append_pair("current_weather", "true")
    .append_pair("hourly", "temperature_2m")
    .append_pair("timezone", "auto");

  fetch_json(client, url.as_str()).await
}

/// Resolve the location (unless given) and build the weather summary
pub async fn load_weather(
  client: &Client,
  geolocation_url: &str,
  weather_api_url: &str,
  fixed_location: Option<Location>,
) -> Result<WeatherSummary, FetchError> {
  let location = match fixed_location {
    Some(location) => location,
    None => fetch_location(client, geolocation_url).await?,
  };
  debug!(
    "Loading weather for {:.2},{:.2}",
    location.latitude, location.longitude
  );

  let forecast = fetch_forecast(client, weather_api_url, &location).await?;
  Ok(WeatherSummary::from_forecast(forecast, location.city))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Matcher;

  const FORECAST_JSON: &str = r#"{
    "current_weather": {"temperature": 18.4, "weathercode": 61, "windspeed": 12.0, "time": "2025-06-18T02:00"},
    "hourly": {
      "time": ["2025-06-18T00:00", "2025-06-18T01:00", "2025-06-18T02:00", "2025-06-18T03:00"],
      "temperature_2m": [16.0, 15.5, 18.4, 19.0]
    }
  }"#;

  #[test]
  fn test_describe_weather_code() {
    assert_eq!(describe_weather_code(0), "Clear");
    assert_eq!(describe_weather_code(63), "Rain");
    assert_eq!(describe_weather_code(81), "Rain showers");
    assert_eq!(describe_weather_code(99), "Thunderstorm with hail");
    assert_eq!(describe_weather_code(42), "Unknown");
  }

  #[test]
  fn test_summary_starts_at_current_hour() {
    let forecast: ForecastResponse = serde_json::from_str(FORECAST_JSON).unwrap();

    let summary = WeatherSummary::from_forecast(forecast, Some("Boulder".to_string()));

    assert_eq!(summary.description, "Rain");
    assert_eq!(summary.hourly.len(), 2);
    assert_eq!(summary.hourly[0].time, "2025-06-18T02:00");
    assert_eq!(summary.hourly[1].temperature_c, 19.0);
  }

  #[tokio::test]
  async fn test_load_weather_with_geolocation() {
    // Arrange
    let mut server = mockito::Server::new_async().await;
    let geo = server
      .mock("GET", "/json/")
      .with_status(200)
      .with_body(r#"{"latitude": 40.01, "longitude": -105.27, "city": "Boulder"}"#)
      .create_async()
      .await;
    let forecast = server
      .mock("GET", "/v1/forecast")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("latitude".into(), "40.01".into()),
        Matcher::UrlEncoded("current_weather".into(), "true".into()),
      ]))
      .with_status(200)
      .with_body(FORECAST_JSON)
      .create_async()
      .await;

    // Act
    let summary = load_weather(
      &Client::new(),
      &format!("{}/json/", server.url()),
      &format!("{}/v1/forecast", server.url()),
      None,
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(summary.city.as_deref(), Some("Boulder"));
    assert_eq!(summary.temperature_c, 18.4);
    geo.assert_async().await;
    forecast.assert_async().await;
  }

  #[tokio::test]
  async fn test_load_weather_skips_geolocation_when_fixed() {
    // Arrange
    let mut server = mockito::Server::new_async().await;
    let geo = server.mock("GET", "/json/").expect(0).create_async().await;
    server
      .mock("GET", "/v1/forecast")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(FORECAST_JSON)
      .create_async()
      .await;
    let fixed = Location {
      latitude: 47.6,
      longitude: -122.3,
      city: None,
    };

    // Act
    let summary = load_weather(
      &Client::new(),
      &format!("{}/json/", server.url()),
      &format!("{}/v1/forecast", server.url()),
      Some(fixed),
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(summary.city, None);
    geo.assert_async().await;
  }

  #[tokio::test]
  async fn test_load_weather_propagates_errors() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/json/")
      .with_status(503)
      .create_async()
      .await;

    let result = load_weather(
      &Client::new(),
      &format!("{}/json/", server.url()),
      &format!("{}/v1/forecast", server.url()),
      None,
    )
    .await;

    assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
  }
}

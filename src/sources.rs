//! Fetching plan documents and pre-computed JSON
//!
//! A source is either an http(s) URL or a path on disk, so the dashboard can
//! run against a published plan or a local checkout of it.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("{url} returned {status}")]
  Status { url: String, status: u16 },

  #[error("Failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse {origin}: {message}")]
  Parse { origin: String, message: String },
}

/// ---------------------------------------------------------------------------
/// Source Resolution
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
  Remote(Url),
  Local(String),
}

impl Source {
  pub fn parse(source: &str) -> Self {
    match Url::parse(source) {
      Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Remote(url),
      _ => Source::Local(source.to_string()),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Fetching
/// ---------------------------------------------------------------------------

/// Body of a URL or file as text
pub async fn fetch_text(client: &Client, source: &str) -> Result<String, FetchError> {
  match Source::parse(source) {
    Source::Remote(url) => {
      debug!("Fetching {}", url);
      let response = client.get(url.clone()).send().await?;

      if !response.status().is_success() {
        return Err(FetchError::Status {
          url: url.to_string(),
          status: response.status().as_u16(),
        });
      }

      Ok(response.text().await?)
    }
    Source::Local(path) => {
      debug!("Reading {}", path);
      tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| FetchError::Io { path, source })
    }
  }
}

/// Fetch and deserialize a JSON source
pub async fn fetch_json<T: DeserializeOwned>(
  client: &Client,
  source: &str,
) -> Result<T, FetchError> {
  let body = fetch_text(client, source).await?;
  serde_json::from_str(&body).map_err(|e| FetchError::Parse {
    origin: source.to_string(),
    message: e.to_string(),
  })
}

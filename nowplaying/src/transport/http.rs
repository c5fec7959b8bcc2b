use std::time::Duration;

use serde::de::DeserializeOwned;

use super::payload::{LyricsPayload, NowPlayingPayload};
use super::TrackSource;
use crate::error::{NowPlayingError, Result};
use crate::models::{LyricsStatus, PlayerStatus};

pub const NOW_PLAYING_PATH: &str = "/now_playing";
pub const LYRICS_PATH: &str = "/get_lyrics";

/// Polls the backend's JSON endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTrackSource {
  http_client: reqwest::Client,
  base_url: String,
}

impl HttpTrackSource {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    reqwest::Url::parse(base_url)
      .map_err(|e| NowPlayingError::InvalidConfiguration(format!("Invalid base URL {}: {}", base_url, e)))?;

    let http_client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| NowPlayingError::Network(e.to_string()))?;

    Ok(Self {
      http_client,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn endpoint(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let url = self.endpoint(path);
    log::debug!("GET {}", url);

    let response = self.http_client.get(&url).send().await?.error_for_status()?;
    let body = response.text().await?;

    Ok(serde_json::from_str(&body)?)
  }
}

impl TrackSource for HttpTrackSource {
  async fn now_playing(&self) -> Result<PlayerStatus> {
    let payload: NowPlayingPayload = self.get_json(NOW_PLAYING_PATH).await?;
    Ok(payload.into_status())
  }

  async fn lyrics(&self) -> Result<LyricsStatus> {
    let payload: LyricsPayload = self.get_json(LYRICS_PATH).await?;
    Ok(payload.into_status())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_joins_paths() {
    let source = HttpTrackSource::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();

    assert_eq!(source.base_url(), "http://127.0.0.1:5000");
    assert_eq!(source.endpoint(NOW_PLAYING_PATH), "http://127.0.0.1:5000/now_playing");
    assert_eq!(source.endpoint(LYRICS_PATH), "http://127.0.0.1:5000/get_lyrics");
  }

  #[test]
  fn test_rejects_invalid_base_url() {
    let result = HttpTrackSource::new("not a url", Duration::from_secs(1));
    assert!(matches!(result, Err(NowPlayingError::InvalidConfiguration(_))));
  }

  #[tokio::test]
  async fn test_unreachable_backend_is_an_error() {
    // Port 9 (discard) is not expected to run an HTTP server.
    let source = HttpTrackSource::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    assert!(source.now_playing().await.is_err());
  }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{LyricsStatus, PlayerStatus, TrackSnapshot};

/// Error string the backend sends when it has no user session.
pub const NOT_LOGGED_IN: &str = "Not logged in";

/// Body of `/now_playing` responses and push notifications.
///
/// Every field is optional. Numeric fields are kept as raw JSON so that nulls,
/// negative numbers, fractions and numeric strings can be normalized instead of
/// failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingPayload {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_playing: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub artist: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub album: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub album_art: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub progress_ms: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl NowPlayingPayload {
  /// Normalize the payload into a player status.
  ///
  /// A paused payload that still names a track becomes a paused snapshot so that
  /// resuming the same track is not reported as a change.
  pub fn into_status(self) -> PlayerStatus {
    if let Some(error) = self.error {
      return if error == NOT_LOGGED_IN {
        PlayerStatus::NotLoggedIn
      } else {
        PlayerStatus::Unavailable(error)
      };
    }

    let is_playing = self.is_playing.unwrap_or(false);
    if !is_playing && self.name.is_none() {
      return PlayerStatus::Idle;
    }

    let snapshot = TrackSnapshot {
      is_playing,
      title: self.name.unwrap_or_default(),
      artist: self.artist.unwrap_or_default(),
      album: self.album.unwrap_or_default(),
      album_art: self.album_art.filter(|url| !url.is_empty()),
      duration_ms: lenient_ms(self.duration_ms.as_ref()),
      elapsed_ms: lenient_ms(self.progress_ms.as_ref()),
    }
    .clamped();

    PlayerStatus::Track(snapshot)
  }
}

/// Body of `/get_lyrics` responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsPayload {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lyrics: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl LyricsPayload {
  pub fn into_status(self) -> LyricsStatus {
    if let Some(error) = self.error {
      return if error == NOT_LOGGED_IN {
        LyricsStatus::NotLoggedIn
      } else {
        LyricsStatus::Unavailable(error)
      };
    }

    match self.lyrics.map(|text| crate::lyrics::clean_lyrics(&text)) {
      Some(text) if !text.is_empty() => LyricsStatus::Found(text),
      _ => LyricsStatus::NotFound,
    }
  }
}

/// Read a millisecond value, mapping anything missing, negative or unparseable to 0.
pub fn lenient_ms(value: Option<&Value>) -> u64 {
  match value {
    Some(Value::Number(n)) => {
      if let Some(v) = n.as_u64() {
        v
      } else {
        n.as_f64().map_or(0, float_ms)
      }
    }
    Some(Value::String(s)) => s.trim().parse::<f64>().map_or(0, float_ms),
    _ => 0,
  }
}

fn float_ms(v: f64) -> u64 {
  if v.is_finite() && v > 0.0 {
    v.trunc() as u64
  } else {
    0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn status(value: Value) -> PlayerStatus {
    serde_json::from_value::<NowPlayingPayload>(value).unwrap().into_status()
  }

  #[test]
  fn test_playing_payload() {
    let status = status(json!({
      "is_playing": true,
      "name": "Song",
      "artist": "Band",
      "album": "Record",
      "album_art": "https://img.example/1.jpg",
      "duration_ms": 200000,
      "progress_ms": 12345
    }));

    let PlayerStatus::Track(snapshot) = status else {
      panic!("expected a track, got {:?}", status);
    };
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.title, "Song");
    assert_eq!(snapshot.artist, "Band");
    assert_eq!(snapshot.album, "Record");
    assert_eq!(snapshot.album_art.as_deref(), Some("https://img.example/1.jpg"));
    assert_eq!(snapshot.duration_ms, 200_000);
    assert_eq!(snapshot.elapsed_ms, 12_345);
  }

  #[test]
  fn test_not_logged_in() {
    assert_eq!(status(json!({"error": "Not logged in"})), PlayerStatus::NotLoggedIn);
  }

  #[test]
  fn test_other_error_is_unavailable() {
    assert_eq!(
      status(json!({"error": "Spotify is down"})),
      PlayerStatus::Unavailable("Spotify is down".to_string())
    );
  }

  #[test]
  fn test_not_playing_without_track_is_idle() {
    assert_eq!(status(json!({"is_playing": false})), PlayerStatus::Idle);
    assert_eq!(status(json!({})), PlayerStatus::Idle);
  }

  #[test]
  fn test_paused_with_track_keeps_snapshot() {
    let status = status(json!({
      "is_playing": false,
      "name": "Song",
      "artist": "Band",
      "duration_ms": 1000,
      "progress_ms": 500
    }));

    match status {
      PlayerStatus::Track(snapshot) => {
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.elapsed_ms, 500);
      }
      other => panic!("expected a paused track, got {:?}", other),
    }
  }

  #[test]
  fn test_malformed_numbers_are_normalized() {
    let status = status(json!({
      "is_playing": true,
      "name": "Song",
      "artist": "Band",
      "duration_ms": -5,
      "progress_ms": null
    }));

    let PlayerStatus::Track(snapshot) = status else {
      panic!("expected a track");
    };
    assert_eq!(snapshot.duration_ms, 0);
    assert_eq!(snapshot.elapsed_ms, 0);
    assert_eq!(snapshot.progress_fraction(), 0.0);
  }

  #[test]
  fn test_progress_beyond_duration_is_clamped() {
    let status = status(json!({
      "is_playing": true,
      "name": "Song",
      "artist": "Band",
      "duration_ms": 3000,
      "progress_ms": 9000
    }));

    let PlayerStatus::Track(snapshot) = status else {
      panic!("expected a track");
    };
    assert_eq!(snapshot.elapsed_ms, 3000);
  }

  #[test]
  fn test_lenient_ms() {
    assert_eq!(lenient_ms(None), 0);
    assert_eq!(lenient_ms(Some(&json!(1500))), 1500);
    assert_eq!(lenient_ms(Some(&json!(1500.9))), 1500);
    assert_eq!(lenient_ms(Some(&json!(-1))), 0);
    assert_eq!(lenient_ms(Some(&json!("2500"))), 2500);
    assert_eq!(lenient_ms(Some(&json!("abc"))), 0);
    assert_eq!(lenient_ms(Some(&json!(true))), 0);
  }

  #[test]
  fn test_lyrics_payload() {
    let found = LyricsPayload {
      lyrics: Some("  Rock &amp; roll\n".to_string()),
      error: None,
    };
    assert_eq!(found.into_status(), LyricsStatus::Found("Rock & roll".to_string()));

    let empty = LyricsPayload {
      lyrics: Some("   ".to_string()),
      error: None,
    };
    assert_eq!(empty.into_status(), LyricsStatus::NotFound);

    let logged_out = LyricsPayload {
      lyrics: None,
      error: Some(NOT_LOGGED_IN.to_string()),
    };
    assert_eq!(logged_out.into_status(), LyricsStatus::NotLoggedIn);

    let idle = LyricsPayload {
      lyrics: None,
      error: Some("No track currently playing".to_string()),
    };
    assert_eq!(
      idle.into_status(),
      LyricsStatus::Unavailable("No track currently playing".to_string())
    );
  }
}

use std::time::Duration;
use uuid::Uuid;

use crate::error::{NowPlayingError, Result};
use crate::models::{LyricsStatus, TrackSnapshot};
use crate::transport::NowPlayingPayload;

/// Unique identifier for a push channel.
///
/// It forms the callback path (`/push/{id}`) so that only a backend that was
/// handed the URL can deliver updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    /// Create a new random channel ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a channel ID from a UUID string
    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the UUID as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    /// Callback path the backend should POST to
    pub fn callback_path(&self) -> String {
        format!("/push/{}", self.0)
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A track update delivered through the push channel
#[derive(Debug, Clone)]
pub struct PushEvent {
    pub channel_id: ChannelId,
    pub payload: NowPlayingPayload,
}

impl PushEvent {
    pub fn new(channel_id: ChannelId, payload: NowPlayingPayload) -> Self {
        Self {
            channel_id,
            payload,
        }
    }
}

/// Everything the display layer needs to render the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// A different track (or the first one) is now current.
    TrackChanged(TrackSnapshot),
    /// Same track, fresh authoritative data.
    TrackRefreshed(TrackSnapshot),
    /// Position to show, either authoritative or extrapolated.
    Progress {
        elapsed_ms: u64,
        duration_ms: u64,
        is_playing: bool,
    },
    NotPlaying,
    NotLoggedIn,
    LyricsLoading,
    Lyrics(LyricsStatus),
    /// A poll or lookup failed. The session keeps running.
    FetchFailed(String),
    /// The push channel is accepting updates at this URL.
    PushListening(String),
}

/// Configuration for a now-playing session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// How often the backend is polled
    pub poll_interval: Duration,
    /// How often the local clock advances between polls
    pub tick_interval: Duration,
    /// Delay before re-polling once the local clock hits the end of a track
    pub end_grace: Duration,
    /// Timeout for each HTTP request
    pub request_timeout: Duration,
    /// Port range for the push callback server; `None` disables push
    pub push_port_range: Option<(u16, u16)>,
    /// Whether lyrics are fetched on track changes
    pub fetch_lyrics: bool,
}

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PUSH_PORT_RANGE: (u16, u16) = (8080, 8090);

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(3),
            tick_interval: Duration::from_secs(1),
            end_grace: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            push_port_range: None,
            fetch_lyrics: true,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polling only, no lyrics
    pub fn minimal() -> Self {
        Self {
            fetch_lyrics: false,
            ..Self::default()
        }
    }

    /// Polling plus the push channel on the default port range
    pub fn responsive() -> Self {
        Self {
            push_port_range: Some(DEFAULT_PUSH_PORT_RANGE),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> std::result::Result<Self, String> {
        reqwest::Url::parse(base_url).map_err(|e| format!("Invalid base URL {}: {}", base_url, e))?;
        self.base_url = base_url.to_string();
        Ok(self)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> std::result::Result<Self, String> {
        if interval.is_zero() {
            return Err("Poll interval must be greater than 0".to_string());
        }
        self.poll_interval = interval;
        Ok(self)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> std::result::Result<Self, String> {
        if interval.is_zero() {
            return Err("Tick interval must be greater than 0".to_string());
        }
        self.tick_interval = interval;
        Ok(self)
    }

    pub fn with_end_grace(mut self, grace: Duration) -> Self {
        self.end_grace = grace;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> std::result::Result<Self, String> {
        if timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Set the callback port range with validation
    pub fn with_push_ports(mut self, start: u16, end: u16) -> std::result::Result<Self, String> {
        validate_port_range(start, end)?;
        self.push_port_range = Some((start, end));
        Ok(self)
    }

    pub fn without_push(mut self) -> Self {
        self.push_port_range = None;
        self
    }

    pub fn with_lyrics(mut self, enabled: bool) -> Self {
        self.fetch_lyrics = enabled;
        self
    }

    /// Check every field, for configs assembled by hand
    pub fn validate(&self) -> Result<()> {
        let check = || -> std::result::Result<(), String> {
            reqwest::Url::parse(&self.base_url)
                .map_err(|e| format!("Invalid base URL {}: {}", self.base_url, e))?;
            if self.poll_interval.is_zero() {
                return Err("Poll interval must be greater than 0".to_string());
            }
            if self.tick_interval.is_zero() {
                return Err("Tick interval must be greater than 0".to_string());
            }
            if self.request_timeout.is_zero() {
                return Err("Request timeout must be greater than 0".to_string());
            }
            if let Some((start, end)) = self.push_port_range {
                validate_port_range(start, end)?;
            }
            Ok(())
        };

        check().map_err(NowPlayingError::InvalidConfiguration)
    }
}

fn validate_port_range(start: u16, end: u16) -> std::result::Result<(), String> {
    if start < 1024 {
        return Err("Callback port range must start at 1024 or above".to_string());
    }
    if start > end {
        return Err(format!("Invalid port range {}..{}", start, end));
    }
    Ok(())
}

/// Errors surfaced by the now-playing client.
///
/// None of these are fatal to a running session: the scheduler turns them into
/// display events and keeps ticking.
#[derive(Debug, thiserror::Error)]
pub enum NowPlayingError {
    #[error("Network communication error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server responded with status {status}")]
    HttpStatus { status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Fetch ended without a result")]
    FetchAborted,

    #[error("Session is not running")]
    SessionClosed,

    #[error("Shutdown failed")]
    ShutdownFailed,
}

impl From<reqwest::Error> for NowPlayingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NowPlayingError::Timeout(err.to_string())
        } else if err.is_decode() {
            NowPlayingError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            NowPlayingError::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            NowPlayingError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NowPlayingError {
    fn from(err: serde_json::Error) -> Self {
        NowPlayingError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NowPlayingError>;

pub mod http;
pub mod payload;

use std::future::Future;

use crate::error::Result;
use crate::models::{LyricsStatus, PlayerStatus};

pub use http::HttpTrackSource;
pub use payload::{LyricsPayload, NowPlayingPayload};

/// Where a session gets authoritative track data from.
///
/// [`HttpTrackSource`] is the production implementation; tests substitute an
/// in-memory source.
pub trait TrackSource: Send + Sync + 'static {
    /// Fetch the current player status.
    fn now_playing(&self) -> impl Future<Output = Result<PlayerStatus>> + Send;

    /// Fetch lyrics for whatever the backend is currently playing.
    fn lyrics(&self) -> impl Future<Output = Result<LyricsStatus>> + Send;
}

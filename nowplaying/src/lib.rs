pub mod error;
pub mod format;
pub mod lyrics;
pub mod models;
pub mod streaming;
pub mod tracker;
pub mod transport;

// Re-export key types for easier access
pub use error::{NowPlayingError, Result};
pub use format::format_time;
pub use models::{progress_fraction, LyricsStatus, PlayerStatus, TrackId, TrackSnapshot};
pub use streaming::{ActiveSession, DisplayEvent, SessionBuilder, SessionConfig};
pub use tracker::{PlaybackProgressTracker, TickOutcome};
pub use transport::{HttpTrackSource, TrackSource};

/// Identity of a track for change detection.
///
/// Two snapshots describe the same track when title and artist match; album,
/// artwork and timing are free to differ between refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId {
    pub title: String,
    pub artist: String,
}

impl TrackId {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Authoritative, point-in-time description of the playing track.
///
/// Snapshots are replaced wholesale on every update. Use [`TrackSnapshot::new`]
/// or [`TrackSnapshot::clamped`] so that `elapsed_ms <= duration_ms` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub is_playing: bool,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_art: Option<String>,
    pub duration_ms: u64,
    pub elapsed_ms: u64,
}

impl TrackSnapshot {
    /// Build a playing snapshot with the elapsed position clamped into the duration.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration_ms: u64,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            is_playing: true,
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            album_art: None,
            duration_ms,
            elapsed_ms,
        }
        .clamped()
    }

    pub fn with_playing(mut self, is_playing: bool) -> Self {
        self.is_playing = is_playing;
        self
    }

    pub fn with_album_art(mut self, url: impl Into<String>) -> Self {
        self.album_art = Some(url.into());
        self
    }

    /// Enforce `elapsed_ms <= duration_ms`.
    pub fn clamped(mut self) -> Self {
        self.elapsed_ms = self.elapsed_ms.min(self.duration_ms);
        self
    }

    pub fn id(&self) -> TrackId {
        TrackId::new(self.title.clone(), self.artist.clone())
    }

    pub fn is_same_track(&self, other: &TrackSnapshot) -> bool {
        self.title == other.title && self.artist == other.artist
    }

    /// Fraction of the track played, in `[0, 1]`. Zero when the duration is unknown.
    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self.elapsed_ms, self.duration_ms)
    }
}

/// Fraction of `duration_ms` covered by `elapsed_ms`, clamped into `[0, 1]`.
///
/// Zero when the duration is unknown.
pub fn progress_fraction(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (elapsed_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// What the backend reports about the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    /// The backend has no user session.
    NotLoggedIn,
    /// Nothing is playing and no track was described.
    Idle,
    Track(TrackSnapshot),
    /// The backend answered with an error other than "not logged in".
    Unavailable(String),
}

/// Outcome of a lyrics lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsStatus {
    Found(String),
    NotFound,
    NotLoggedIn,
    Unavailable(String),
}

impl LyricsStatus {
    /// Text shown in the lyrics panel.
    pub fn display_text(&self) -> &str {
        match self {
            LyricsStatus::Found(text) => text,
            LyricsStatus::NotFound => "Lyrics not found",
            LyricsStatus::NotLoggedIn => "Log in to load lyrics",
            LyricsStatus::Unavailable(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_elapsed() {
        let snapshot = TrackSnapshot::new("Song", "Artist", "Album", 5_000, 9_000);
        assert_eq!(snapshot.elapsed_ms, 5_000);
        assert!(snapshot.is_playing);
    }

    #[test]
    fn test_identity_ignores_album_and_timing() {
        let a = TrackSnapshot::new("A", "X", "First", 10_000, 1_000);
        let b = TrackSnapshot::new("A", "X", "Second", 12_000, 7_000).with_playing(false);
        let c = TrackSnapshot::new("B", "X", "First", 10_000, 1_000);

        assert_eq!(a.id(), b.id());
        assert!(a.is_same_track(&b));
        assert!(!a.is_same_track(&c));
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(TrackSnapshot::new("A", "X", "", 0, 0).progress_fraction(), 0.0);
        assert_eq!(TrackSnapshot::new("A", "X", "", 4_000, 1_000).progress_fraction(), 0.25);
        assert_eq!(TrackSnapshot::new("A", "X", "", 4_000, 4_000).progress_fraction(), 1.0);
    }

    #[test]
    fn test_progress_fraction_of_raw_positions() {
        assert_eq!(progress_fraction(1_000, 0), 0.0);
        assert_eq!(progress_fraction(30_000, 120_000), 0.25);
        assert_eq!(progress_fraction(9_000, 4_000), 1.0);
    }

    #[test]
    fn test_track_id_display() {
        assert_eq!(TrackId::new("Song", "Band").to_string(), "Band - Song");
    }

    #[test]
    fn test_lyrics_display_text() {
        assert_eq!(LyricsStatus::Found("la la".into()).display_text(), "la la");
        assert_eq!(LyricsStatus::NotFound.display_text(), "Lyrics not found");
    }
}

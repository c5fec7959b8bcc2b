use std::time::Duration;

use crate::models::TrackSnapshot;

/// Default amount the local clock advances per tick.
pub const DEFAULT_TICK_STEP: Duration = Duration::from_millis(1000);

/// Result of advancing the local clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, stopped, or no snapshot held. Nothing changed.
    Stopped,
    /// The local elapsed value after the tick. Stays put once the end was reported.
    Progressed { elapsed_ms: u64 },
    /// The local clock reached the track duration on this tick.
    ///
    /// Reported once per authoritative snapshot. The real end of the track is
    /// only known to the backend, so callers should re-poll shortly after.
    TrackLikelyEnded,
}

/// Keeps a locally ticking elapsed position in step with authoritative snapshots.
///
/// The tracker holds no timers. A scheduler calls [`tick`](Self::tick) once per
/// tick interval and [`ingest`](Self::ingest) whenever a poll response or push
/// event arrives; an ingest always replaces whatever the ticks extrapolated.
#[derive(Debug, Clone)]
pub struct PlaybackProgressTracker {
    authoritative: Option<TrackSnapshot>,
    ticking: Option<TrackSnapshot>,
    running: bool,
    end_reported: bool,
    tick_step_ms: u64,
}

impl Default for PlaybackProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackProgressTracker {
    pub fn new() -> Self {
        Self::with_tick_step(DEFAULT_TICK_STEP)
    }

    /// Create a tracker whose clock advances by `step` per tick.
    pub fn with_tick_step(step: Duration) -> Self {
        Self {
            authoritative: None,
            ticking: None,
            running: false,
            end_reported: false,
            tick_step_ms: step.as_millis() as u64,
        }
    }

    /// Reconcile with a fresh authoritative snapshot.
    ///
    /// Returns `true` when the track identity differs from the previously held
    /// snapshot, or when there was none.
    pub fn ingest(&mut self, snapshot: TrackSnapshot) -> bool {
        let snapshot = snapshot.clamped();
        let changed = match &self.authoritative {
            Some(previous) => !previous.is_same_track(&snapshot),
            None => true,
        };

        log::debug!(
            "Ingesting {} - {} at {}/{} ms (playing: {}, changed: {})",
            snapshot.artist,
            snapshot.title,
            snapshot.elapsed_ms,
            snapshot.duration_ms,
            snapshot.is_playing,
            changed
        );

        self.running = snapshot.is_playing;
        self.end_reported = false;
        self.ticking = Some(snapshot.clone());
        self.authoritative = Some(snapshot);

        changed
    }

    /// Advance the local clock by one tick step.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        let Some(ticking) = self.ticking.as_mut() else {
            return TickOutcome::Stopped;
        };

        ticking.elapsed_ms = ticking
            .elapsed_ms
            .saturating_add(self.tick_step_ms)
            .min(ticking.duration_ms);

        if ticking.duration_ms > 0 && ticking.elapsed_ms == ticking.duration_ms && !self.end_reported {
            self.end_reported = true;
            log::debug!("Local clock reached the end of {} - {}", ticking.artist, ticking.title);
            return TickOutcome::TrackLikelyEnded;
        }

        TickOutcome::Progressed {
            elapsed_ms: ticking.elapsed_ms,
        }
    }

    /// Halt ticking. The held snapshot is kept for change detection.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_elapsed_ms(&self) -> u64 {
        self.ticking.as_ref().map_or(0, |s| s.elapsed_ms)
    }

    pub fn current_duration_ms(&self) -> u64 {
        self.ticking.as_ref().map_or(0, |s| s.duration_ms)
    }

    pub fn progress_fraction(&self) -> f64 {
        self.ticking.as_ref().map_or(0.0, |s| s.progress_fraction())
    }

    /// The locally extrapolated view of the current track.
    pub fn snapshot(&self) -> Option<&TrackSnapshot> {
        self.ticking.as_ref()
    }

    /// The last snapshot received from the backend, untouched by ticks.
    pub fn authoritative(&self) -> Option<&TrackSnapshot> {
        self.authoritative.as_ref()
    }
}

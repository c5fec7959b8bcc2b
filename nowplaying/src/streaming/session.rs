use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};

use super::callback_server::CallbackServer;
use super::types::{DisplayEvent, PushEvent, SessionConfig};
use crate::error::{NowPlayingError, Result};
use crate::lyrics::LyricsCache;
use crate::models::{LyricsStatus, PlayerStatus, TrackId};
use crate::tracker::{PlaybackProgressTracker, TickOutcome};
use crate::transport::TrackSource;

pub(crate) type EventHandler = Box<dyn Fn(DisplayEvent) + Send + Sync>;

#[derive(Debug)]
pub(crate) enum SessionCommand {
    Refresh,
}

/// Results of background fetches, reported back to the scheduler
enum Fetched {
    Status(u64, Result<PlayerStatus>),
    Lyrics(TrackId, Result<LyricsStatus>),
}

/// Sends a poll result back to the scheduler exactly once.
///
/// If the fetch task unwinds before producing a result, dropping the report
/// sends `FetchAborted` so the in-flight flag is still cleared.
struct PollReport {
    poll_id: u64,
    tx: Option<mpsc::UnboundedSender<Fetched>>,
}

impl PollReport {
    fn send(mut self, result: Result<PlayerStatus>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Fetched::Status(self.poll_id, result));
        }
    }
}

impl Drop for PollReport {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Fetched::Status(self.poll_id, Err(NowPlayingError::FetchAborted)));
        }
    }
}

/// Lyrics shown for a track but not cached yet.
///
/// `/get_lyrics` answers for whatever the backend plays at that moment, so the
/// text is only cached once a poll started after it arrived names the same track.
struct UnconfirmedLyrics {
    id: TrackId,
    text: String,
    after_poll: u64,
}

/// The scheduler that drives a tracker from timers, polls and pushes.
///
/// Runs as a single task: every mutation of the tracker happens inside one
/// `select!` turn, so an ingest always lands between two ticks and resets the
/// local clock.
pub(crate) struct SessionTask<S: TrackSource> {
    source: Arc<S>,
    config: SessionConfig,
    tracker: PlaybackProgressTracker,
    lyrics_cache: LyricsCache,
    handlers: Vec<EventHandler>,
    callback_server: Option<CallbackServer>,
    poll_in_flight: bool,
    polls_started: u64,
    unconfirmed_lyrics: Option<UnconfirmedLyrics>,
}

impl<S: TrackSource> SessionTask<S> {
    pub(crate) fn new(
        source: Arc<S>,
        config: SessionConfig,
        handlers: Vec<EventHandler>,
        callback_server: Option<CallbackServer>,
    ) -> Self {
        let tracker = PlaybackProgressTracker::with_tick_step(config.tick_interval);
        Self {
            source,
            config,
            tracker,
            lyrics_cache: LyricsCache::new(),
            handlers,
            callback_server,
            poll_in_flight: false,
            polls_started: 0,
            unconfirmed_lyrics: None,
        }
    }

    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        mut pushes: Option<mpsc::UnboundedReceiver<PushEvent>>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<Fetched>();

        let mut poll = time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticker = tick_interval(self.config.tick_interval);
        let mut grace: Option<Pin<Box<Sleep>>> = None;

        if let Some(url) = self.callback_server.as_ref().map(CallbackServer::push_url) {
            self.emit(DisplayEvent::PushListening(url));
        }
        log::info!(
            "Session started against {} (poll every {:?})",
            self.config.base_url,
            self.config.poll_interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,

                _ = poll.tick() => self.request_poll(&fetch_tx),

                _ = ticker.tick(), if self.tracker.is_running() => {
                    match self.tracker.tick() {
                        TickOutcome::Stopped => {}
                        TickOutcome::Progressed { .. } => self.emit_progress(),
                        TickOutcome::TrackLikelyEnded => {
                            log::debug!("Track likely ended, re-polling in {:?}", self.config.end_grace);
                            grace = Some(Box::pin(time::sleep(self.config.end_grace)));
                            self.emit_progress();
                        }
                    }
                }

                _ = wait_grace(&mut grace), if grace.is_some() => {
                    grace = None;
                    self.request_poll(&fetch_tx);
                }

                Some(fetched) = fetch_rx.recv() => match fetched {
                    Fetched::Status(poll_id, result) => {
                        self.poll_in_flight = false;
                        match result {
                            Ok(status) => {
                                self.confirm_lyrics(poll_id, &status);
                                if self.apply_status(status, &fetch_tx) {
                                    self.restart_ticks(&mut ticker, &mut grace);
                                }
                            }
                            Err(e) => {
                                log::warn!("Now playing poll failed: {}", e);
                                self.emit(DisplayEvent::FetchFailed(e.to_string()));
                            }
                        }
                    }
                    Fetched::Lyrics(id, result) => self.apply_lyrics(id, result),
                },

                Some(push) = next_push(&mut pushes) => {
                    log::debug!("Push update on channel {}", push.channel_id);
                    if self.apply_status(push.payload.into_status(), &fetch_tx) {
                        self.restart_ticks(&mut ticker, &mut grace);
                    }
                }

                Some(command) = commands.recv() => match command {
                    SessionCommand::Refresh => self.request_poll(&fetch_tx),
                },
            }
        }

        self.tracker.stop();
        if let Some(mut server) = self.callback_server.take() {
            server.shutdown();
        }
        log::info!("Session stopped");
    }

    fn request_poll(&mut self, fetch_tx: &mpsc::UnboundedSender<Fetched>) {
        if self.poll_in_flight {
            log::debug!("Poll already in flight, skipping");
            return;
        }
        self.poll_in_flight = true;
        self.polls_started += 1;

        let source = Arc::clone(&self.source);
        let report = PollReport {
            poll_id: self.polls_started,
            tx: Some(fetch_tx.clone()),
        };
        tokio::spawn(async move {
            let result = source.now_playing().await;
            report.send(result);
        });
    }

    /// A fresh snapshot supersedes any pending end-of-track re-poll, and the
    /// next tick lands one full interval after the ingest.
    fn restart_ticks(&self, ticker: &mut Interval, grace: &mut Option<Pin<Box<Sleep>>>) {
        *grace = None;
        if self.tracker.is_running() {
            ticker.reset();
        }
    }

    /// Reconcile with a status from a poll or push.
    ///
    /// Returns true when a snapshot was ingested.
    fn apply_status(&mut self, status: PlayerStatus, fetch_tx: &mpsc::UnboundedSender<Fetched>) -> bool {
        match status {
            PlayerStatus::Track(snapshot) => {
                let changed = self.tracker.ingest(snapshot.clone());
                if changed {
                    log::info!("Now playing: {} - {}", snapshot.artist, snapshot.title);
                    let id = snapshot.id();
                    self.emit(DisplayEvent::TrackChanged(snapshot));
                    self.request_lyrics(id, fetch_tx);
                } else {
                    self.emit(DisplayEvent::TrackRefreshed(snapshot));
                }
                self.emit_progress();
                true
            }
            PlayerStatus::Idle => {
                self.tracker.stop();
                self.emit(DisplayEvent::NotPlaying);
                false
            }
            PlayerStatus::NotLoggedIn => {
                self.tracker.stop();
                self.emit(DisplayEvent::NotLoggedIn);
                false
            }
            PlayerStatus::Unavailable(message) => {
                log::warn!("Backend reported an error: {}", message);
                self.emit(DisplayEvent::FetchFailed(message));
                false
            }
        }
    }

    fn request_lyrics(&mut self, id: TrackId, fetch_tx: &mpsc::UnboundedSender<Fetched>) {
        if !self.config.fetch_lyrics {
            return;
        }

        if let Some(text) = self.lyrics_cache.get(&id) {
            let status = LyricsStatus::Found(text.to_string());
            self.emit(DisplayEvent::Lyrics(status));
            return;
        }

        self.emit(DisplayEvent::LyricsLoading);
        let source = Arc::clone(&self.source);
        let tx = fetch_tx.clone();
        tokio::spawn(async move {
            let result = source.lyrics().await;
            let _ = tx.send(Fetched::Lyrics(id, result));
        });
    }

    fn apply_lyrics(&mut self, id: TrackId, result: Result<LyricsStatus>) {
        let current = self.tracker.authoritative().map(|s| s.id());
        if current.as_ref() != Some(&id) {
            log::debug!("Dropping lyrics for {}, track has changed", id);
            return;
        }

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                log::warn!("Lyrics lookup for {} failed: {}", id, e);
                LyricsStatus::Unavailable("Error loading lyrics".to_string())
            }
        };

        if let LyricsStatus::Found(text) = &status {
            self.unconfirmed_lyrics = Some(UnconfirmedLyrics {
                id,
                text: text.clone(),
                after_poll: self.polls_started,
            });
        }
        self.emit(DisplayEvent::Lyrics(status));
    }

    /// Cache unconfirmed lyrics once a later poll still names their track.
    fn confirm_lyrics(&mut self, poll_id: u64, status: &PlayerStatus) {
        let PlayerStatus::Track(snapshot) = status else {
            return;
        };
        match &self.unconfirmed_lyrics {
            Some(pending) if poll_id > pending.after_poll => {}
            _ => return,
        }
        let Some(pending) = self.unconfirmed_lyrics.take() else {
            return;
        };

        if snapshot.id() == pending.id {
            self.lyrics_cache.insert(pending.id, pending.text);
        } else {
            log::debug!("Not caching lyrics for {}, backend moved on", pending.id);
        }
    }

    fn emit_progress(&self) {
        let is_playing = self.tracker.snapshot().is_some_and(|s| s.is_playing);
        self.emit(DisplayEvent::Progress {
            elapsed_ms: self.tracker.current_elapsed_ms(),
            duration_ms: self.tracker.current_duration_ms(),
            is_playing,
        });
    }

    fn emit(&self, event: DisplayEvent) {
        for handler in &self.handlers {
            handler(event.clone());
        }
    }
}

fn tick_interval(period: std::time::Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_push(pushes: &mut Option<mpsc::UnboundedReceiver<PushEvent>>) -> Option<PushEvent> {
    match pushes.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn wait_grace(grace: &mut Option<Pin<Box<Sleep>>>) {
    match grace.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

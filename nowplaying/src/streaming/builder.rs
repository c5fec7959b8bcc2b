use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::callback_server::CallbackServer;
use super::session::{EventHandler, SessionCommand, SessionTask};
use super::types::{DisplayEvent, SessionConfig, DEFAULT_PUSH_PORT_RANGE};
use crate::error::{NowPlayingError, Result};
use crate::transport::{HttpTrackSource, TrackSource};

/// Builder for a now-playing session
///
/// # Example
///
/// ```rust,no_run
/// use nowplaying::streaming::SessionBuilder;
///
/// # async fn run() -> nowplaying::Result<()> {
/// let session = SessionBuilder::new("http://127.0.0.1:5000")?
///     .with_push_ports(9000, 9010)
///     .with_event_handler(|event| println!("Event: {:?}", event))
///     .start()?;
///
/// session.refresh()?;
/// session.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    config: SessionConfig,
    event_handlers: Vec<EventHandler>,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("config", &self.config)
            .field("event_handlers_count", &self.event_handlers.len())
            .finish()
    }
}

impl SessionBuilder {
    /// Create a builder polling the backend at `base_url`
    ///
    /// Defaults: poll every 3 s, tick every 1 s, re-poll 2 s after the local
    /// clock reaches the end of a track, lyrics enabled, push disabled.
    ///
    /// # Returns
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let config = SessionConfig::default()
            .with_base_url(base_url)
            .map_err(NowPlayingError::InvalidConfiguration)?;
        Ok(Self::from_config(config))
    }

    /// Start from an existing configuration
    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config,
            event_handlers: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Delay before re-polling once the local clock reaches the end of a track
    pub fn with_end_grace(mut self, grace: Duration) -> Self {
        self.config.end_grace = grace;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Enable the push channel on a port from `start..=end`
    ///
    /// The callback server binds to the first free port in the range on
    /// 127.0.0.1. Ports below 1024 are rejected when the session starts.
    pub fn with_push_ports(mut self, start: u16, end: u16) -> Self {
        self.config.push_port_range = Some((start, end));
        self
    }

    /// Enable the push channel on the default port range
    pub fn with_push(mut self) -> Self {
        self.config.push_port_range.get_or_insert(DEFAULT_PUSH_PORT_RANGE);
        self
    }

    pub fn without_lyrics(mut self) -> Self {
        self.config.fetch_lyrics = false;
        self
    }

    /// Add a handler that receives every display event
    ///
    /// Handlers run on the session task and should return quickly; forward to
    /// a channel or a store rather than doing I/O.
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(DisplayEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Box::new(handler));
        self
    }

    /// Start the session against the configured HTTP backend
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<ActiveSession> {
        self.config.validate()?;
        let source = HttpTrackSource::new(&self.config.base_url, self.config.request_timeout)?;
        self.start_with_source(source)
    }

    /// Start the session against a custom track source
    pub fn start_with_source<S: TrackSource>(self, source: S) -> Result<ActiveSession> {
        self.config.validate()?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            NowPlayingError::InvalidConfiguration(
                "Sessions must be started inside a tokio runtime".to_string(),
            )
        })?;

        let (push_rx, callback_server) = match self.config.push_port_range {
            Some(range) => {
                let (push_tx, push_rx) = mpsc::unbounded_channel();
                let mut server = CallbackServer::new(range, push_tx)?;
                server.start()?;
                (Some(push_rx), Some(server))
            }
            None => (None, None),
        };
        let push_url = callback_server.as_ref().map(CallbackServer::push_url);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = SessionTask::new(
            Arc::new(source),
            self.config,
            self.event_handlers,
            callback_server,
        );
        let handle = runtime.spawn(task.run(command_rx, push_rx, shutdown_rx));

        Ok(ActiveSession {
            commands: command_tx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            push_url,
        })
    }
}

/// A running session
///
/// Dropping it stops the session; [`shutdown`](Self::shutdown) also waits for
/// the task to finish.
pub struct ActiveSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    push_url: Option<String>,
}

impl ActiveSession {
    /// Poll the backend now instead of waiting for the next interval
    pub fn refresh(&self) -> Result<()> {
        self.commands
            .send(SessionCommand::Refresh)
            .map_err(|_| NowPlayingError::SessionClosed)
    }

    /// URL the backend should POST track updates to, when push is enabled
    pub fn push_url(&self) -> Option<&str> {
        self.push_url.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop ticking, close the push channel and wait for the session task
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.map_err(|_| NowPlayingError::ShutdownFailed)?;
        }
        Ok(())
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

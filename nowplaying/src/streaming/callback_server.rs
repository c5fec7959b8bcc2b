use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use warp::Filter;

use crate::error::{NowPlayingError, Result};
use crate::streaming::types::{ChannelId, PushEvent};
use crate::transport::NowPlayingPayload;

/// Server status information
#[derive(Debug, Clone)]
pub struct ServerStatus {
    pub port: u16,
    pub is_running: bool,
    pub is_healthy: bool,
}

/// HTTP server receiving pushed track updates from the backend
pub struct CallbackServer {
    server_handle: Option<JoinHandle<()>>,
    port: u16,
    router: Arc<PushRouter>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl CallbackServer {
    /// Create a new CallbackServer that will bind to a port in the given range
    pub fn new(
        port_range: (u16, u16),
        event_sender: mpsc::UnboundedSender<PushEvent>,
    ) -> Result<Self> {
        let router = Arc::new(PushRouter::new(ChannelId::new(), event_sender));

        let port = (port_range.0..=port_range.1)
            .find(|p| Self::is_port_available(*p))
            .ok_or_else(|| {
                NowPlayingError::CallbackServer(format!(
                    "No available ports in range {}..{}",
                    port_range.0, port_range.1
                ))
            })?;

        Ok(Self {
            server_handle: None,
            port,
            router,
            shutdown_tx: None,
        })
    }

    /// Start serving on the current tokio runtime
    pub fn start(&mut self) -> Result<()> {
        if self.server_handle.is_some() {
            return Err(NowPlayingError::CallbackServer(
                "Server is already running".to_string(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            NowPlayingError::CallbackServer("No tokio runtime available".to_string())
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = Arc::clone(&self.router);
        let with_router = warp::any().map(move || Arc::clone(&router));

        let push_route = warp::post()
            .and(warp::path("push"))
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .and(warp::body::bytes())
            .and(with_router)
            .and_then(handle_push_request);

        let (addr, server) = warp::serve(push_route)
            .try_bind_with_graceful_shutdown(
                SocketAddr::from(([127, 0, 0, 1], self.port)),
                async move {
                    let _ = shutdown_rx.await;
                },
            )
            .map_err(|e| NowPlayingError::CallbackServer(e.to_string()))?;

        log::info!("Push callback server listening on {}", addr);

        self.server_handle = Some(runtime.spawn(server));
        self.shutdown_tx = Some(shutdown_tx);

        Ok(())
    }

    /// Stop the HTTP server
    pub fn shutdown(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if self.server_handle.take().is_some() {
            log::info!("Push callback server on port {} stopped", self.port);
        }
    }

    /// Get the port the server is bound to
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn channel_id(&self) -> ChannelId {
        self.router.channel_id
    }

    /// Get the base callback URL for this server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Full URL the backend should POST track updates to
    pub fn push_url(&self) -> String {
        format!("{}{}", self.base_url(), self.router.channel_id.callback_path())
    }

    /// Check if a port is available for binding
    fn is_port_available(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.server_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Perform a health check on the server
    pub fn health_check(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        std::net::TcpStream::connect(("127.0.0.1", self.port)).is_ok()
    }

    /// Get server status information
    pub fn status(&self) -> ServerStatus {
        ServerStatus {
            port: self.port,
            is_running: self.is_running(),
            is_healthy: self.health_check(),
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handler function for push requests
async fn handle_push_request(
    channel: String,
    body: bytes::Bytes,
    router: Arc<PushRouter>,
) -> std::result::Result<impl warp::Reply, warp::Rejection> {
    Ok(router.handle_push(&channel, &body))
}

/// Validates pushed updates and forwards them to the session
pub struct PushRouter {
    channel_id: ChannelId,
    event_sender: mpsc::UnboundedSender<PushEvent>,
}

impl PushRouter {
    pub fn new(channel_id: ChannelId, event_sender: mpsc::UnboundedSender<PushEvent>) -> Self {
        Self {
            channel_id,
            event_sender,
        }
    }

    /// Handle one pushed body addressed to `channel`
    pub fn handle_push(&self, channel: &str, body: &[u8]) -> warp::reply::WithStatus<&'static str> {
        if channel != self.channel_id.as_string() {
            log::warn!("Received push for unknown channel: {}", channel);
            return warp::reply::with_status("Unknown channel", warp::http::StatusCode::NOT_FOUND);
        }

        let payload = match serde_json::from_slice::<NowPlayingPayload>(body) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Rejected push with malformed body: {}", e);
                return warp::reply::with_status(
                    "Invalid body",
                    warp::http::StatusCode::BAD_REQUEST,
                );
            }
        };

        if self.event_sender.send(PushEvent::new(self.channel_id, payload)).is_err() {
            log::error!("Failed to forward push for channel {}", self.channel_id);
            return warp::reply::with_status(
                "Internal server error",
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            );
        }

        log::debug!("Accepted push for channel {}", self.channel_id);
        warp::reply::with_status("OK", warp::http::StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Reply;

    fn status_of(reply: warp::reply::WithStatus<&'static str>) -> u16 {
        reply.into_response().status().as_u16()
    }

    #[test]
    fn test_router_accepts_known_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel_id = ChannelId::new();
        let router = PushRouter::new(channel_id, tx);

        let body = br#"{"is_playing": true, "name": "Song", "artist": "Band"}"#;
        assert_eq!(status_of(router.handle_push(&channel_id.as_string(), body)), 200);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.channel_id, channel_id);
        assert_eq!(event.payload.name.as_deref(), Some("Song"));
    }

    #[test]
    fn test_router_rejects_unknown_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let router = PushRouter::new(ChannelId::new(), tx);

        let reply = router.handle_push(&ChannelId::new().as_string(), b"{}");
        assert_eq!(status_of(reply), 404);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_router_rejects_malformed_body() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel_id = ChannelId::new();
        let router = PushRouter::new(channel_id, tx);

        let reply = router.handle_push(&channel_id.as_string(), b"<html>");
        assert_eq!(status_of(reply), 400);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_router_reports_closed_session() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let channel_id = ChannelId::new();
        let router = PushRouter::new(channel_id, tx);

        let reply = router.handle_push(&channel_id.as_string(), b"{}");
        assert_eq!(status_of(reply), 500);
    }

    #[test]
    fn test_callback_server_creation() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = CallbackServer::new((18080, 18090), tx).unwrap();

        assert!(!server.is_running());
        assert!(server.port() >= 18080 && server.port() <= 18090);
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert!(server
            .push_url()
            .ends_with(&format!("/push/{}", server.channel_id())));
    }

    #[test]
    fn test_server_status_before_start() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = CallbackServer::new((18080, 18090), tx).unwrap();

        let status = server.status();
        assert_eq!(status.port, server.port());
        assert!(!status.is_running);
        assert!(!status.is_healthy);
    }

    #[test]
    fn test_start_requires_runtime() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut server = CallbackServer::new((18080, 18090), tx).unwrap();

        assert!(matches!(
            server.start(),
            Err(NowPlayingError::CallbackServer(_))
        ));
    }
}

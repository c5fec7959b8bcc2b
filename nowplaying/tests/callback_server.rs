use nowplaying::streaming::{CallbackServer, ChannelId};
use nowplaying::{DisplayEvent, NowPlayingError, PlayerStatus, SessionBuilder, TrackSource};
use nowplaying::{LyricsStatus, Result};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

/// Backend that never has anything playing, so only pushes produce tracks.
struct IdleSource;

impl TrackSource for IdleSource {
    async fn now_playing(&self) -> Result<PlayerStatus> {
        Ok(PlayerStatus::Idle)
    }

    async fn lyrics(&self) -> Result<LyricsStatus> {
        Err(NowPlayingError::Network("offline".to_string()))
    }
}

async fn next(rx: &mut mpsc::UnboundedReceiver<DisplayEvent>) -> DisplayEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_push_is_forwarded() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut server = CallbackServer::new((18100, 18120), tx).unwrap();
    server.start().unwrap();
    assert!(server.is_running());

    let response = reqwest::Client::new()
        .post(server.push_url())
        .json(&json!({
            "is_playing": true,
            "name": "Pushed",
            "artist": "Band",
            "duration_ms": 1000,
            "progress_ms": 250
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.channel_id, server.channel_id());
    assert_eq!(event.payload.name.as_deref(), Some("Pushed"));

    server.shutdown();
}

#[tokio::test]
async fn test_push_to_wrong_channel_is_rejected() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut server = CallbackServer::new((18121, 18140), tx).unwrap();
    server.start().unwrap();

    let url = format!("{}/push/{}", server.base_url(), ChannelId::new());
    let response = reqwest::Client::new()
        .post(url)
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_session_ingests_pushed_track() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = SessionBuilder::new("http://127.0.0.1:5000")
        .unwrap()
        .with_poll_interval(Duration::from_secs(60))
        .with_push_ports(18141, 18160)
        .without_lyrics()
        .with_event_handler(move |event| {
            let _ = tx.send(event);
        })
        .start_with_source(IdleSource)
        .unwrap();

    let push_url = session.push_url().unwrap().to_string();

    assert_eq!(next(&mut rx).await, DisplayEvent::PushListening(push_url.clone()));
    assert_eq!(next(&mut rx).await, DisplayEvent::NotPlaying);

    reqwest::Client::new()
        .post(&push_url)
        .json(&json!({
            "is_playing": true,
            "name": "Pushed",
            "artist": "Band",
            "album": "Live",
            "duration_ms": 180000,
            "progress_ms": 42000
        }))
        .send()
        .await
        .unwrap();

    match next(&mut rx).await {
        DisplayEvent::TrackChanged(snapshot) => {
            assert_eq!(snapshot.title, "Pushed");
            assert_eq!(snapshot.elapsed_ms, 42_000);
        }
        other => panic!("expected a track change, got {:?}", other),
    }

    session.shutdown().await.unwrap();
}

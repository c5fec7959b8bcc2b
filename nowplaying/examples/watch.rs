use nowplaying::{DisplayEvent, SessionBuilder};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("NOWPLAYING_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    println!("🎵 Watching {}", base_url);

    let session = SessionBuilder::new(&base_url)?
        .with_push()
        .with_event_handler(|event| match event {
            DisplayEvent::TrackChanged(track) => {
                println!("▶ {} - {} ({})", track.artist, track.title, track.album)
            }
            DisplayEvent::Progress {
                elapsed_ms,
                duration_ms,
                is_playing,
            } => println!(
                "  {} / {}{}",
                nowplaying::format_time(elapsed_ms),
                nowplaying::format_time(duration_ms),
                if is_playing { "" } else { " (paused)" }
            ),
            DisplayEvent::Lyrics(status) => {
                println!("📜 {}", status.display_text().lines().next().unwrap_or(""))
            }
            other => println!("📢 {:?}", other),
        })
        .start()?;

    if let Some(url) = session.push_url() {
        println!("📡 Backend can POST updates to {}", url);
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    session.shutdown().await?;
    println!("🎯 Done");
    Ok(())
}

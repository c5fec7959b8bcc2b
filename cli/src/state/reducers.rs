use nowplaying::{ DisplayEvent, TrackSnapshot };

use super::store::{ AppState, LyricsPanel };
use crate::views::ViewType;

#[derive(Debug)]
pub enum AppAction {
  Display(DisplayEvent),
  ScrollLyrics(i16),
  SetStatusMessage(String),
}

pub fn app_reducer(state: &mut AppState, action: AppAction) {
  match action {
    AppAction::Display(event) => display_reducer(state, event),
    AppAction::ScrollLyrics(delta) => {
      state.lyrics_scroll = if delta < 0 {
        state.lyrics_scroll.saturating_sub(delta.unsigned_abs())
      } else {
        state.lyrics_scroll.saturating_add(delta as u16)
      };
    }
    AppAction::SetStatusMessage(message) => {
      state.status_message = Some(message);
    }
  }
}

fn display_reducer(state: &mut AppState, event: DisplayEvent) {
  match event {
    DisplayEvent::TrackChanged(snapshot) => {
      log::debug!("TrackChanged: {} - {}", snapshot.artist, snapshot.title);
      state.lyrics = LyricsPanel::Hidden;
      state.lyrics_scroll = 0;
      show_track(state, snapshot);
    }
    DisplayEvent::TrackRefreshed(snapshot) => show_track(state, snapshot),
    DisplayEvent::Progress { elapsed_ms, duration_ms, is_playing } => {
      state.elapsed_ms = elapsed_ms;
      state.duration_ms = duration_ms;
      state.is_playing = is_playing;
    }
    DisplayEvent::NotPlaying => {
      state.view = ViewType::NotPlaying;
      state.is_playing = false;
      state.status_message = None;
    }
    DisplayEvent::NotLoggedIn => {
      state.view = ViewType::Login;
      state.is_playing = false;
      state.status_message = None;
    }
    DisplayEvent::LyricsLoading => {
      state.lyrics = LyricsPanel::Loading;
    }
    DisplayEvent::Lyrics(status) => {
      state.lyrics = LyricsPanel::Text(status.display_text().to_string());
      state.lyrics_scroll = 0;
    }
    DisplayEvent::FetchFailed(message) => {
      log::warn!("Fetch failed: {}", message);
      state.status_message = Some(message);
    }
    DisplayEvent::PushListening(url) => {
      state.push_url = Some(url);
    }
  }
}

fn show_track(state: &mut AppState, snapshot: TrackSnapshot) {
  state.view = ViewType::NowPlaying;
  state.elapsed_ms = snapshot.elapsed_ms;
  state.duration_ms = snapshot.duration_ms;
  state.is_playing = snapshot.is_playing;
  state.track = Some(snapshot);
  state.status_message = None;
}

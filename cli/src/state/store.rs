use std::sync::{ Arc, Mutex, MutexGuard };

use nowplaying::TrackSnapshot;

use super::reducers::{ self, AppAction };
use crate::views::ViewType;

/// What the lyrics panel shows
#[derive(Debug, Clone, PartialEq)]
pub enum LyricsPanel {
  Hidden,
  Loading,
  Text(String),
}

pub struct AppState {
  pub view: ViewType,
  pub base_url: String,
  pub track: Option<TrackSnapshot>,
  pub elapsed_ms: u64,
  pub duration_ms: u64,
  pub is_playing: bool,
  pub lyrics: LyricsPanel,
  pub lyrics_scroll: u16,
  pub status_message: Option<String>,
  pub push_url: Option<String>,
}

impl AppState {
  pub fn new(base_url: &str) -> Self {
    Self {
      view: ViewType::Connecting,
      base_url: base_url.to_string(),
      track: None,
      elapsed_ms: 0,
      duration_ms: 0,
      is_playing: false,
      lyrics: LyricsPanel::Hidden,
      lyrics_scroll: 0,
      status_message: None,
      push_url: None,
    }
  }
}

/// Shared UI state, written by the session's event handler and read by the render loop
#[derive(Clone)]
pub struct Store {
  state: Arc<Mutex<AppState>>,
}

impl Store {
  pub fn new(base_url: &str) -> Self {
    Self {
      state: Arc::new(Mutex::new(AppState::new(base_url))),
    }
  }

  pub fn dispatch(&self, action: AppAction) {
    let mut state = self.lock();
    reducers::app_reducer(&mut state, action);
  }

  pub fn with_state<F, T>(&self, f: F) -> T
  where
    F: FnOnce(&AppState) -> T
  {
    let state = self.lock();
    f(&state)
  }

  // A panicking handler must not take the UI down with it.
  fn lock(&self) -> MutexGuard<'_, AppState> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nowplaying::DisplayEvent;

  #[test]
  fn test_dispatch_is_visible_through_clones() {
    let store = Store::new("http://127.0.0.1:5000");
    let handler_store = store.clone();

    handler_store.dispatch(AppAction::Display(DisplayEvent::NotLoggedIn));

    assert_eq!(store.with_state(|state| state.view), ViewType::Login);
  }
}

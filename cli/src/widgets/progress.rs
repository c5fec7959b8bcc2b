use nowplaying::{ format_time, progress_fraction };
use ratatui::{
  style::{ Color, Style },
  widgets::Gauge,
};

use crate::state::store::AppState;

/// Gauge labelled `elapsed / total`, with a play or pause marker
pub fn progress_gauge(state: &AppState) -> Gauge<'static> {
  Gauge::default()
    .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
    .use_unicode(true)
    .ratio(progress_fraction(state.elapsed_ms, state.duration_ms))
    .label(progress_label(state))
}

pub fn progress_label(state: &AppState) -> String {
  let marker = if state.is_playing { "▶" } else { "⏸" };
  format!(
    "{} {} / {}",
    marker,
    format_time(state.elapsed_ms),
    format_time(state.duration_ms),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_label() {
    let mut state = AppState::new("http://127.0.0.1:5000");
    state.elapsed_ms = 65_000;
    state.duration_ms = 225_000;
    state.is_playing = true;
    assert_eq!(progress_label(&state), "▶ 1:05 / 3:45");

    state.is_playing = false;
    assert_eq!(progress_label(&state), "⏸ 1:05 / 3:45");
  }
}

use crossterm::event::{ KeyCode, KeyEvent };
use ratatui::{
  layout::{ Constraint, Layout, Rect },
  style::{ Color, Modifier, Style },
  text::{ Line, Span, Text },
  widgets::{ Block, Borders, Paragraph, Wrap },
  Frame,
};

use crate::state::reducers::AppAction;
use crate::state::store::{ AppState, LyricsPanel, Store };
use crate::widgets::progress::progress_gauge;

use super::View;

/// Track details, progress gauge and the lyrics panel
pub struct PlayerView {
  store: Store,
}

impl PlayerView {
  pub fn new(store: Store) -> Self {
    Self { store }
  }
}

fn track_text(state: &AppState) -> Text<'static> {
  let Some(track) = &state.track else {
    return Text::default();
  };

  let mut lines = vec![
    Line::from(Span::styled(
      track.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(track.artist.clone()),
    Line::from(Span::styled(track.album.clone(), Style::default().fg(Color::Gray))),
  ];
  if let Some(art) = &track.album_art {
    lines.push(Line::from(Span::styled(art.clone(), Style::default().fg(Color::DarkGray))));
  }
  Text::from(lines)
}

fn lyrics_text(state: &AppState) -> Option<String> {
  match &state.lyrics {
    LyricsPanel::Hidden => None,
    LyricsPanel::Loading => Some("Loading lyrics…".to_string()),
    LyricsPanel::Text(text) => Some(text.clone()),
  }
}

impl View for PlayerView {
  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.store.with_state(|state| {
      let [details_area, gauge_area, lyrics_area] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(1),
        Constraint::Min(0),
      ])
      .areas(area);

      let details = Paragraph::new(track_text(state))
        .block(Block::default().borders(Borders::ALL).title(" Now Playing "));
      frame.render_widget(details, details_area);

      frame.render_widget(progress_gauge(state), gauge_area);

      if let Some(lyrics) = lyrics_text(state) {
        let lyrics_paragraph = Paragraph::new(lyrics)
          .block(Block::default().borders(Borders::ALL).title(" Lyrics "))
          .wrap(Wrap { trim: false })
          .scroll((state.lyrics_scroll, 0));
        frame.render_widget(lyrics_paragraph, lyrics_area);
      }
    });
  }

  fn handle_input(&mut self, key_event: KeyEvent, store: &Store) {
    match key_event.code {
      KeyCode::Char('j') | KeyCode::Down => store.dispatch(AppAction::ScrollLyrics(1)),
      KeyCode::Char('k') | KeyCode::Up => store.dispatch(AppAction::ScrollLyrics(-1)),
      KeyCode::PageDown => store.dispatch(AppAction::ScrollLyrics(10)),
      KeyCode::PageUp => store.dispatch(AppAction::ScrollLyrics(-10)),
      _ => {}
    }
  }
}

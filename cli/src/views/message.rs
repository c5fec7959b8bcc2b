use crossterm::event::KeyEvent;
use ratatui::{
  layout::{ Alignment, Constraint, Layout, Rect },
  style::{ Color, Modifier, Style },
  text::Text,
  widgets::{ Paragraph, Wrap },
  Frame,
};

use crate::state::store::Store;
use crate::widgets::util;

use super::{ View, ViewType };

/// Full-screen message for every state without a track
pub struct MessageView {
  store: Store,
}

impl MessageView {
  pub fn new(store: Store) -> Self {
    Self { store }
  }

  fn get_message(&self) -> (String, String) {
    self.store.with_state(|state| match state.view {
      ViewType::Login => (
        "Not logged in".to_string(),
        format!("Open {}/login in a browser to sign in", state.base_url),
      ),
      ViewType::NotPlaying => (
        "Nothing playing".to_string(),
        "Start something and it will show up here".to_string(),
      ),
      ViewType::Connecting | ViewType::NowPlaying => (
        "Connecting".to_string(),
        format!("Waiting for {}", state.base_url),
      ),
    })
  }
}

impl View for MessageView {
  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (title, body) = self.get_message();

    let layout = Layout::vertical([
      Constraint::Length(1),
      Constraint::Length(1),
      Constraint::Length(2),
    ]);
    let sections = util::vertically_centered_layout(area, layout);

    let title_paragraph = Paragraph::new(Text::from(title))
      .style(Style::default().add_modifier(Modifier::BOLD))
      .alignment(Alignment::Center);
    frame.render_widget(title_paragraph, sections[0]);

    let body_paragraph = Paragraph::new(Text::from(body))
      .style(Style::default().fg(Color::Gray))
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(body_paragraph, sections[2]);
  }

  fn handle_input(&mut self, _key_event: KeyEvent, _store: &Store) {}
}

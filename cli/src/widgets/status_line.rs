use ratatui::{
  style::{ Color, Modifier, Style },
  text::{ Line, Span },
  widgets::Paragraph,
};

use crate::state::store::AppState;

const KEY_HINTS: &str = "q quit · r refresh · j/k scroll";

pub fn status_line(state: &AppState) -> Paragraph<'static> {
  let mut spans = Vec::new();

  if let Some(message) = &state.status_message {
    spans.push(Span::styled(
      format!("⚠ {}", message),
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
  } else if let Some(url) = &state.push_url {
    spans.push(Span::styled(format!("push: {}", url), Style::default().fg(Color::DarkGray)));
  }

  if !spans.is_empty() {
    spans.push(Span::raw("  "));
  }
  spans.push(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)));

  Paragraph::new(Line::from(spans))
}

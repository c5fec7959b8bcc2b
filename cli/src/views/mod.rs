pub mod message;
pub mod player;

use crossterm::event::KeyEvent;
use ratatui::{ layout::Rect, Frame };

use crate::state::store::Store;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewType {
  Connecting,
  Login,
  NotPlaying,
  NowPlaying,
}

pub trait View {
  fn render(&mut self, frame: &mut Frame, area: Rect);
  fn handle_input(&mut self, key_event: KeyEvent, store: &Store);
}

mod args;
mod state;
mod views;
mod widgets;

use std::fs::File;
use std::io;
use std::time::Duration;

use crossterm::event::{ self, Event, KeyCode, KeyEvent, KeyEventKind };
use log::LevelFilter;
use nowplaying::{ ActiveSession, SessionBuilder };
use ratatui::{
  layout::{ Constraint, Layout },
  DefaultTerminal,
  Frame,
};
use simplelog::{ ConfigBuilder, WriteLogger };

use args::{ Command, Options };
use state::reducers::AppAction;
use state::store::Store;
use views::{ message::MessageView, player::PlayerView, View, ViewType };
use widgets::status_line::status_line;

const INPUT_POLL: Duration = Duration::from_millis(100);

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let env_url = std::env::var(args::URL_ENV).ok();
  let options = match args::parse(std::env::args().skip(1), env_url) {
    Ok(Command::Run(options)) => options,
    Ok(Command::Help) => {
      println!("{}", args::USAGE);
      return Ok(());
    }
    Err(message) => {
      eprintln!("{}\n\n{}", message, args::USAGE);
      std::process::exit(2);
    }
  };

  init_logging(&options)?;
  log::info!("Starting against {}", options.base_url);

  let runtime = tokio::runtime::Runtime::new()?;
  let store = Store::new(&options.base_url);

  let session = {
    let _guard = runtime.enter();
    build_session(&options, store.clone())?.start()?
  };
  if let Some(url) = session.push_url() {
    log::info!("Accepting pushed updates at {}", url);
  }

  let mut terminal = ratatui::init();
  let app_result = App::new(store, &session).run(&mut terminal);
  ratatui::restore();

  runtime.block_on(session.shutdown())?;
  log::info!("Stopped");
  app_result.map_err(Into::into)
}

fn init_logging(options: &Options) -> io::Result<()> {
  let level = if options.verbose { LevelFilter::Debug } else { LevelFilter::Info };
  let config = ConfigBuilder::new()
    .add_filter_allow_str("nowplaying")
    .build();
  let file = File::create(&options.log_file)?;
  // Ignored when a logger is already installed.
  let _ = WriteLogger::init(level, config, file);
  Ok(())
}

fn build_session(options: &Options, store: Store) -> nowplaying::Result<SessionBuilder> {
  let mut builder = SessionBuilder::new(&options.base_url)?
    .with_event_handler(move |event| store.dispatch(AppAction::Display(event)));

  if let Some((start, end)) = options.push_ports {
    builder = builder.with_push_ports(start, end);
  }
  if !options.fetch_lyrics {
    builder = builder.without_lyrics();
  }
  Ok(builder)
}

struct App<'a> {
  exit: bool,
  store: Store,
  session: &'a ActiveSession,
  message_view: MessageView,
  player_view: PlayerView,
}

impl<'a> App<'a> {
  fn new(store: Store, session: &'a ActiveSession) -> Self {
    Self {
      exit: false,
      message_view: MessageView::new(store.clone()),
      player_view: PlayerView::new(store.clone()),
      store,
      session,
    }
  }

  fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
    while !self.exit {
      terminal.draw(|frame| self.draw(frame))?;
      self.handle_events()?;
    }
    Ok(())
  }

  fn current_view(&mut self) -> &mut dyn View {
    match self.store.with_state(|state| state.view) {
      ViewType::NowPlaying => &mut self.player_view,
      ViewType::Connecting | ViewType::Login | ViewType::NotPlaying => &mut self.message_view,
    }
  }

  fn draw(&mut self, frame: &mut Frame) {
    let [body_area, status_area] = Layout::vertical([
      Constraint::Min(0),
      Constraint::Length(1),
    ])
    .areas(frame.area());

    self.current_view().render(frame, body_area);

    let status = self.store.with_state(status_line);
    frame.render_widget(status, status_area);
  }

  fn handle_events(&mut self) -> io::Result<()> {
    if !event::poll(INPUT_POLL)? {
      return Ok(());
    }
    if let Event::Key(key_event) = event::read()? {
      if key_event.kind != KeyEventKind::Press || self.handle_shared_event(key_event) {
        return Ok(());
      }
      let store = self.store.clone();
      self.current_view().handle_input(key_event, &store);
    }
    Ok(())
  }

  fn handle_shared_event(&mut self, key_event: KeyEvent) -> bool {
    match key_event.code {
      KeyCode::Char('q') | KeyCode::Esc => {
        self.exit = true;
        true
      }
      KeyCode::Char('r') => {
        log::debug!("Manual refresh requested");
        if let Err(e) = self.session.refresh() {
          self.store.dispatch(AppAction::SetStatusMessage(e.to_string()));
        }
        true
      }
      _ => false,
    }
  }
}

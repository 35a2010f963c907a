//! Terminal host for the reading session

pub mod effects;
pub mod input;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error};

use crate::api::ApiClient;
use crate::config::{BookmarkFile, Config};
use crate::reader::{Document, Effect, Msg, ReadingSession};
use crate::theme::Theme;
use crate::ui;
use effects::EffectRunner;

/// How long the final position save may run after the reader has closed
const SAVE_GRACE: Duration = Duration::from_secs(2);

/// How long to wait for terminal input before checking completions
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// The reader application
pub struct App {
    /// Application configuration
    config: Config,

    /// Colors used for drawing
    theme: Theme,

    /// The open document
    session: ReadingSession,

    /// Executes session effects; taken when the loop ends
    runner: Option<EffectRunner<ApiClient, ApiClient, BookmarkFile>>,

    /// Completions from effect tasks
    rx: UnboundedReceiver<Msg>,

    /// Set once the session asks to exit
    should_quit: bool,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create the reader for `document`, taking over the terminal
    pub fn new(
        config: Config,
        client: ApiClient,
        bookmarks: BookmarkFile,
        document: Document,
    ) -> Result<Self> {
        let theme = Theme::by_name(&config.theme);
        let session = ReadingSession::new(document, config.text_scale());

        let client = Arc::new(client);
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(Arc::clone(&client), client, bookmarks, tx);

        let terminal = Self::setup_terminal()?;

        Ok(Self {
            config,
            theme,
            session,
            runner: Some(runner),
            rx,
            should_quit: false,
            terminal,
        })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the reader until the session exits.
    ///
    /// The reading position is saved even when the loop fails.
    pub async fn run(mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let result = self.event_loop();
        if let Err(e) = &result {
            error!("Reader loop failed: {:#}", e);
        }

        let restored = self.restore_terminal();
        if let Some(runner) = self.runner.take() {
            runner.shut_down(&mut self.session, SAVE_GRACE).await;
        }
        result.and(restored)
    }

    fn event_loop(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        self.session.set_viewport_size(size.width, size.height);
        let effects = self.session.start();
        self.dispatch(effects)?;

        while !self.should_quit {
            self.terminal.draw(|frame| {
                ui::draw(frame, &self.session, &self.theme);
            })?;

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Err(e) = self.handle_key(key) {
                            error!("Error handling key: {}", e);
                        }
                    }
                    Event::Resize(width, height) => {
                        self.session.set_viewport_size(width, height);
                    }
                    _ => {}
                }
            }

            self.drain_completions();
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(key) = input::key_event_to_key(key) else {
            return Ok(());
        };
        let effects = self.session.handle_key(key);
        self.dispatch(effects)
    }

    /// Feed finished background work into the session
    fn drain_completions(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            let effects = self.session.update(msg);
            if let Err(e) = self.dispatch(effects) {
                error!("Error handling completion: {}", e);
            }
        }
    }

    fn dispatch(&mut self, effects: Vec<Effect>) -> Result<()> {
        let Some(runner) = self.runner.as_mut() else {
            return Ok(());
        };

        for effect in effects {
            match runner.execute(effect) {
                Some(Effect::PersistTextScale(scale)) => {
                    debug!(scale, "Saving text scale");
                    self.config.text_scale = scale;
                    self.config.save()?;
                }
                Some(Effect::Exit) => self.should_quit = true,
                Some(other) => debug!(?other, "Unhandled effect"),
                None => {}
            }
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

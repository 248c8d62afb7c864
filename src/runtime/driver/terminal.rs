use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use serde_json::json;
use thiserror::Error;

use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::runtime::{EventQueue, Window};

const LOG_TARGET: &str = "wrapflow::driver";

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverFlow {
    Continue,
    Exit,
}

/// Feeds terminal resize events into a [`Window`] and drains the event queue
/// after each one, so any relayouts posted by resize listeners run before the
/// next event is read.
pub struct TerminalDriver {
    window: Rc<Window>,
    queue: Rc<EventQueue>,
    logger: Option<Logger>,
    poll_interval: Duration,
}

impl TerminalDriver {
    pub fn new(window: Rc<Window>, queue: Rc<EventQueue>) -> Self {
        Self {
            window,
            queue,
            logger: None,
            poll_interval: Duration::from_millis(50),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    /// Resize the window to the terminal's current size.
    pub fn sync_terminal_size(&self) -> DriverResult<()> {
        let (width, height) =
            terminal::size().map_err(|err| DriverError::Terminal(err.to_string()))?;
        self.apply_resize(width, height);
        Ok(())
    }

    pub fn handle_event(&self, event: &Event) -> DriverFlow {
        match event {
            Event::Resize(width, height) => {
                self.apply_resize(*width, *height);
                DriverFlow::Continue
            }
            Event::Key(key) if is_exit_key(key) => {
                emit(
                    self.logger.as_ref(),
                    LogLevel::Info,
                    LOG_TARGET,
                    "exit_requested",
                    std::iter::empty(),
                );
                DriverFlow::Exit
            }
            _ => {
                self.queue.drain();
                DriverFlow::Continue
            }
        }
    }

    /// Replay a fixed event sequence; stops early on an exit key.
    pub fn run_scripted<I>(&self, events: I) -> DriverFlow
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            if self.handle_event(&event) == DriverFlow::Exit {
                return DriverFlow::Exit;
            }
        }
        DriverFlow::Continue
    }

    /// Run against the real terminal until an exit key arrives.
    pub fn run(&self) -> DriverResult<()> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner();
        self.exit(&mut stdout);
        result
    }

    fn run_inner(&self) -> DriverResult<()> {
        self.sync_terminal_size()?;
        loop {
            if event::poll(self.poll_interval)? {
                let event = event::read()?;
                if self.handle_event(&event) == DriverFlow::Exit {
                    return Ok(());
                }
            } else {
                self.queue.drain();
            }
        }
    }

    fn apply_resize(&self, width: u16, height: u16) {
        self.window.resize(u32::from(width), u32::from(height));
        let ran = self.queue.drain();
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            LOG_TARGET,
            "terminal_resized",
            [
                json_kv("width", json!(width)),
                json_kv("height", json!(height)),
                json_kv("tasks_run", json!(ran)),
            ],
        );
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| DriverError::Terminal(err.to_string()))?;
        execute!(stdout, EnterAlternateScreen)?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

fn is_exit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

//! Terminal user interface for the picker
//!
//! The picker draws on stderr so stdout carries nothing but the selection.

pub mod app;
pub mod components;
pub mod event;
pub mod ui;

use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, prelude::*, Terminal};
use sift::SessionController;
use std::io::{self, stderr};
use std::time::Duration;
use tracing::debug;

use crate::cli::error::HelpfulError;
use crate::cli::tui::app::App;
use crate::cli::tui::event::{Event, EventHandler};

/// Raw mode plus alternate screen, undone on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(stderr(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stderr(), LeaveAlternateScreen, cursor::Show);
        let _ = disable_raw_mode();
    }
}

/// Run the picker; `Ok(None)` means the user cancelled.
pub async fn run(session: SessionController, rule_name: &str) -> Result<Option<String>> {
    let guard = TerminalGuard::enter().map_err(|e| HelpfulError::terminal(&e.to_string()))?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, rule_name);
    let mut events = EventHandler::new(Duration::from_millis(50));

    let outcome = event_loop(&mut terminal, &mut app, &mut events).await;

    // Restore the terminal before anything reaches stdout or stderr
    drop(events);
    drop(terminal);
    drop(guard);

    outcome?;
    debug!(status = ?app.session.status(), "picker finished");
    Ok(app.into_result())
}

/// Redraw, then wait for a key or a finished ranking, until the session ends
async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<()> {
    while app.is_running() {
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Event::Key(key)) => app.handle_key(key),
                Some(Event::Resize) => {}
                None => return Err(HelpfulError::terminal("terminal input closed").into()),
            },
            Some(result) = app.next_ranking() => app.apply_ranking(result),
        }
    }

    Ok(())
}

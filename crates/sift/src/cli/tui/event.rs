//! Event handling for the TUI

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use sift::InputEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Terminal events the picker reacts to
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Terminal size changed; the next frame picks up the new area
    Resize,
}

/// Reads terminal events on a blocking task and forwards them over a
/// channel, so the UI loop can `select!` on input without losing keys.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start the reader; `poll_interval` bounds how long it takes to notice
    /// the handler was dropped.
    pub fn new(poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::task::spawn_blocking(move || forward_events(tx, poll_interval));
        Self { rx }
    }

    /// Next terminal event; `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

fn forward_events(tx: mpsc::UnboundedSender<Event>, poll_interval: Duration) {
    while !tx.is_closed() {
        match event::poll(poll_interval) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => {
                warn!("terminal poll failed: {}", err);
                return;
            }
        }

        let forwarded = match event::read() {
            Ok(CrosstermEvent::Key(key)) => tx.send(Event::Key(key)),
            Ok(CrosstermEvent::Resize(..)) => tx.send(Event::Resize),
            Ok(_) => Ok(()),
            Err(err) => {
                warn!("terminal read failed: {}", err);
                return;
            }
        };
        if forwarded.is_err() {
            return;
        }
    }
}

/// Map a key press to a session input.
pub fn input_for_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('g') => Some(InputEvent::Cancel),
            KeyCode::Char('p') | KeyCode::Char('k') => Some(InputEvent::Up),
            KeyCode::Char('n') | KeyCode::Char('j') => Some(InputEvent::Down),
            KeyCode::Char('u') => Some(InputEvent::ClearQuery),
            KeyCode::Char('h') => Some(InputEvent::Backspace),
            _ => None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Enter => Some(InputEvent::Confirm),
        KeyCode::Esc => Some(InputEvent::Cancel),
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        KeyCode::PageUp => Some(InputEvent::PageUp),
        KeyCode::PageDown => Some(InputEvent::PageDown),
        KeyCode::Home => Some(InputEvent::Home),
        KeyCode::End => Some(InputEvent::End),
        _ => None,
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use tracing::trace;

/// Input understood by the table view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Appended to the search text
    Char(char),
    Down,
    Up,
    PageDown,
    PageUp,
    Home,
    Escape,
    Enter,
    Backspace,
    Resize,
    /// A key with no meaning here (function keys and the like)
    Other,
}

/// Produces one key at a time
#[async_trait]
pub trait KeySource: Send {
    async fn next_key(&mut self) -> Result<Key>;
}

/// Map a terminal event to a key. Events the view ignores (mouse, focus,
/// key release) map to `None`.
pub fn map_event(event: Event) -> Option<Key> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(map_key_event(key)),
        Event::Resize(_, _) => Some(Key::Resize),
        _ => None,
    }
}

fn map_key_event(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Escape,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Tab => Key::Char('\t'),
        KeyCode::Down => Key::Down,
        KeyCode::Up => Key::Up,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::Home => Key::Home,
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        _ => Key::Other,
    }
}

/// Reads keys from the terminal.
///
/// `crossterm::event::read` blocks, so each read runs on the blocking pool
/// and the async side only awaits its result.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

#[async_trait]
impl KeySource for CrosstermKeys {
    async fn next_key(&mut self) -> Result<Key> {
        loop {
            let event = tokio::task::spawn_blocking(crossterm::event::read)
                .await
                .context("Key reader task failed")?
                .context("Failed to read terminal event")?;

            if let Some(key) = map_event(event) {
                trace!(target: "input", "Key: {:?}", key);
                return Ok(key);
            }
        }
    }
}

/// Replays a fixed list of keys, then cancels
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Keys typing `text` into the search prompt
    pub fn typing(text: &str) -> Vec<Key> {
        text.chars().map(Key::Char).collect()
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

#[async_trait]
impl KeySource for ScriptedKeys {
    async fn next_key(&mut self) -> Result<Key> {
        Ok(self.keys.pop_front().unwrap_or(Key::Escape))
    }
}

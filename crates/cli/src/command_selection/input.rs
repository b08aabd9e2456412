use std::collections::HashMap;
use std::io::{stdin, stderr, BufRead, Stderr, StdinLock, Write};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use indexmap::IndexSet;
use see_core::error::{Error, Result, INPUT_DESCRIPTION, STREAM_PATH};

use super::types::Key;

/// Maps a terminal key press to a selector key, if it is one.
#[must_use]
pub fn key_from_event(key_event: KeyEvent) -> Option<Key> {
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Cancel)
        }
        KeyCode::Up | KeyCode::Char('k') => Some(Key::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Key::Down),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc | KeyCode::Char('q') => Some(Key::Cancel),
        _ => None,
    }
}

/// Prompts on `writer` for each name in `placeholders`, reading answers
/// line by line from `reader`.
///
/// Returns `None` if the input ends before every value was given.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn fill_placeholder_values_from<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    placeholders: &IndexSet<String>,
) -> Result<Option<HashMap<String, String>>> {
    if placeholders.is_empty() {
        return Ok(Some(HashMap::new()));
    }

    writeln!(writer, "Enter values for placeholders:")?;

    let mut values = HashMap::new();
    for name in placeholders {
        write!(writer, "  {name}: ")?;
        writer.flush()?;

        let mut input = String::new();
        let read = reader.read_line(&mut input).map_err(|e| {
            Error::io_error(INPUT_DESCRIPTION.to_string(), STREAM_PATH.to_string(), e)
        })?;
        if read == 0 {
            return Ok(None);
        }

        values.insert(name.clone(), input.trim_end_matches(['\r', '\n']).to_string());
    }

    Ok(Some(values))
}

/// Source of values for placeholders that were not given on the command line.
pub trait PlaceholderPrompt {
    /// Returns a value for every name, or `None` if the user gave up.
    ///
    /// # Errors
    ///
    /// Returns an error if the values cannot be read.
    fn fill(&mut self, placeholders: &IndexSet<String>) -> Result<Option<HashMap<String, String>>>;
}

/// Line-based prompt over any reader and writer.
pub struct LinePrompt<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl LinePrompt<StdinLock<'static>, Stderr> {
    /// Prompts on stderr and reads from stdin, keeping stdout free for the
    /// command text the shell wrapper evaluates.
    #[must_use]
    pub fn terminal() -> Self {
        Self::new(stdin().lock(), stderr())
    }
}

impl<R: BufRead, W: Write> PlaceholderPrompt for LinePrompt<R, W> {
    fn fill(&mut self, placeholders: &IndexSet<String>) -> Result<Option<HashMap<String, String>>> {
        fill_placeholder_values_from(&mut self.reader, &mut self.writer, placeholders)
    }
}

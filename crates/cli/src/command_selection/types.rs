//! Type definitions and transitions for the command selector.
//!
//! The selector is a small state machine: it starts in
//! [`Phase::Browsing`] and ends in [`Phase::Selected`] or
//! [`Phase::Cancelled`]. Transitions are pure so they can be driven by
//! synthetic key sequences.

/// Rows used by everything except the command list: header, column
/// headings, the four preview rows and the footer.
pub const CHROME_ROWS: u16 = 7;

/// Navigation input understood by the selector.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Cancel,
}

/// Size of the terminal surface the selector draws on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ViewportState {
    pub width: u16,
    pub height: u16,
}

impl ViewportState {
    /// Number of list rows that fit, never less than one.
    #[must_use]
    pub fn visible_rows(&self) -> usize {
        usize::from(self.height.saturating_sub(CHROME_ROWS)).max(1)
    }
}

/// Browsing state of the selector.
///
/// Invariant: `scroll_offset <= current_index < scroll_offset + visible_rows`
/// and `current_index < len`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UiState {
    pub current_index: usize,
    pub scroll_offset: usize,
    pub len: usize,
    pub visible_rows: usize,
}

/// Where the selector is after handling a key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Browsing(UiState),
    /// Index into the list the selector was given
    Selected(usize),
    Cancelled,
}

impl UiState {
    /// Initial state, or `None` when there is nothing to browse.
    #[must_use]
    pub fn new(len: usize, visible_rows: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }

        Some(Self {
            current_index: 0,
            scroll_offset: 0,
            len,
            visible_rows: visible_rows.max(1),
        })
    }

    /// Applies one key.
    #[must_use]
    pub fn transition(self, key: Key) -> Phase {
        let last = self.len - 1;

        let current_index = match key {
            Key::Up => self.current_index.saturating_sub(1),
            Key::Down => (self.current_index + 1).min(last),
            Key::PageUp => self.current_index.saturating_sub(self.visible_rows),
            Key::PageDown => (self.current_index + self.visible_rows).min(last),
            Key::Home => 0,
            Key::End => last,
            Key::Enter => return Phase::Selected(self.current_index),
            Key::Cancel => return Phase::Cancelled,
        };

        Phase::Browsing(
            Self {
                current_index,
                ..self
            }
            .scrolled(),
        )
    }

    /// Adopts a new list height and restores the scroll invariant.
    #[must_use]
    pub fn resized(self, visible_rows: usize) -> Self {
        Self {
            visible_rows: visible_rows.max(1),
            ..self
        }
        .scrolled()
    }

    /// Moves the window by the minimal amount that keeps the current row
    /// visible.
    fn scrolled(mut self) -> Self {
        if self.current_index < self.scroll_offset {
            self.scroll_offset = self.current_index;
        } else if self.current_index >= self.scroll_offset + self.visible_rows {
            self.scroll_offset = self.current_index + 1 - self.visible_rows;
        }
        self
    }

    /// Range of list indexes currently on screen.
    #[must_use]
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        self.scroll_offset..(self.scroll_offset + self.visible_rows).min(self.len)
    }
}

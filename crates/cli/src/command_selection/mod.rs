//! Interactive command selection and placeholder prompting.
//!
//! The selector is a full-screen list of commands:
//! - Arrow keys or vim-style (j/k) to move, Page Up/Down and Home/End to jump
//! - Enter to pick the highlighted command
//! - 'q', Escape or Ctrl-C to quit without picking
//!
//! Navigation and rendering are pure functions over [`types::UiState`], and
//! only [`ui::prompt_for_command_choice`] touches the terminal.

pub mod input;
pub mod types;
pub mod ui;

pub use input::{fill_placeholder_values_from, LinePrompt, PlaceholderPrompt};
pub use types::{Key, Phase, UiState, ViewportState};
pub use ui::{prompt_for_command_choice, render};

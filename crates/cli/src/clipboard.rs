use arboard::Clipboard;
use log::debug;
use see_core::error::{Error, Result};

/// Copies `text` to the system clipboard.
///
/// # Errors
///
/// Returns [`Error::Clipboard`] if no clipboard is available.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| Error::Clipboard(e.to_string()))?;

    debug!("Copied {} characters to the clipboard", text.chars().count());
    Ok(())
}

use anyhow::{Context, Result};
use tracing::debug;

/// Replaces the system clipboard contents with `text`.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to open the system clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to write the digest to the clipboard")?;
    debug!("copied {} bytes to the clipboard", text.len());
    Ok(())
}

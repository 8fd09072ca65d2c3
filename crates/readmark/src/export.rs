//! Markdown export: download to a file and copy to a clipboard.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// File name used when exporting Markdown
pub const EXPORT_FILE_NAME: &str = "converted.md";

/// Content type of exported Markdown
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("nothing to export")]
    Empty,
}

/// Error reported by a clipboard backend
#[derive(Debug, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Destination for copied Markdown
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

impl Clipboard for String {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

/// Write Markdown to `converted.md` inside `dir`, replacing any previous
/// export. Returns the written path.
pub fn write_markdown(dir: &Path, markdown: &str) -> Result<PathBuf, ExportError> {
    if markdown.is_empty() {
        return Err(ExportError::Empty);
    }

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, markdown).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), bytes = markdown.len(), "markdown exported");
    Ok(path)
}

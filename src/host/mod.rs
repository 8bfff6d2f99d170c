//! Host editor abstraction — the buffer and UI surface a paste needs.
//!
//! The paste flow never reaches for an ambient "current view"; the
//! integration layer hands it an [`EditorBuffer`] and a [`NamePrompt`]
//! for the one focused document.

pub mod document;
pub mod prompt;

use std::path::{Path, PathBuf};

pub use document::DocumentBuffer;
pub use prompt::{FixedPrompt, TerminalPrompt};

/// Errors raised by host adapters.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cursor offset past the end of the document or inside a
    /// multi-byte character.
    #[error("invalid cursor offset {0}")]
    InvalidCursor(usize),

    #[error("prompt: {0}")]
    Prompt(String),
}

/// A selection region in byte offsets. Empty when `a == b` (a cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Anchor.
    pub a: usize,
    /// Caret.
    pub b: usize,
}

impl Selection {
    pub fn cursor(offset: usize) -> Self {
        Self {
            a: offset,
            b: offset,
        }
    }

    /// The lower bound of the region.
    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }
}

/// The focused document as seen by the paste command.
pub trait EditorBuffer {
    /// Backing file, or `None` for a document that was never saved.
    fn file_path(&self) -> Option<&Path>;

    /// Current selections in the host's native order.
    fn selections(&self) -> &[Selection];

    /// Space-separated syntax scope names at `offset`.
    fn scope_at(&self, offset: usize) -> String;

    /// Insert literal text at `offset`.
    fn insert(&mut self, offset: usize, text: &str) -> Result<(), HostError>;

    /// The host's built-in text paste. `clipboard_text` is the text read
    /// by the paste command; hosts with their own paste may ignore it.
    fn paste_text(&mut self, clipboard_text: Option<&str>) -> Result<(), HostError>;
}

/// Modal single-line input.
pub trait NamePrompt {
    /// Show the prompt. `Ok(None)` means the user dismissed it.
    fn ask(&mut self, label: &str, default: &str) -> Result<Option<String>, HostError>;
}

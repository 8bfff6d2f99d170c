//! File-backed document host for the command line.
//!
//! Loads a UTF-8 document, applies inserts in memory, and writes the
//! result back (or hands it to the caller for stdout). Syntax is
//! classified once per document from the file extension.

use std::io;
use std::path::{Path, PathBuf};

use super::{EditorBuffer, HostError, Selection};

/// Scope assigned to Markdown documents.
pub const MARKDOWN_SCOPE: &str = "text.html.markdown";

/// Scope assigned to everything else.
pub const PLAIN_SCOPE: &str = "text.plain";

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn", "mdx"];

/// Classify a document by its extension.
pub fn scope_for_path(path: &Path) -> &'static str {
    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });

    if is_markdown { MARKDOWN_SCOPE } else { PLAIN_SCOPE }
}

#[derive(Debug)]
pub struct DocumentBuffer {
    path: PathBuf,
    text: String,
    selections: Vec<Selection>,
    scope: String,
    dirty: bool,
}

impl DocumentBuffer {
    /// Load `path` with cursors at the given byte offsets.
    ///
    /// A missing file opens as an empty document. With no cursors the
    /// caret sits at the end of the document. `scope` overrides the
    /// extension-based classification.
    pub async fn open(
        path: &Path,
        cursors: &[usize],
        scope: Option<String>,
    ) -> Result<Self, HostError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(HostError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::from_text(path, text, cursors, scope)
    }

    pub fn from_text(
        path: &Path,
        text: String,
        cursors: &[usize],
        scope: Option<String>,
    ) -> Result<Self, HostError> {
        let selections = if cursors.is_empty() {
            vec![Selection::cursor(text.len())]
        } else {
            cursors
                .iter()
                .map(|&offset| check_offset(&text, offset).map(|()| Selection::cursor(offset)))
                .collect::<Result<_, _>>()?
        };

        Ok(Self {
            scope: scope.unwrap_or_else(|| scope_for_path(path).to_string()),
            path: path.to_path_buf(),
            text,
            selections,
            dirty: false,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether any insert has been applied since loading.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document back to its file.
    pub async fn save(&self) -> Result<(), HostError> {
        tokio::fs::write(&self.path, &self.text)
            .await
            .map_err(|source| HostError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl EditorBuffer for DocumentBuffer {
    fn file_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn selections(&self) -> &[Selection] {
        &self.selections
    }

    fn scope_at(&self, _offset: usize) -> String {
        self.scope.clone()
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<(), HostError> {
        check_offset(&self.text, offset)?;
        self.text.insert_str(offset, text);
        self.dirty = true;

        // Carets at or after the insertion point move with the text.
        for sel in &mut self.selections {
            if sel.a >= offset {
                sel.a += text.len();
            }
            if sel.b >= offset {
                sel.b += text.len();
            }
        }
        Ok(())
    }

    /// Insert the clipboard text at every cursor, last cursor first so
    /// earlier offsets stay valid.
    fn paste_text(&mut self, clipboard_text: Option<&str>) -> Result<(), HostError> {
        let Some(text) = clipboard_text.filter(|t| !t.is_empty()) else {
            tracing::debug!("nothing to paste");
            return Ok(());
        };

        let mut offsets: Vec<usize> = self.selections.iter().map(Selection::begin).collect();
        offsets.sort_unstable_by(|a, b| b.cmp(a));
        for offset in offsets {
            self.insert(offset, text)?;
        }
        Ok(())
    }
}

fn check_offset(text: &str, offset: usize) -> Result<(), HostError> {
    if text.is_char_boundary(offset) {
        Ok(())
    } else {
        Err(HostError::InvalidCursor(offset))
    }
}

//! Clipboard access — a single typed read of the system clipboard.
//!
//! The paste flow reads the clipboard exactly once into a
//! [`ClipboardSnapshot`] and branches on that value, so the image that
//! was probed is the image that gets saved even if the clipboard
//! changes while the name prompt is open.

pub mod tool;

use bytes::Bytes;

pub use tool::{Backend, ToolClipboard};

/// Errors returned by clipboard providers.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// The clipboard tool could not be started (not installed, not on PATH).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The clipboard tool did not exit within the configured timeout.
    #[error("{program} timed out after {millis} ms")]
    Timeout { program: &'static str, millis: u128 },
}

/// Clipboard contents captured at probe time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    /// PNG-encoded image data, if the clipboard offered an image.
    pub image: Option<Bytes>,
    /// Clipboard contents as text, if the clipboard offered text.
    pub text: Option<String>,
}

impl ClipboardSnapshot {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Reads the system clipboard.
///
/// Providers decide how "no image" is detected; a provider whose
/// underlying tool is missing should report an empty snapshot rather
/// than an error, since the paste flow treats both the same way.
pub trait ClipboardProvider {
    async fn snapshot(&self) -> Result<ClipboardSnapshot, ClipboardError>;
}

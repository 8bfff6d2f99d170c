//! Subprocess clipboard provider — `xclip`, `wl-paste`, `pngpaste`.
//!
//! Same approach as shelling out to `xclip -selection clipboard`, but
//! each invocation is bounded by a timeout and killed if it overruns,
//! so a hung tool cannot stall the paste.

use std::process::Stdio;
use std::time::Duration;

use bytes::Bytes;
use tokio::process::Command;
use tokio::time;

use super::{ClipboardError, ClipboardProvider, ClipboardSnapshot};

/// MIME type requested from tools that support content negotiation.
const PNG_MIME: &str = "image/png";

/// A command line: program plus fixed arguments.
type ToolCommand = (&'static str, &'static [&'static str]);

/// Clipboard tool family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// X11 via `xclip`.
    Xclip,
    /// Wayland via `wl-paste` (wl-clipboard).
    WlPaste,
    /// macOS via `pngpaste` for images and `pbpaste` for text.
    Pngpaste,
}

impl Backend {
    /// Pick a backend for the current session.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Backend::Pngpaste
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Backend::WlPaste
        } else {
            Backend::Xclip
        }
    }

    /// Command listing the clipboard's offered MIME types, one per line.
    ///
    /// `None` for tools without target listing; those probe by
    /// attempting the image read itself.
    fn targets_command(self) -> Option<ToolCommand> {
        match self {
            Backend::Xclip => Some(("xclip", XCLIP_TARGETS)),
            Backend::WlPaste => Some(("wl-paste", WL_PASTE_TARGETS)),
            Backend::Pngpaste => None,
        }
    }

    /// Command writing the clipboard image as PNG to stdout.
    fn image_command(self) -> ToolCommand {
        match self {
            Backend::Xclip => ("xclip", XCLIP_IMAGE),
            Backend::WlPaste => ("wl-paste", WL_PASTE_IMAGE),
            Backend::Pngpaste => ("pngpaste", PNGPASTE_IMAGE),
        }
    }

    /// Command writing the clipboard text to stdout.
    fn text_command(self) -> ToolCommand {
        match self {
            Backend::Xclip => ("xclip", XCLIP_TEXT),
            Backend::WlPaste => ("wl-paste", WL_PASTE_TEXT),
            Backend::Pngpaste => ("pbpaste", NO_ARGS),
        }
    }
}

const XCLIP_TARGETS: &[&str] = &["-selection", "clipboard", "-t", "TARGETS", "-o"];
const XCLIP_IMAGE: &[&str] = &["-selection", "clipboard", "-t", PNG_MIME, "-o"];
const XCLIP_TEXT: &[&str] = &["-selection", "clipboard", "-o"];
const WL_PASTE_TARGETS: &[&str] = &["--list-types"];
const WL_PASTE_IMAGE: &[&str] = &["--type", PNG_MIME];
const WL_PASTE_TEXT: &[&str] = &["--no-newline"];
const PNGPASTE_IMAGE: &[&str] = &["-"];
const NO_ARGS: &[&str] = &[];

/// Clipboard provider that shells out to the backend's tools.
#[derive(Debug, Clone)]
pub struct ToolClipboard {
    backend: Backend,
    timeout: Duration,
}

impl ToolClipboard {
    pub fn new(backend: Backend, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Probe mode: does the clipboard currently hold an image?
    ///
    /// Performs no writes. A missing or failing tool reads as "no image".
    pub async fn probe(&self) -> bool {
        match self.backend.targets_command() {
            Some(command) => self.offers_png(command).await,
            None => self.read_image().await.is_some(),
        }
    }

    /// Read the clipboard image, if there is one.
    ///
    /// Backends with a target list are asked for PNG only when they
    /// offer it. For the others the image read is the probe, so its
    /// output is kept rather than read a second time.
    async fn read_image(&self) -> Option<Bytes> {
        if let Some(command) = self.backend.targets_command() {
            if !self.offers_png(command).await {
                return None;
            }
        }

        self.stdout_of(self.backend.image_command())
            .await
            .filter(|image| !image.is_empty())
            .map(Bytes::from)
    }

    async fn offers_png(&self, targets_command: ToolCommand) -> bool {
        self.stdout_of(targets_command)
            .await
            .is_some_and(|targets| lists_png(&targets))
    }

    /// Run a tool and return its stdout if it exited successfully.
    ///
    /// Spawn failures and timeouts are logged and collapse to `None`.
    async fn stdout_of(&self, command: ToolCommand) -> Option<Vec<u8>> {
        match self.run(command).await {
            Ok(stdout) => stdout,
            Err(e) => {
                tracing::debug!(error = %e, "clipboard tool unavailable");
                None
            }
        }
    }

    /// Run a tool under the configured timeout.
    ///
    /// Returns `Ok(None)` on a nonzero exit and `Ok(Some(stdout))` on
    /// success.
    async fn run(&self, (program, args): ToolCommand) -> Result<Option<Vec<u8>>, ClipboardError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = time::timeout(self.timeout, output)
            .await
            .map_err(|_| ClipboardError::Timeout {
                program,
                millis: self.timeout.as_millis(),
            })?
            .map_err(|source| ClipboardError::Spawn { program, source })?;

        if output.status.success() {
            Ok(Some(output.stdout))
        } else {
            tracing::debug!(program, status = %output.status, "clipboard tool exited non-zero");
            Ok(None)
        }
    }
}

impl ClipboardProvider for ToolClipboard {
    async fn snapshot(&self) -> Result<ClipboardSnapshot, ClipboardError> {
        let image = self.read_image().await;

        let text = self
            .stdout_of(self.backend.text_command())
            .await
            .and_then(|raw| String::from_utf8(raw).ok());

        let snapshot = ClipboardSnapshot { image, text };
        tracing::debug!(
            backend = ?self.backend,
            has_image = snapshot.has_image(),
            has_text = snapshot.text.is_some(),
            "clipboard snapshot"
        );
        Ok(snapshot)
    }
}

/// Whether a newline-separated target list offers PNG data.
fn lists_png(targets: &[u8]) -> bool {
    String::from_utf8_lossy(targets)
        .lines()
        .any(|line| line.trim() == PNG_MIME)
}

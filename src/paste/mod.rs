//! Paste command — clipboard image to saved file plus inserted reference.
//!
//! Two phases connected by the host's prompt:
//!
//! 1. [`begin_paste`] reads the clipboard once. Without an image it
//!    falls back to the host's text paste and stops. With an image it
//!    returns a [`PendingName`] holding everything captured so far.
//! 2. [`complete_paste`] takes the confirmed name, saves the image
//!    under the assets directory, and inserts a reference at the first
//!    selection only.
//!
//! [`execute`] wires both phases to a [`NamePrompt`]. Dismissing the
//! prompt drops the pending paste with no side effects.

pub mod payload;

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::assets::{self, AssetError, AssetLayout};
use crate::clipboard::{ClipboardError, ClipboardProvider};
use crate::host::{EditorBuffer, HostError, NamePrompt};

pub use payload::{insertion_payload, validate_name};

/// Label shown on the name prompt.
pub const NAME_LABEL: &str = "Image Name:";

/// Paste failures.
#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    /// The document has never been saved, so there is nowhere to put
    /// the assets directory.
    #[error("document has no file path; save it before pasting images")]
    NoActiveDocumentPath,

    #[error("document has no cursor to insert at")]
    NoSelection,

    #[error("invalid image name {0}")]
    InvalidName(String),

    #[error("clipboard: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Assets(#[from] AssetError),

    #[error("host: {0}")]
    Host(#[from] HostError),
}

/// A paste waiting for the user to name the image.
#[derive(Debug)]
pub struct PendingName {
    document: PathBuf,
    layout: AssetLayout,
    image: Bytes,
    clipboard_text: Option<String>,
}

impl PendingName {
    pub fn document(&self) -> &Path {
        &self.document
    }
}

/// Result of the first phase.
#[derive(Debug)]
pub enum BeginOutcome {
    /// No image on the clipboard; the host's text paste ran instead.
    PastedText,
    AwaitingName(PendingName),
}

/// Where the saved image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Image data read from the clipboard.
    ClipboardImage,
    /// The clipboard text named an existing file or directory, which was
    /// copied instead.
    CopiedPath(PathBuf),
}

/// A saved image and the reference inserted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedImage {
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub payload: String,
    pub source: ImageSource,
}

/// Result of a full paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    PastedText,
    Cancelled,
    Inserted(InsertedImage),
}

/// Phase one: probe the clipboard and either paste text or ask for a name.
pub async fn begin_paste<B, C>(
    buffer: &mut B,
    clipboard: &C,
    layout: &AssetLayout,
) -> Result<BeginOutcome, PasteError>
where
    B: EditorBuffer,
    C: ClipboardProvider,
{
    let snapshot = clipboard.snapshot().await?;

    let Some(image) = snapshot.image else {
        tracing::info!("no image on clipboard; pasting text");
        buffer.paste_text(snapshot.text.as_deref())?;
        return Ok(BeginOutcome::PastedText);
    };

    let document = buffer
        .file_path()
        .ok_or(PasteError::NoActiveDocumentPath)?
        .to_path_buf();

    tracing::info!(
        document = %document.display(),
        image_bytes = image.len(),
        "image on clipboard; awaiting name"
    );

    Ok(BeginOutcome::AwaitingName(PendingName {
        document,
        layout: layout.clone(),
        image,
        clipboard_text: snapshot.text,
    }))
}

/// Phase two: save the image as `name` and insert its reference.
///
/// Nothing is inserted unless the image was saved. An existing file
/// with the same name is replaced.
pub async fn complete_paste<B>(
    pending: PendingName,
    name: &str,
    buffer: &mut B,
) -> Result<InsertedImage, PasteError>
where
    B: EditorBuffer,
{
    validate_name(name)?;

    // Only the first selection receives the reference.
    let position = buffer
        .selections()
        .first()
        .map(|sel| sel.begin())
        .ok_or(PasteError::NoSelection)?;

    let paths = pending.layout.resolve(&pending.document, name);
    assets::ensure_assets_dir(&paths.assets_dir).await?;

    let source = match existing_path(pending.clipboard_text.as_deref()) {
        Some(path) => {
            tracing::info!(
                from = %path.display(),
                to = %paths.absolute_path.display(),
                "clipboard text names an existing path; copying"
            );
            assets::copy_path(&path, &paths.absolute_path).await?;
            ImageSource::CopiedPath(path)
        }
        None => {
            tracing::info!(
                to = %paths.absolute_path.display(),
                bytes = pending.image.len(),
                "writing clipboard image"
            );
            assets::write_image(&paths.absolute_path, &pending.image).await?;
            ImageSource::ClipboardImage
        }
    };

    let payload = insertion_payload(&paths.relative_path, &buffer.scope_at(position));
    buffer.insert(position, &payload)?;
    tracing::info!(position, payload = %payload, "inserted image reference");

    Ok(InsertedImage {
        absolute_path: paths.absolute_path,
        relative_path: paths.relative_path,
        payload,
        source,
    })
}

/// Run a full paste against one document.
pub async fn execute<B, C, P>(
    buffer: &mut B,
    clipboard: &C,
    prompt: &mut P,
    layout: &AssetLayout,
) -> Result<PasteOutcome, PasteError>
where
    B: EditorBuffer,
    C: ClipboardProvider,
    P: NamePrompt,
{
    let pending = match begin_paste(buffer, clipboard, layout).await? {
        BeginOutcome::PastedText => return Ok(PasteOutcome::PastedText),
        BeginOutcome::AwaitingName(pending) => pending,
    };

    tracing::debug!(document = %pending.document().display(), "prompting for image name");
    let Some(name) = prompt.ask(NAME_LABEL, "")? else {
        tracing::info!("name prompt dismissed");
        return Ok(PasteOutcome::Cancelled);
    };

    complete_paste(pending, &name, buffer)
        .await
        .map(PasteOutcome::Inserted)
}

/// Clipboard text that names an existing file or directory, verbatim.
fn existing_path(text: Option<&str>) -> Option<PathBuf> {
    let path = Path::new(text?);
    path.exists().then(|| path.to_path_buf())
}
